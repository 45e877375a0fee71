use intrc::{Irc, RefCount, RefCounted};
use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Debug, Default)]
struct Payload {
    value: i32,
    refs: RefCount,
}

unsafe impl RefCounted for Payload {
    fn ref_count(&self) -> &RefCount {
        &self.refs
    }
}

fn payload(value: i32) -> Payload {
    Payload {
        value,
        refs: RefCount::new(),
    }
}

struct Tracked {
    value: i32,
    drops: Rc<Cell<u32>>,
    refs: RefCount,
}

unsafe impl RefCounted for Tracked {
    fn ref_count(&self) -> &RefCount {
        &self.refs
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

fn tracked(value: i32, drops: &Rc<Cell<u32>>) -> Tracked {
    Tracked {
        value,
        drops: drops.clone(),
        refs: RefCount::new(),
    }
}

#[test]
fn empty_handle_has_no_referent() {
    let handle = Irc::<Payload>::empty();
    assert!(handle.is_empty());
    assert!(handle.as_ptr().is_null());
    assert_eq!(handle.use_count(), 0);
}

#[test]
fn wrapping_a_raw_referent_takes_the_first_vote() {
    let raw = Box::into_raw(Box::new(payload(10)));
    let handle = unsafe { Irc::from_raw_add_ref(raw) };
    assert!(!handle.is_empty());
    assert_eq!(handle.use_count(), 1);
    assert_eq!(handle.value, 10);
}

#[test]
fn factory_handle_starts_with_one_vote() {
    let handle = Irc::new(payload(2));
    assert_eq!(handle.use_count(), 1);
    assert_eq!(handle.value, 2);
}

#[test]
fn factory_accepts_a_default_payload() {
    let handle = Irc::new(Payload::default());
    assert!(!handle.is_empty());
    assert_ne!(handle.use_count(), 0);
    assert_eq!(handle.value, 0);
}

#[test]
fn cloning_adds_a_vote_on_the_shared_referent() {
    let source = Irc::new(payload(20));
    let copy = source.clone();
    assert_eq!(copy.use_count(), 2);
    assert_eq!(source.use_count(), 2);
    assert_eq!(copy.value, 20);
    assert_eq!(source.value, 20);
}

#[test]
fn taking_moves_the_vote_and_empties_the_source() {
    let mut source = Irc::new(payload(99));
    let moved = source.take();
    assert!(source.is_empty());
    assert!(source.as_ptr().is_null());
    assert_eq!(moved.use_count(), 1);
    assert_eq!(moved.value, 99);
}

#[test]
fn handles_compare_by_referent_identity() {
    let first = Irc::new(payload(40));
    let copy = first.clone();
    let distinct = Irc::new(payload(40));
    assert!(first == copy);
    assert!(first != distinct);
}

#[test]
fn empty_handles_compare_equal() {
    assert!(Irc::<Payload>::empty() == Irc::empty());
    assert!(Irc::<Payload>::empty() != Irc::new(payload(0)));
}

#[test]
fn detaching_keeps_the_vote() {
    let mut handle = Irc::new(payload(60));
    let raw = handle.detach().expect("the handle had a referent");
    assert!(handle.is_empty());
    assert_eq!(unsafe { raw.as_ref() }.ref_count().get(), 1);
    unsafe { intrc::release(raw) };
}

#[test]
fn detached_votes_can_be_adopted_back() {
    let mut handle = Irc::new(payload(7));
    let raw = handle.detach().unwrap().as_ptr();
    let adopted = unsafe { Irc::from_raw(raw) };
    assert_eq!(adopted.use_count(), 1);
    assert_eq!(adopted.value, 7);
}

#[test]
fn resetting_releases_the_old_vote_and_seats_the_new_referent() {
    let drops = Rc::new(Cell::new(0));
    let mut handle = Irc::new(tracked(60, &drops));
    let raw = Box::into_raw(Box::new(tracked(0, &drops)));

    unsafe { handle.reset_raw(raw, true) };

    assert_eq!(drops.get(), 1);
    assert_eq!(handle.use_count(), 1);
    assert_eq!(handle.value, 0);
}

#[test]
fn reset_releases_the_vote_and_empties_the_handle() {
    let drops = Rc::new(Cell::new(0));
    let mut handle = Irc::new(tracked(1, &drops));
    handle.reset();
    assert!(handle.is_empty());
    assert_eq!(drops.get(), 1);
}

#[test]
fn swapping_exchanges_referent_contents_only() {
    let mut first = Irc::new(payload(18));
    let mut second = Irc::new(payload(81));
    let first_identity = first.as_ptr();
    let second_identity = second.as_ptr();

    first.swap_values(&mut second);

    assert_eq!(first.value, 81);
    assert_eq!(second.value, 18);
    assert_eq!(first.use_count(), 1);
    assert_eq!(second.use_count(), 1);
    assert_eq!(first.as_ptr(), first_identity);
    assert_eq!(second.as_ptr(), second_identity);
}

#[test]
fn dropping_the_last_handle_destroys_the_referent_once() {
    let drops = Rc::new(Cell::new(0));
    let handle = Irc::new(tracked(5, &drops));
    let copy = handle.clone();

    drop(handle);
    assert_eq!(drops.get(), 0);
    assert_eq!(copy.use_count(), 1);

    drop(copy);
    assert_eq!(drops.get(), 1);
}

#[test]
fn copy_assignment_conserves_the_total_vote_count() {
    let drops = Rc::new(Cell::new(0));
    let mut target = Irc::new(tracked(1, &drops));
    let source = Irc::new(tracked(2, &drops));
    assert_eq!(target.use_count(), 1);

    target = source.clone();

    assert_eq!(drops.get(), 1);
    assert_eq!(target.use_count(), 2);
    assert_eq!(source.use_count(), 2);
    assert!(target == source);
}

#[test]
fn move_assignment_transfers_the_vote() {
    let drops = Rc::new(Cell::new(0));
    let mut target = Irc::new(tracked(1, &drops));
    let mut source = Irc::new(tracked(2, &drops));
    assert_eq!(target.value, 1);

    target = source.take();

    assert_eq!(drops.get(), 1);
    assert!(source.is_empty());
    assert_eq!(target.use_count(), 1);
    assert_eq!(target.value, 2);
}

#[test]
fn unique_handles_allow_mutable_access() {
    let mut handle = Irc::new(payload(1));
    handle.get_mut().expect("the vote is unique").value = 2;
    assert_eq!(handle.value, 2);

    let copy = handle.clone();
    assert!(handle.get_mut().is_none());
    drop(copy);
    assert!(handle.get_mut().is_some());
}

#[test]
fn cloning_a_payload_out_of_a_live_referent_resets_its_counter() {
    let handle = Irc::new(payload(9));
    let copy = handle.clone();

    let value_copy: Payload = (*handle).clone();
    assert_eq!(value_copy.ref_count().get(), 0);
    assert_eq!(handle.use_count(), 2);

    drop(copy);
}

#[test]
fn debug_formats_the_payload_or_the_empty_state() {
    let handle = Irc::new(payload(3));
    assert!(format!("{:?}", handle).contains("value: 3"));
    assert_eq!(format!("{:?}", Irc::<Payload>::empty()), "Irc(<empty>)");
}

#[test]
#[should_panic(expected = "dereferenced an empty Irc")]
fn dereferencing_an_empty_handle_panics() {
    let handle = Irc::<Payload>::empty();
    let _ = handle.value;
}

#[test]
#[should_panic(expected = "swap_values on an empty Irc")]
fn swapping_an_empty_handle_panics() {
    let mut first = Irc::<Payload>::empty();
    let mut second = Irc::new(payload(2));
    first.swap_values(&mut second);
}

#[test]
#[should_panic(expected = "swap_values on a shared referent")]
fn swapping_a_shared_referent_panics() {
    let mut first = Irc::new(payload(1));
    let _copy = first.clone();
    let mut second = Irc::new(payload(2));
    first.swap_values(&mut second);
}
