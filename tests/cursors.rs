//! Cursor arithmetic and iteration.

mod common;

use common::{Interface, Large, Small, Tracker};
use polyvec::PolyVec;

fn sample(tracker: &std::rc::Rc<Tracker>) -> PolyVec<dyn Interface> {
    let mut vec = PolyVec::<dyn Interface>::new();
    vec.push(Small::new(10, tracker)).unwrap();
    vec.push(Large::new(20, tracker)).unwrap();
    vec.push(Small::new(30, tracker)).unwrap();
    vec.push(Large::new(40, tracker)).unwrap();
    vec
}

#[test]
fn test_cursor_walk() {
    let tracker = Tracker::new();
    let vec = sample(&tracker);

    let mut cursor = vec.begin();
    let mut seen = Vec::new();
    while cursor != vec.end() {
        seen.push(cursor.id());
        cursor.move_next();
    }
    assert_eq!(seen, [10, 20, 30, 40]);
    assert!(cursor.is_end());
    assert!(cursor.get().is_none());

    cursor.move_prev();
    assert_eq!(cursor.id(), 40);
    assert_eq!(cursor.position(), 3);
}

#[test]
fn test_cursor_arithmetic() {
    let tracker = Tracker::new();
    let vec = sample(&tracker);
    let begin = vec.begin();
    let end = vec.end();

    assert_eq!(end - begin, 4);
    assert_eq!(begin - end, -4);
    assert_eq!((begin + 2).id(), 30);
    assert_eq!(end - 1, vec.cursor(3));

    let mut cursor = begin;
    cursor += 3;
    cursor -= 1;
    assert_eq!(cursor.id(), 30);
    assert!(begin < cursor && cursor < end);
    assert!(std::ptr::eq(cursor.container(), &vec));
    assert!(cursor.downcast_ref::<Small>().is_some());
    assert!(cursor.downcast_ref::<Large>().is_none());
}

#[test]
fn test_cursors_of_different_containers() {
    let tracker = Tracker::new();
    let first = sample(&tracker);
    let second = sample(&tracker);

    assert_ne!(first.begin(), second.begin());
    assert_eq!(first.begin().partial_cmp(&second.begin()), None);
}

#[test]
#[should_panic(expected = "different containers")]
fn test_distance_across_containers_panics() {
    let tracker = Tracker::new();
    let first = sample(&tracker);
    let second = sample(&tracker);

    let _ = first.end() - second.begin();
}

#[test]
#[should_panic(expected = "cannot dereference")]
fn test_deref_at_end_panics() {
    let tracker = Tracker::new();
    let vec = sample(&tracker);

    let _ = vec.end().id();
}

#[test]
fn test_position_feeds_mutation() {
    let tracker = Tracker::new();
    let mut vec = sample(&tracker);

    let position = (vec.begin() + 1).position();
    let next = vec.erase(position..position + 2).unwrap();
    assert_eq!(next.position(), 1);
    assert_eq!(next.id(), 40);

    let ids: Vec<u32> = vec.iter().map(|element| element.id()).collect();
    assert_eq!(ids, [10, 40]);
}

#[test]
fn test_insert_returns_cursor_at_new_element() {
    let tracker = Tracker::new();
    let mut vec = sample(&tracker);

    let inserted = vec.insert(2, Small::new(25, &tracker)).unwrap();
    assert_eq!(inserted.position(), 2);
    assert_eq!(inserted.id(), 25);
    assert_eq!((inserted + 1).id(), 30);
    assert_eq!(inserted - inserted.container().begin(), 2);

    let last = vec.len() - 1;
    assert!(vec.remove(last).unwrap().is_end());
}

#[test]
fn test_iterators() {
    let tracker = Tracker::new();
    let mut vec = sample(&tracker);

    let iter = vec.iter();
    assert_eq!(iter.len(), 4);
    let backwards: Vec<u32> = iter.rev().map(|element| element.id()).collect();
    assert_eq!(backwards, [40, 30, 20, 10]);

    let mut iter = vec.iter();
    assert_eq!(iter.next().map(|element| element.id()), Some(10));
    assert_eq!(iter.next_back().map(|element| element.id()), Some(40));
    assert_eq!(iter.clone().count(), 2);

    for element in vec.iter_mut().skip(2) {
        element.set_id(0);
    }
    let ids: Vec<u32> = (&vec).into_iter().map(|element| element.id()).collect();
    assert_eq!(ids, [10, 20, 0, 0]);
}
