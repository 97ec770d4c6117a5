//! Rolling series: bounded length, oldest-first eviction, resize.
use std::collections::VecDeque;

use batedor_agent::history::{push_capped, RollingSeries};

fn collect(s: &RollingSeries<u32>) -> Vec<u32> {
    s.values().copied().collect()
}

#[test]
fn evicts_oldest_once_full() {
    let mut s = RollingSeries::new(3);
    for v in 1..=5 {
        s.push(v);
        assert!(s.len() <= s.capacity());
    }
    assert_eq!(collect(&s), vec![3, 4, 5]);
    assert_eq!(s.latest(), Some(&5));
}

#[test]
fn shrinking_keeps_the_most_recent_values() {
    let mut s = RollingSeries::new(5);
    for v in 1..=5 {
        s.push(v);
    }
    s.resize(2);
    assert_eq!(collect(&s), vec![4, 5]);

    // growing keeps what is there and makes room for more
    s.resize(4);
    s.push(6);
    s.push(7);
    assert_eq!(collect(&s), vec![4, 5, 6, 7]);
    s.push(8);
    assert_eq!(collect(&s), vec![5, 6, 7, 8]);
}

#[test]
fn zero_capacity_stores_nothing() {
    let mut s = RollingSeries::new(0);
    s.push(1);
    assert!(s.is_empty());
    assert_eq!(s.latest(), None);

    let mut dq = VecDeque::from(vec![1, 2]);
    push_capped(&mut dq, 3, 0);
    assert!(dq.is_empty());
}

#[test]
fn push_capped_on_raw_deque() {
    let mut dq = VecDeque::new();
    for v in 0..10 {
        push_capped(&mut dq, v, 4);
    }
    assert_eq!(dq, VecDeque::from(vec![6, 7, 8, 9]));
}
