// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! End-to-end exercises of the `Future` combinators composed together, the
//! way a caller chaining several of them would.

use std::sync::Arc;

use deferred::executor::ImmediateExecutor;
use deferred::{Deferred, Future};

fn immediate() -> Arc<dyn deferred::Executor> {
    Arc::new(ImmediateExecutor)
}

#[test]
fn map_and_then_chain_together() {
    let (promise, future) = Deferred::<i32>::new_pair();

    let result = future
        .map(immediate(), |v| v + 1)
        .and_then(immediate(), |v| Future::filled(v * 10));

    promise.must_fill(4);

    assert_eq!(result.peek(), Some(50));
}

// S7.
#[test]
fn all_combines_a_mix_of_pre_filled_and_pending_sources() {
    let (promise, pending) = Deferred::<i32>::new_pair();
    let sources = vec![Future::filled(1), pending, Future::filled(3)];

    let all = Future::all(immediate(), sources);
    assert_eq!(all.peek(), None);

    promise.must_fill(2);
    assert_eq!(all.peek(), Some(vec![1, 2, 3]));
}

// S3.
#[test]
fn first_of_several_pending_sources_adopts_the_winner() {
    let (pa, fa) = Deferred::<&'static str>::new_pair();
    let (pb, fb) = Deferred::<&'static str>::new_pair();

    let winner = Future::first(immediate(), vec![fa, fb]);

    pa.must_fill("a wins");
    drop(pb);

    assert_eq!(winner.peek(), Some("a wins"));
}

#[test]
fn and_combines_two_different_types() {
    let (p1, f1) = Deferred::<i32>::new_pair();
    let (p2, f2) = Deferred::<bool>::new_pair();

    let combined = f1.and(immediate(), &f2);

    p2.must_fill(true);
    p1.must_fill(5);

    assert_eq!(combined.peek(), Some((5, true)));
}

#[test]
fn every_is_cheaper_than_map_for_fire_and_forget_subscribers() {
    let (promise, future) = Deferred::<i32>::new_pair();
    let view = future.every(|v| v.to_string());

    promise.must_fill(42);

    view.upon(immediate(), |s| assert_eq!(s, "42"));
    view.upon(immediate(), |s| assert_eq!(s, "42"));
}
