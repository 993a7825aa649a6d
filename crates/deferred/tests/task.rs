// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! End-to-end exercises of the `Task` algebra: spawning work against an
//! executor, chaining it, and racing it against cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use deferred::executor::SerialExecutor;
use deferred::{Error, Task, Timeout};

fn serial() -> Arc<dyn deferred::Executor> {
    Arc::new(SerialExecutor::new())
}

// S5: a retry loop that gives up after exhausting its attempts.
#[test]
fn repeat_then_map_composes_a_retrying_pipeline() {
    let attempts = Arc::new(AtomicUsize::new(0));

    let task = Task::repeat(
        serial(),
        3,
        |_error| true,
        {
            let attempts = Arc::clone(&attempts);
            move || {
                let n = attempts.fetch_add(1, Ordering::AcqRel) + 1;
                if n < 2 {
                    Task::failure(Error::InvalidInput)
                } else {
                    Task::success(n)
                }
            }
        },
    )
    .map(serial(), |n| n * 100);

    assert_eq!(task.wait(Timeout::Bounded(Duration::from_secs(1))), Some(Ok(200)));
}

#[test]
fn and_success_fans_out_and_cancels_the_losing_sibling_on_failure() {
    let ran = Arc::new(AtomicUsize::new(0));
    let cancelled = Arc::new(AtomicUsize::new(0));

    // A separate executor for the slow task's own work, so cancellation
    // (delivered via the combined and_success executor below) genuinely
    // races against it instead of queuing harmlessly behind it on the
    // same FIFO worker thread.
    let slow_task: Task<i32> = Task::spawn(
        serial(),
        {
            let cancelled = Arc::clone(&cancelled);
            move || {
                cancelled.fetch_add(1, Ordering::AcqRel);
            }
        },
        {
            let ran = Arc::clone(&ran);
            move || {
                std::thread::sleep(Duration::from_millis(50));
                ran.fetch_add(1, Ordering::AcqRel);
                Ok(1)
            }
        },
    );
    let quick_failure = Task::<i32>::failure(Error::InvalidInput);

    let combined = Task::and_success(serial(), vec![slow_task, quick_failure]);

    assert!(matches!(
        combined.wait(Timeout::Bounded(Duration::from_secs(1))),
        Some(Err(Error::InvalidInput))
    ));
    assert_eq!(cancelled.load(Ordering::Acquire), 1, "the losing sibling's on_cancel ran");
    assert_eq!(ran.load(Ordering::Acquire), 0, "the losing sibling's work never started");
}

#[test]
fn fallback_recovers_through_a_second_spawned_attempt() {
    let executor = serial();

    let primary: Task<i32> = Task::failure(Error::InvalidInput);
    let recovered = primary.fallback(Arc::clone(&executor), move |_error| {
        Task::spawn(executor, || panic!("must not be cancelled"), || Ok(5))
    });

    assert_eq!(recovered.wait(Timeout::Bounded(Duration::from_secs(1))), Some(Ok(5)));
}
