//! Process-wide parallelism setting.
//!
//! Kept in its own test binary: it mutates global state that the unit tests
//! of the crate read.

use std::sync::Mutex;

use rimg_core::{parallel, Parallelism};

#[test]
fn test_global_toggle_controls_parallel() {
    assert_eq!(Parallelism::global(), Parallelism::new());

    Parallelism::set_global(Parallelism::sequential());
    assert_eq!(Parallelism::global(), Parallelism::sequential());
    let calls = Mutex::new(Vec::new());
    parallel(500, |range| calls.lock().unwrap().push(range));
    assert_eq!(calls.into_inner().unwrap(), [0..500]);

    Parallelism::set_global(Parallelism::new().with_workers(4).unwrap().with_chunks_per_worker(2));
    let calls = Mutex::new(Vec::new());
    parallel(500, |range| calls.lock().unwrap().push(range));
    let mut ranges = calls.into_inner().unwrap();
    ranges.sort_by_key(|r| r.start);
    // chunk = 500 / (4 * 2)
    assert_eq!(ranges.len(), 9);
    assert!(ranges.windows(2).all(|w| w[0].end == w[1].start));
    assert_eq!(ranges.last().map(|r| r.end), Some(500));

    Parallelism::set_global(Parallelism::default());
    assert_eq!(Parallelism::global(), Parallelism::new());
}
