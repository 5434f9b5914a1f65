//! Execution plumbing backing the real (wall-clock) schedulers.
//!
//! ## Why reinvent the wheel?
//!
//! The engine's correctness model depends on knowing exactly how work is
//! ordered once it leaves the caller's thread. Building the worker and the
//! pool by hand keeps that ordering policy in one place instead of behind a
//! runtime. The virtual scheduler in [crate::testing] needs none of this:
//! it is single threaded by construction.
pub mod pool;
pub mod task;
pub mod worker;
