//! Tempo is:
//! * a push based observable/operator event engine with explicit, pluggable
//!   schedulers.
//! * a marble-test harness built on a virtual-time scheduler, so stream and
//!   scheduler code can be tested synchronously and reproducibly instead of
//!   waiting on a real clock.
//! * a small reactive color pipeline (one mutable input cell, several
//!   derived streams) exercised by both execution models.
#[macro_use]
extern crate lazy_static;

pub mod palette;
pub mod stream;
pub mod sync;
pub mod testing;
pub mod utils;
