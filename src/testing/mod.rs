//! The marble-test harness: scripted observables over a virtual clock.
//!
//! A [VirtualScheduler](scheduler::VirtualScheduler) replaces real waiting
//! with a logical clock that only moves when its run loop pops the next
//! queued action, so a whole subscribe → emit → teardown lifecycle runs
//! synchronously and lands in the same order every time. On top of it sit
//! the factories for pre-scripted hot and cold observables and the
//! recording observer that timestamps everything it receives.
mod marble;
pub mod recorded;
pub mod scheduler;
