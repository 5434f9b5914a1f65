//! Tempo's reactive core. The module is organized into the following sub
//! modules:
//! * `event` which defines the [Event](event::Event) variant describing one
//!   occurrence on a stream, and the stream error taxonomy.
//! * `observer` which defines the [Observer](observer::Observer) capability
//!   set and the terminal-once gate.
//! * `observable` which implements the [Observable](observable::Observable)
//!   type - a subscribable producer of events.
//! * `ops` which contains the observable operators.
//! * `blocking` which contains the blocking terminal collectors used when a
//!   stream runs on a real scheduler.
//! * `scheduler` which defines the [Scheduler](scheduler::Scheduler) seam
//!   between "when" an action runs and "what" it does.
//! * `subject` which implements the multicasting sources used as roots of
//!   live streams.
//! * `subscription` which implements the
//!   [Subscription](subscription::Subscription) disposal handle.
pub mod blocking;
pub mod event;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod scheduler;
pub mod subject;
pub mod subscription;
