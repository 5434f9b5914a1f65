use super::scheduler::VirtualScheduler;
use crate::stream::event::{Event, StreamError};
use crate::stream::observable::ObservableType;
use crate::stream::observer::Observer;
use crate::stream::scheduler::Scheduler;

use std::sync::Mutex;

/// An event stamped with the virtual time it occurred at.
///
/// A vector of these is both the input script of a hot or cold observable
/// and the output trace of a [RecordingObserver]; traces order by time,
/// with insertion order breaking ties.
#[derive(Clone, Debug, PartialEq)]
pub struct Recorded<T> {
  pub time: u64,
  pub event: Event<T>,
}

impl<T> Recorded<T> {
  pub fn new(time: u64, event: Event<T>) -> Self {
    Recorded { time, event }
  }
}

/// Scripts a value at `time`.
pub fn next<T>(time: u64, value: T) -> Recorded<T> {
  Recorded::new(time, Event::Next(value))
}

/// Scripts a terminal failure at `time`.
pub fn error<T>(time: u64, message: &str) -> Recorded<T> {
  Recorded::new(time, Event::Error(StreamError::Source(message.to_owned())))
}

/// Scripts a terminal completion at `time`.
pub fn completed<T>(time: u64) -> Recorded<T> {
  Recorded::new(time, Event::Completed)
}

/// Records every event it receives, stamped with the virtual time of
/// receipt, preserving delivery order.
pub struct RecordingObserver<T>
where
  T: ObservableType,
{
  scheduler: VirtualScheduler,
  events: Mutex<Vec<Recorded<T>>>,
}

impl<T> RecordingObserver<T>
where
  T: ObservableType,
{
  pub(super) fn new(scheduler: VirtualScheduler) -> Self {
    RecordingObserver {
      scheduler,
      events: Mutex::new(Vec::new()),
    }
  }

  /// The full recorded trace so far.
  pub fn events(&self) -> Vec<Recorded<T>> {
    self.events.lock().unwrap().clone()
  }

  /// Just the recorded values, in order; terminal events are skipped.
  pub fn values(&self) -> Vec<T> {
    self
      .events
      .lock()
      .unwrap()
      .iter()
      .filter_map(|recorded| recorded.event.value().cloned())
      .collect()
  }

  fn record(&self, event: Event<T>) {
    let time = self.scheduler.now();
    self.events.lock().unwrap().push(Recorded::new(time, event));
  }
}

impl<T> Observer<T> for RecordingObserver<T>
where
  T: ObservableType,
{
  fn on_next(&self, value: T) {
    self.record(Event::Next(value));
  }

  fn on_error(&self, error: StreamError) {
    self.record(Event::Error(error));
  }

  fn on_completed(&self) {
    self.record(Event::Completed);
  }
}
