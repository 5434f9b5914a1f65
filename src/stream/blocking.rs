use super::event::StreamError;
use super::observable::{Observable, ObservableType};
use super::observer::FnObserver;

use std::sync::mpsc::channel;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// The terminal outcome of one stream run: completion with everything the
/// stream produced, or failure carrying whatever had accumulated when the
/// error arrived.
#[must_use = "the failed variant carries the stream error"]
#[derive(Clone, Debug, PartialEq)]
pub enum Materialized<T> {
  Completed(Vec<T>),
  Failed { values: Vec<T>, error: StreamError },
}

pub trait Materialize<T>
where
  T: ObservableType,
{
  /// Blocks the calling thread until the stream terminates, then folds the
  /// whole run into a single [Materialized] result.
  ///
  /// The wait is bounded: if no terminal event arrives within `wait` the
  /// run is disposed and reported as failed with
  /// [StreamError::TimedOut], values-so-far intact. Meant for streams
  /// producing on a real scheduler; blocking a virtual-time test would
  /// deadlock it.
  ///
  /// # Example
  /// ```
  /// use tempo::stream::blocking::{Materialize, Materialized};
  /// use tempo::stream::observable::Observable;
  /// use tempo::stream::scheduler::ImmediateScheduler;
  /// use std::sync::Arc;
  /// use std::time::Duration;
  ///
  /// let scheduler = Arc::new(ImmediateScheduler::new());
  /// let result = Observable::of(vec![1, 2], scheduler)
  ///   .materialize(Duration::from_secs(1));
  /// assert_eq!(result, Materialized::Completed(vec![1, 2]));
  /// ```
  fn materialize(&self, wait: Duration) -> Materialized<T>;
}

impl<T> Materialize<T> for Observable<T>
where
  T: ObservableType,
{
  fn materialize(&self, wait: Duration) -> Materialized<T> {
    let values = Arc::new(Mutex::new(Vec::new()));
    let (tx, rx) = channel();
    let error_tx = Mutex::new(tx.clone());
    let completed_tx = Mutex::new(tx);
    let collect = values.clone();
    let subscription = self.subscribe(Arc::new(FnObserver::new(
      move |value| collect.lock().unwrap().push(value),
      move |error| {
        let _ = error_tx.lock().unwrap().send(Some(error));
      },
      move || {
        let _ = completed_tx.lock().unwrap().send(None);
      },
    )));
    let outcome = rx.recv_timeout(wait);
    subscription.unsubscribe();
    let values = values.lock().unwrap().clone();
    match outcome {
      Ok(None) => Materialized::Completed(values),
      Ok(Some(error)) => Materialized::Failed { values, error },
      Err(_) => Materialized::Failed {
        values,
        error: StreamError::TimedOut,
      },
    }
  }
}

pub trait ToArray<T>
where
  T: ObservableType,
{
  /// Blocks until completion and yields every value the stream produced,
  /// in order.
  ///
  /// An error (or an expired wait) yields `Err` and drops the partial
  /// accumulation; use [Materialize::materialize] when the values
  /// collected before the failure still matter.
  fn to_array(&self, wait: Duration) -> Result<Vec<T>, StreamError>;
}

impl<T> ToArray<T> for Observable<T>
where
  T: ObservableType,
{
  fn to_array(&self, wait: Duration) -> Result<Vec<T>, StreamError> {
    match self.materialize(wait) {
      Materialized::Completed(values) => Ok(values),
      Materialized::Failed { error, .. } => Err(error),
    }
  }
}

pub trait First<T>
where
  T: ObservableType,
{
  /// Blocks until the stream's first value.
  ///
  /// `Ok(None)` means the stream completed without producing one; an error
  /// event or an expired wait yields `Err`.
  fn first(&self, wait: Duration) -> Result<Option<T>, StreamError>;
}

impl<T> First<T> for Observable<T>
where
  T: ObservableType,
{
  fn first(&self, wait: Duration) -> Result<Option<T>, StreamError> {
    let (tx, rx) = channel();
    let next_tx = Mutex::new(tx.clone());
    let error_tx = Mutex::new(tx.clone());
    let completed_tx = Mutex::new(tx);
    let subscription = self.subscribe(Arc::new(FnObserver::new(
      move |value| {
        let _ = next_tx.lock().unwrap().send(Ok(Some(value)));
      },
      move |error| {
        let _ = error_tx.lock().unwrap().send(Err(error));
      },
      move || {
        let _ = completed_tx.lock().unwrap().send(Ok(None));
      },
    )));
    let outcome = rx.recv_timeout(wait);
    subscription.unsubscribe();
    match outcome {
      Ok(result) => result,
      Err(_) => Err(StreamError::TimedOut),
    }
  }
}
