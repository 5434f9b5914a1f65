use super::event::StreamError;
use super::observable::ObservableType;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The capability set a stream pushes into.
///
/// An observer holds no ownership over the observable; the observable owns
/// the production lifecycle of each subscription.
pub trait Observer<T>: Send + Sync
where
  T: ObservableType,
{
  fn on_next(&self, value: T);
  fn on_error(&self, error: StreamError);
  fn on_completed(&self);
}

type NextFn<T> = dyn Fn(T) + Send + Sync;
type ErrorFn = dyn Fn(StreamError) + Send + Sync;
type CompletedFn = dyn Fn() + Send + Sync;

/// An [Observer] assembled from closures.
pub struct FnObserver<T>
where
  T: ObservableType,
{
  next: Box<NextFn<T>>,
  error: Box<ErrorFn>,
  completed: Box<CompletedFn>,
}

impl<T> FnObserver<T>
where
  T: ObservableType,
{
  pub fn new<N, E, C>(next: N, error: E, completed: C) -> Self
  where
    N: Fn(T) + Send + Sync + 'static,
    E: Fn(StreamError) + Send + Sync + 'static,
    C: Fn() + Send + Sync + 'static,
  {
    FnObserver {
      next: Box::new(next),
      error: Box::new(error),
      completed: Box::new(completed),
    }
  }

  /// An observer that only cares about values; terminal events are dropped.
  pub fn next<N>(next: N) -> Self
  where
    N: Fn(T) + Send + Sync + 'static,
  {
    Self::new(next, |_| {}, || {})
  }
}

impl<T> Observer<T> for FnObserver<T>
where
  T: ObservableType,
{
  fn on_next(&self, value: T) {
    (self.next)(value)
  }

  fn on_error(&self, error: StreamError) {
    (self.error)(error)
  }

  fn on_completed(&self) {
    (self.completed)()
  }
}

/// Latch enforcing the terminal-once rule and the disposal cut-off.
pub(crate) struct Gate {
  stopped: AtomicBool,
}

impl Gate {
  pub fn new() -> Self {
    Gate {
      stopped: AtomicBool::new(false),
    }
  }

  /// Closes the gate; true only for the call that closed it.
  pub fn close(&self) -> bool {
    !self.stopped.swap(true, Ordering::SeqCst)
  }

  pub fn closed(&self) -> bool {
    self.stopped.load(Ordering::SeqCst)
  }
}

/// Wraps a downstream observer so nothing is delivered after a terminal
/// event or after disposal, whichever comes first.
pub(crate) struct GuardedObserver<T>
where
  T: ObservableType,
{
  gate: Arc<Gate>,
  target: Arc<dyn Observer<T>>,
}

impl<T> GuardedObserver<T>
where
  T: ObservableType,
{
  pub fn new(gate: Arc<Gate>, target: Arc<dyn Observer<T>>) -> Self {
    GuardedObserver { gate, target }
  }
}

impl<T> Observer<T> for GuardedObserver<T>
where
  T: ObservableType,
{
  fn on_next(&self, value: T) {
    if !self.gate.closed() {
      self.target.on_next(value);
    }
  }

  fn on_error(&self, error: StreamError) {
    if self.gate.close() {
      self.target.on_error(error);
    }
  }

  fn on_completed(&self) {
    if self.gate.close() {
      self.target.on_completed();
    }
  }
}
