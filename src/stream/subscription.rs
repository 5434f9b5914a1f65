use crate::sync::task::Task;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

struct SubscriptionInner {
  disposed: AtomicBool,
  teardown: Mutex<Option<Task>>,
}

impl SubscriptionInner {
  fn dispose(&self) {
    if !self.disposed.swap(true, Ordering::SeqCst) {
      let task = self.teardown.lock().unwrap().take();
      if let Some(task) = task {
        task.invoke();
      }
    }
  }
}

/// The handle returned by
/// [subscribe](crate::stream::observable::Observable::subscribe).
///
/// Disposal is idempotent and safe to call from any thread; the teardown
/// runs at most once. The handle also unsubscribes when dropped, tying the
/// subscription to its scope.
///
/// # Example
/// ```
/// use tempo::stream::subscription::Subscription;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let released = Arc::new(AtomicUsize::new(0));
/// let cloned = released.clone();
/// let subscription = Subscription::new(move || {
///   cloned.fetch_add(1, Ordering::Relaxed);
/// });
/// subscription.unsubscribe();
/// subscription.unsubscribe();
/// assert_eq!(released.load(Ordering::Relaxed), 1);
/// ```
pub struct Subscription {
  inner: Arc<SubscriptionInner>,
}

impl Subscription {
  pub fn new<F>(teardown: F) -> Self
  where
    F: FnOnce() + Send + 'static,
  {
    Subscription {
      inner: Arc::new(SubscriptionInner {
        disposed: AtomicBool::new(false),
        teardown: Mutex::new(Some(Task::new(teardown))),
      }),
    }
  }

  /// A subscription with nothing to release.
  pub fn empty() -> Self {
    Subscription {
      inner: Arc::new(SubscriptionInner {
        disposed: AtomicBool::new(false),
        teardown: Mutex::new(None),
      }),
    }
  }

  /// Releases the subscription; calling it again has no further effect.
  pub fn unsubscribe(&self) {
    self.inner.dispose();
  }

  pub fn disposed(&self) -> bool {
    self.inner.disposed.load(Ordering::SeqCst)
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    self.unsubscribe();
  }
}

/// A late-bound slot operators park their upstream handle in.
///
/// Disposing the cell before the handle arrives disposes the handle the
/// moment it is set, so a terminal event racing the subscribe call itself
/// cannot leak an upstream subscription.
#[derive(Clone)]
pub(crate) struct SubscriptionCell {
  disposed: Arc<AtomicBool>,
  slot: Arc<Mutex<Option<Subscription>>>,
}

impl SubscriptionCell {
  pub fn new() -> Self {
    SubscriptionCell {
      disposed: Arc::new(AtomicBool::new(false)),
      slot: Arc::new(Mutex::new(None)),
    }
  }

  pub fn set(&self, subscription: Subscription) {
    let mut slot = self.slot.lock().unwrap();
    if self.disposed.load(Ordering::SeqCst) {
      drop(slot);
      subscription.unsubscribe();
    } else {
      *slot = Some(subscription);
    }
  }

  pub fn dispose(&self) {
    self.disposed.store(true, Ordering::SeqCst);
    let taken = self.slot.lock().unwrap().take();
    if let Some(subscription) = taken {
      subscription.unsubscribe();
    }
  }
}
