use super::event::Event;
use super::observable::{Observable, ObservableType};
use super::observer::Observer;
use super::subscription::Subscription;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A multicasting source: the root a live stream grows from.
pub trait Subject<T>
where
  T: ObservableType,
{
  /// A hot observable view of this subject.
  fn observe(&self) -> Observable<T>;
  /// Pushes `value` to every observer attached at this moment.
  fn next(&self, value: T);
}

/// Attach/detach bookkeeping shared by every hot source, safe for
/// concurrent use under a real scheduler.
pub(crate) struct Registry<T>
where
  T: ObservableType,
{
  observers: Mutex<Vec<(usize, Arc<dyn Observer<T>>)>>,
  counter: AtomicUsize,
}

impl<T> Registry<T>
where
  T: ObservableType,
{
  pub fn new() -> Self {
    Registry {
      observers: Mutex::new(Vec::new()),
      counter: AtomicUsize::new(0),
    }
  }

  pub fn attach(&self, observer: Arc<dyn Observer<T>>) -> usize {
    let key = self.counter.fetch_add(1, Ordering::Relaxed);
    self.observers.lock().unwrap().push((key, observer));
    key
  }

  pub fn detach(&self, key: usize) {
    self.observers.lock().unwrap().retain(|(k, _)| *k != key);
  }

  /// Snapshot-then-deliver, so an observer callback may attach or detach
  /// without deadlocking the registry.
  pub fn publish(&self, event: &Event<T>) {
    let snapshot: Vec<Arc<dyn Observer<T>>> = self
      .observers
      .lock()
      .unwrap()
      .iter()
      .map(|(_, observer)| observer.clone())
      .collect();
    for observer in snapshot {
      event.deliver_to(observer.as_ref());
    }
  }
}

/// A hot source with no memory: observers only see values pushed after
/// they attach.
///
/// # Example
/// ```
/// use tempo::stream::subject::{PublishSubject, Subject};
/// use std::sync::{Arc, Mutex};
///
/// let subject = PublishSubject::new();
/// subject.next(1);
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let cloned = seen.clone();
/// let _subscription = subject.observe().subscribe_next(move |x| {
///   cloned.lock().unwrap().push(x);
/// });
/// subject.next(2);
/// assert_eq!(*seen.lock().unwrap(), [2]);
/// ```
pub struct PublishSubject<T>
where
  T: ObservableType,
{
  registry: Arc<Registry<T>>,
}

impl<T> Clone for PublishSubject<T>
where
  T: ObservableType,
{
  fn clone(&self) -> Self {
    PublishSubject {
      registry: self.registry.clone(),
    }
  }
}

impl<T> PublishSubject<T>
where
  T: ObservableType,
{
  pub fn new() -> Self {
    PublishSubject {
      registry: Arc::new(Registry::new()),
    }
  }
}

impl<T> Default for PublishSubject<T>
where
  T: ObservableType,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Subject<T> for PublishSubject<T>
where
  T: ObservableType,
{
  fn observe(&self) -> Observable<T> {
    let registry = self.registry.clone();
    Observable::create(move |observer| {
      let key = registry.attach(observer);
      let registry = registry.clone();
      Subscription::new(move || registry.detach(key))
    })
  }

  fn next(&self, value: T) {
    self.registry.publish(&Event::Next(value));
  }
}

/// A state cell: always holds a current value, replayed to each new
/// subscriber before live pushes follow.
///
/// The cell is the single source of truth for anything derived from it;
/// derived streams re-read it through subscription, never copy it.
pub struct BehaviorSubject<T>
where
  T: ObservableType,
{
  registry: Arc<Registry<T>>,
  state: Arc<Mutex<T>>,
}

impl<T> Clone for BehaviorSubject<T>
where
  T: ObservableType,
{
  fn clone(&self) -> Self {
    BehaviorSubject {
      registry: self.registry.clone(),
      state: self.state.clone(),
    }
  }
}

impl<T> BehaviorSubject<T>
where
  T: ObservableType,
{
  pub fn new(value: T) -> Self {
    BehaviorSubject {
      registry: Arc::new(Registry::new()),
      state: Arc::new(Mutex::new(value)),
    }
  }

  /// The value the cell currently holds.
  pub fn value(&self) -> T {
    self.state.lock().unwrap().clone()
  }
}

impl<T> Subject<T> for BehaviorSubject<T>
where
  T: ObservableType,
{
  fn observe(&self) -> Observable<T> {
    let registry = self.registry.clone();
    let state = self.state.clone();
    Observable::create(move |observer| {
      let key = registry.attach(observer.clone());
      // replay the snapshot taken after attach: a concurrent push lands in
      // the snapshot or in the broadcast, never in neither
      let current = state.lock().unwrap().clone();
      observer.on_next(current);
      let registry = registry.clone();
      Subscription::new(move || registry.detach(key))
    })
  }

  fn next(&self, value: T) {
    *self.state.lock().unwrap() = value.clone();
    self.registry.publish(&Event::Next(value));
  }
}
