use super::event::Event;
use super::observer::{FnObserver, Gate, GuardedObserver, Observer};
use super::scheduler::Scheduler;
use super::subscription::Subscription;
use crate::sync::task::Task;

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Blanket bound for anything that can travel down a stream.
pub trait ObservableType: Send + Sync + Clone + Debug + 'static {}

impl<T> ObservableType for T where T: Send + Sync + Clone + Debug + 'static {}

type ProducerFn<T> = dyn Fn(Arc<dyn Observer<T>>) -> Subscription + Send + Sync;

/// A subscribable producer of [Event]s.
///
/// An observable does nothing until [subscribe](Observable::subscribe) is
/// called; each subscription asks the producer to begin delivering events
/// to that observer and returns the handle that stops it again. Events
/// arrive in production order and nothing follows a terminal event. Whether
/// two subscriptions share one production run (hot) or start independent
/// runs (cold) is decided by the producer.
///
/// # Example
/// ```
/// use tempo::stream::observable::Observable;
/// use tempo::stream::scheduler::ImmediateScheduler;
/// use std::sync::{Arc, Mutex};
///
/// let scheduler = Arc::new(ImmediateScheduler::new());
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let cloned = seen.clone();
/// let subscription = Observable::of(vec![1, 2, 3], scheduler)
///   .subscribe_next(move |x| cloned.lock().unwrap().push(x));
/// subscription.unsubscribe();
/// assert_eq!(*seen.lock().unwrap(), [1, 2, 3]);
/// ```
pub struct Observable<T>
where
  T: ObservableType,
{
  producer: Arc<ProducerFn<T>>,
}

impl<T> Clone for Observable<T>
where
  T: ObservableType,
{
  fn clone(&self) -> Self {
    Observable {
      producer: self.producer.clone(),
    }
  }
}

impl<T> Observable<T>
where
  T: ObservableType,
{
  /// Builds an observable from a producer invoked once per subscription.
  pub fn create<F>(producer: F) -> Self
  where
    F: Fn(Arc<dyn Observer<T>>) -> Subscription + Send + Sync + 'static,
  {
    Observable {
      producer: Arc::new(producer),
    }
  }

  /// A cold observable that emits `values` in order and then completes.
  ///
  /// Production runs on `scheduler` and restarts for every subscription.
  pub fn of(values: Vec<T>, scheduler: Arc<dyn Scheduler>) -> Self {
    let events: Vec<Event<T>> = values
      .into_iter()
      .map(Event::Next)
      .chain(std::iter::once(Event::Completed))
      .collect();
    Self::from_events(events, scheduler)
  }

  /// A cold observable replaying a literal event script.
  ///
  /// The whole script is delivered as one scheduled unit so its order
  /// survives concurrent schedulers; delivery past the script's first
  /// terminal event is cut off by the subscription's gate.
  pub fn from_events(events: Vec<Event<T>>, scheduler: Arc<dyn Scheduler>) -> Self {
    Observable::create(move |observer| {
      let events = events.clone();
      let target = observer.clone();
      scheduler.schedule(Task::new(move || {
        for event in events {
          event.deliver_to(target.as_ref());
        }
      }));
      Subscription::empty()
    })
  }

  /// Subscribes to every source at once and lets the first to emit any
  /// event - value or terminal - win the race; every other source is
  /// disposed on the spot and all later events come solely from the winner.
  /// Sources tie-break in list order.
  pub fn race(sources: Vec<Observable<T>>) -> Self {
    const UNDECIDED: usize = usize::MAX;
    Observable::create(move |observer| {
      let winner = Arc::new(AtomicUsize::new(UNDECIDED));
      let entries: Arc<Mutex<Vec<Subscription>>> = Arc::new(Mutex::new(Vec::new()));
      let claim = {
        let winner = winner.clone();
        let entries = entries.clone();
        Arc::new(move |index: usize| -> bool {
          match winner.compare_exchange(UNDECIDED, index, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => {
              for (i, entry) in entries.lock().unwrap().iter().enumerate() {
                if i != index {
                  entry.unsubscribe();
                }
              }
              true
            }
            Err(current) => current == index,
          }
        })
      };
      for (index, source) in sources.iter().enumerate() {
        let next = {
          let observer = observer.clone();
          let claim = claim.clone();
          move |value: T| {
            if claim(index) {
              observer.on_next(value);
            }
          }
        };
        let error = {
          let observer = observer.clone();
          let claim = claim.clone();
          move |error| {
            if claim(index) {
              observer.on_error(error);
            }
          }
        };
        let completed = {
          let observer = observer.clone();
          let claim = claim.clone();
          move || {
            if claim(index) {
              observer.on_completed();
            }
          }
        };
        let subscription = source.subscribe(Arc::new(FnObserver::new(next, error, completed)));
        entries.lock().unwrap().push(subscription);
      }
      // A source that emitted during its own subscribe call decided the
      // race before later entries existed; sweep the stragglers.
      let decided = winner.load(Ordering::SeqCst);
      if decided != UNDECIDED {
        for (i, entry) in entries.lock().unwrap().iter().enumerate() {
          if i != decided {
            entry.unsubscribe();
          }
        }
      }
      Subscription::new(move || {
        for entry in entries.lock().unwrap().iter() {
          entry.unsubscribe();
        }
      })
    })
  }

  /// Begins producing events into `observer` and returns the handle that
  /// stops delivery to it again.
  ///
  /// The observer is fenced behind a gate: after a terminal event, or after
  /// the returned subscription is disposed, nothing further reaches it.
  /// Other subscriptions to the same observable are unaffected.
  pub fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
    let gate = Arc::new(Gate::new());
    let guarded: Arc<dyn Observer<T>> = Arc::new(GuardedObserver::new(gate.clone(), observer));
    let inner = (self.producer)(guarded);
    Subscription::new(move || {
      gate.close();
      inner.unsubscribe();
    })
  }

  /// Subscribes with a values-only closure.
  pub fn subscribe_next<F>(&self, next: F) -> Subscription
  where
    F: Fn(T) + Send + Sync + 'static,
  {
    self.subscribe(Arc::new(FnObserver::next(next)))
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::stream::event::StreamError;
  use crate::stream::scheduler::ImmediateScheduler;

  fn immediate() -> Arc<dyn Scheduler> {
    Arc::new(ImmediateScheduler::new())
  }

  fn collecting<T>() -> (Arc<FnObserver<T>>, Arc<Mutex<Vec<Event<T>>>>)
  where
    T: ObservableType,
  {
    let events = Arc::new(Mutex::new(Vec::new()));
    let on_next = events.clone();
    let on_error = events.clone();
    let on_completed = events.clone();
    let observer = Arc::new(FnObserver::new(
      move |value| on_next.lock().unwrap().push(Event::Next(value)),
      move |error| on_error.lock().unwrap().push(Event::Error(error)),
      move || on_completed.lock().unwrap().push(Event::Completed),
    ));
    (observer, events)
  }

  #[test]
  fn of_emits_then_completes_test() {
    let (observer, events) = collecting();
    let _subscription = Observable::of(vec![1, 2], immediate()).subscribe(observer);
    assert_eq!(
      *events.lock().unwrap(),
      [Event::Next(1), Event::Next(2), Event::Completed]
    );
  }

  #[test]
  fn cold_subscription_restarts_production_test() {
    let source = Observable::of(vec![1, 2], immediate());
    let (first, first_events) = collecting();
    let (second, second_events) = collecting();
    let _one = source.subscribe(first);
    let _two = source.subscribe(second);
    assert_eq!(first_events.lock().unwrap().len(), 3);
    assert_eq!(second_events.lock().unwrap().len(), 3);
  }

  #[test]
  fn from_events_stops_at_terminal_test() {
    let (observer, events) = collecting();
    let script = vec![
      Event::Next(1),
      Event::Error(StreamError::Source("boom".to_owned())),
      Event::Next(2),
    ];
    let _subscription = Observable::from_events(script, immediate()).subscribe(observer);
    assert_eq!(
      *events.lock().unwrap(),
      [
        Event::Next(1),
        Event::Error(StreamError::Source("boom".to_owned()))
      ]
    );
  }

  #[test]
  fn disposed_subscription_stops_delivery_test() {
    let produced: Arc<Mutex<Vec<Arc<dyn Observer<i32>>>>> = Arc::new(Mutex::new(Vec::new()));
    let holders = produced.clone();
    let source = Observable::create(move |observer| {
      holders.lock().unwrap().push(observer);
      Subscription::empty()
    });
    let (observer, events) = collecting();
    let subscription = source.subscribe(observer);
    produced.lock().unwrap()[0].on_next(1);
    subscription.unsubscribe();
    produced.lock().unwrap()[0].on_next(2);
    assert_eq!(*events.lock().unwrap(), [Event::Next(1)]);
  }

  #[test]
  fn race_first_source_wins_synchronous_test() {
    let first = Observable::of(vec![1, 2], immediate());
    let second = Observable::of(vec![10, 20], immediate());
    let (observer, events) = collecting();
    let _subscription = Observable::race(vec![first, second]).subscribe(observer);
    assert_eq!(
      *events.lock().unwrap(),
      [Event::Next(1), Event::Next(2), Event::Completed]
    );
  }
}
