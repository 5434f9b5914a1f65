use super::event::StreamError;
use super::observable::{Observable, ObservableType};
use super::observer::FnObserver;
use super::subscription::{Subscription, SubscriptionCell};

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub use super::blocking::{First, Materialize, ToArray};

fn panic_message(payload: Box<dyn Any + Send>) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_owned()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "user closure panicked".to_owned()
  }
}

/// Runs a user supplied closure, converting a panic into the stream error
/// that terminates the subscription.
fn guarded<R, F>(body: F) -> Result<R, StreamError>
where
  F: FnOnce() -> R,
{
  catch_unwind(AssertUnwindSafe(body))
    .map_err(|payload| StreamError::Operator(panic_message(payload)))
}

pub trait Filter<T>
where
  T: ObservableType,
{
  /// Re-emits a value iff `predicate` holds and drops the rest.
  ///
  /// Errors and completion pass through unchanged, in order. A panic
  /// inside `predicate` surfaces as a terminal stream error on that
  /// subscription.
  ///
  /// # Example
  /// ```
  /// use tempo::stream::observable::Observable;
  /// use tempo::stream::ops::*;
  /// use tempo::stream::scheduler::ImmediateScheduler;
  /// use std::sync::Arc;
  /// use std::time::Duration;
  ///
  /// let scheduler = Arc::new(ImmediateScheduler::new());
  /// let values = Observable::of(vec![1, 2, 3, 2, 1], scheduler)
  ///   .filter(|x| *x < 3)
  ///   .to_array(Duration::from_secs(1))
  ///   .unwrap();
  /// assert_eq!(values, [1, 2, 2, 1]);
  /// ```
  fn filter<F>(&self, predicate: F) -> Observable<T>
  where
    F: Fn(&T) -> bool + Send + Sync + 'static;
}

impl<T> Filter<T> for Observable<T>
where
  T: ObservableType,
{
  fn filter<F>(&self, predicate: F) -> Observable<T>
  where
    F: Fn(&T) -> bool + Send + Sync + 'static,
  {
    let source = self.clone();
    let predicate = Arc::new(predicate);
    Observable::create(move |observer| {
      let upstream = SubscriptionCell::new();
      let next = {
        let observer = observer.clone();
        let predicate = predicate.clone();
        let upstream = upstream.clone();
        move |value: T| match guarded(|| predicate(&value)) {
          Ok(true) => observer.on_next(value),
          Ok(false) => (),
          Err(error) => {
            observer.on_error(error);
            upstream.dispose();
          }
        }
      };
      let error = {
        let observer = observer.clone();
        move |error| observer.on_error(error)
      };
      let completed = {
        let observer = observer.clone();
        move || observer.on_completed()
      };
      upstream.set(source.subscribe(Arc::new(FnObserver::new(next, error, completed))));
      let teardown = upstream.clone();
      Subscription::new(move || teardown.dispose())
    })
  }
}

pub trait Map<A, B>
where
  A: ObservableType,
  B: ObservableType,
{
  /// Transforms every value with `map`, leaving timing and termination
  /// untouched. A panic inside `map` surfaces as a terminal stream error.
  ///
  /// # Example
  /// ```
  /// use tempo::stream::observable::Observable;
  /// use tempo::stream::ops::*;
  /// use tempo::stream::scheduler::ImmediateScheduler;
  /// use std::sync::Arc;
  /// use std::time::Duration;
  ///
  /// let scheduler = Arc::new(ImmediateScheduler::new());
  /// let values = Observable::of(vec![1, 2, 3], scheduler)
  ///   .map(|x| format!("value_{}", x))
  ///   .to_array(Duration::from_secs(1))
  ///   .unwrap();
  /// assert_eq!(values, ["value_1", "value_2", "value_3"]);
  /// ```
  fn map<F>(&self, map: F) -> Observable<B>
  where
    F: Fn(A) -> B + Send + Sync + 'static;
}

impl<A, B> Map<A, B> for Observable<A>
where
  A: ObservableType,
  B: ObservableType,
{
  fn map<F>(&self, map: F) -> Observable<B>
  where
    F: Fn(A) -> B + Send + Sync + 'static,
  {
    let source = self.clone();
    let map = Arc::new(map);
    Observable::create(move |observer| {
      let upstream = SubscriptionCell::new();
      let next = {
        let observer = observer.clone();
        let map = map.clone();
        let upstream = upstream.clone();
        move |value: A| match guarded(|| map(value)) {
          Ok(mapped) => observer.on_next(mapped),
          Err(error) => {
            observer.on_error(error);
            upstream.dispose();
          }
        }
      };
      let error = {
        let observer = observer.clone();
        move |error| observer.on_error(error)
      };
      let completed = {
        let observer = observer.clone();
        move || observer.on_completed()
      };
      upstream.set(source.subscribe(Arc::new(FnObserver::new(next, error, completed))));
      let teardown = upstream.clone();
      Subscription::new(move || teardown.dispose())
    })
  }
}

pub trait FilterMap<A, B>
where
  A: ObservableType,
  B: ObservableType,
{
  /// Maps every value and keeps only the `Some` results.
  ///
  /// The map-or-drop shape lets a fallible step degrade to "no emission"
  /// instead of terminating the stream.
  ///
  /// # Example
  /// ```
  /// use tempo::stream::observable::Observable;
  /// use tempo::stream::ops::*;
  /// use tempo::stream::scheduler::ImmediateScheduler;
  /// use std::sync::Arc;
  /// use std::time::Duration;
  ///
  /// let scheduler = Arc::new(ImmediateScheduler::new());
  /// let values = Observable::of(vec!["4", "x", "6"], scheduler)
  ///   .filter_map(|x| x.parse::<i32>().ok())
  ///   .to_array(Duration::from_secs(1))
  ///   .unwrap();
  /// assert_eq!(values, [4, 6]);
  /// ```
  fn filter_map<F>(&self, map: F) -> Observable<B>
  where
    F: Fn(A) -> Option<B> + Send + Sync + 'static;
}

impl<A, B> FilterMap<A, B> for Observable<A>
where
  A: ObservableType,
  B: ObservableType,
{
  fn filter_map<F>(&self, map: F) -> Observable<B>
  where
    F: Fn(A) -> Option<B> + Send + Sync + 'static,
  {
    let source = self.clone();
    let map = Arc::new(map);
    Observable::create(move |observer| {
      let upstream = SubscriptionCell::new();
      let next = {
        let observer = observer.clone();
        let map = map.clone();
        let upstream = upstream.clone();
        move |value: A| match guarded(|| map(value)) {
          Ok(Some(mapped)) => observer.on_next(mapped),
          Ok(None) => (),
          Err(error) => {
            observer.on_error(error);
            upstream.dispose();
          }
        }
      };
      let error = {
        let observer = observer.clone();
        move |error| observer.on_error(error)
      };
      let completed = {
        let observer = observer.clone();
        move || observer.on_completed()
      };
      upstream.set(source.subscribe(Arc::new(FnObserver::new(next, error, completed))));
      let teardown = upstream.clone();
      Subscription::new(move || teardown.dispose())
    })
  }
}

pub trait Skip<T>
where
  T: ObservableType,
{
  /// Drops the first `n` values and passes everything after through,
  /// terminal events included.
  ///
  /// # Example
  /// ```
  /// use tempo::stream::observable::Observable;
  /// use tempo::stream::ops::*;
  /// use tempo::stream::scheduler::ImmediateScheduler;
  /// use std::sync::Arc;
  /// use std::time::Duration;
  ///
  /// let scheduler = Arc::new(ImmediateScheduler::new());
  /// let values = Observable::of(vec![1, 2, 3], scheduler)
  ///   .skip(2)
  ///   .to_array(Duration::from_secs(1))
  ///   .unwrap();
  /// assert_eq!(values, [3]);
  /// ```
  fn skip(&self, n: usize) -> Observable<T>;
}

impl<T> Skip<T> for Observable<T>
where
  T: ObservableType,
{
  fn skip(&self, n: usize) -> Observable<T> {
    let source = self.clone();
    Observable::create(move |observer| {
      let seen = Arc::new(AtomicUsize::new(0));
      let next = {
        let observer = observer.clone();
        move |value: T| {
          if seen.fetch_add(1, Ordering::Relaxed) >= n {
            observer.on_next(value);
          }
        }
      };
      let error = {
        let observer = observer.clone();
        move |error| observer.on_error(error)
      };
      let completed = {
        let observer = observer.clone();
        move || observer.on_completed()
      };
      source.subscribe(Arc::new(FnObserver::new(next, error, completed)))
    })
  }
}

pub trait DistinctUntilChanged<T>
where
  T: ObservableType + PartialEq,
{
  /// Suppresses a value equal to the one delivered immediately before it.
  ///
  /// # Example
  /// ```
  /// use tempo::stream::observable::Observable;
  /// use tempo::stream::ops::*;
  /// use tempo::stream::scheduler::ImmediateScheduler;
  /// use std::sync::Arc;
  /// use std::time::Duration;
  ///
  /// let scheduler = Arc::new(ImmediateScheduler::new());
  /// let values = Observable::of(vec![1, 1, 2, 2, 1], scheduler)
  ///   .distinct_until_changed()
  ///   .to_array(Duration::from_secs(1))
  ///   .unwrap();
  /// assert_eq!(values, [1, 2, 1]);
  /// ```
  fn distinct_until_changed(&self) -> Observable<T>;
}

impl<T> DistinctUntilChanged<T> for Observable<T>
where
  T: ObservableType + PartialEq,
{
  fn distinct_until_changed(&self) -> Observable<T> {
    let source = self.clone();
    Observable::create(move |observer| {
      let last: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));
      let next = {
        let observer = observer.clone();
        move |value: T| {
          let repeat = {
            let mut guard = last.lock().unwrap();
            if guard.as_ref() == Some(&value) {
              true
            } else {
              *guard = Some(value.clone());
              false
            }
          };
          if !repeat {
            observer.on_next(value);
          }
        }
      };
      let error = {
        let observer = observer.clone();
        move |error| observer.on_error(error)
      };
      let completed = {
        let observer = observer.clone();
        move || observer.on_completed()
      };
      source.subscribe(Arc::new(FnObserver::new(next, error, completed)))
    })
  }
}

pub trait Amb<T>
where
  T: ObservableType,
{
  /// Races this observable against `other`; whichever emits any event
  /// first wins, the loser is disposed immediately and ties go to `self`.
  /// See [race](Observable::race).
  fn amb(&self, other: &Observable<T>) -> Observable<T>;
}

impl<T> Amb<T> for Observable<T>
where
  T: ObservableType,
{
  fn amb(&self, other: &Observable<T>) -> Observable<T> {
    Observable::race(vec![self.clone(), other.clone()])
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::stream::event::Event;
  use crate::stream::subject::{PublishSubject, Subject};

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
  fn filter_drops_values_test() {
    let subject = PublishSubject::new();
    let (observer, events) = collecting();
    let _subscription = subject.observe().filter(|x| x % 3 == 0).subscribe(observer);
    for i in 1..=6 {
      subject.next(i);
    }
    assert_eq!(*events.lock().unwrap(), [Event::Next(3), Event::Next(6)]);
  }

  #[test]
  fn filter_panic_becomes_stream_error_test() {
    let subject = PublishSubject::new();
    let (observer, events) = collecting();
    let _subscription = subject
      .observe()
      .filter(|x: &i32| if *x == 2 { panic!("bad predicate") } else { true })
      .subscribe(observer);
    subject.next(1);
    subject.next(2);
    subject.next(3);
    assert_eq!(
      *events.lock().unwrap(),
      [
        Event::Next(1),
        Event::Error(StreamError::Operator("bad predicate".to_owned()))
      ]
    );
  }

  #[test]
  fn map_transforms_values_test() {
    let subject = PublishSubject::new();
    let (observer, events) = collecting();
    let _subscription = subject
      .observe()
      .map(|x| format!("test_{}", x))
      .subscribe(observer);
    subject.next(1234);
    assert_eq!(
      *events.lock().unwrap(),
      [Event::Next("test_1234".to_owned())]
    );
  }

  #[test]
  fn filter_map_drops_none_test() {
    let subject = PublishSubject::new();
    let (observer, events) = collecting();
    let _subscription = subject
      .observe()
      .filter_map(|x: i32| if x % 2 == 0 { Some(x * 10) } else { None })
      .subscribe(observer);
    for i in 1..=4 {
      subject.next(i);
    }
    assert_eq!(*events.lock().unwrap(), [Event::Next(20), Event::Next(40)]);
  }

  #[test]
  fn skip_drops_leading_values_test() {
    let subject = PublishSubject::new();
    let (observer, events) = collecting();
    let _subscription = subject.observe().skip(2).subscribe(observer);
    for i in 1..=4 {
      subject.next(i);
    }
    assert_eq!(*events.lock().unwrap(), [Event::Next(3), Event::Next(4)]);
  }

  #[test]
  fn distinct_suppresses_consecutive_repeats_test() {
    let subject = PublishSubject::new();
    let (observer, events) = collecting();
    let _subscription = subject.observe().distinct_until_changed().subscribe(observer);
    for value in [1, 1, 2, 2, 2, 1].iter() {
      subject.next(*value);
    }
    assert_eq!(
      *events.lock().unwrap(),
      [Event::Next(1), Event::Next(2), Event::Next(1)]
    );
  }

  #[test]
  fn amb_prefers_first_emitter_test() {
    let slow = PublishSubject::new();
    let fast = PublishSubject::new();
    let (observer, events) = collecting();
    let _subscription = slow.observe().amb(&fast.observe()).subscribe(observer);
    fast.next(10);
    slow.next(1);
    fast.next(20);
    assert_eq!(*events.lock().unwrap(), [Event::Next(10), Event::Next(20)]);
  }
}
