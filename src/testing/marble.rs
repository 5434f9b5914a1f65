use super::recorded::{Recorded, RecordingObserver};
use super::scheduler::VirtualScheduler;
use crate::stream::observable::{Observable, ObservableType};
use crate::stream::scheduler::Scheduler;
use crate::stream::subject::Registry;
use crate::stream::subscription::Subscription;
use crate::sync::task::Task;

use std::sync::Arc;

impl VirtualScheduler {
  /// A hot observable playing `events` on one shared timeline, scripted in
  /// absolute virtual time at creation.
  ///
  /// The script runs once [start](Self::start) does, regardless of who is
  /// attached; events that fire before an observer attaches are gone for
  /// that observer.
  pub fn create_hot_observable<T>(&self, events: Vec<Recorded<T>>) -> Observable<T>
  where
    T: ObservableType,
  {
    let feed: Arc<Registry<T>> = Arc::new(Registry::new());
    for recorded in events {
      let feed = feed.clone();
      self.schedule_at(
        recorded.time,
        Task::new(move || feed.publish(&recorded.event)),
      );
    }
    Observable::create(move |observer| {
      let key = feed.attach(observer);
      let feed = feed.clone();
      Subscription::new(move || feed.detach(key))
    })
  }

  /// A cold observable replaying `events` with times taken relative to
  /// each subscription's own subscribe time.
  pub fn create_cold_observable<T>(&self, events: Vec<Recorded<T>>) -> Observable<T>
  where
    T: ObservableType,
  {
    let scheduler = self.clone();
    Observable::create(move |observer| {
      let base = scheduler.now();
      for recorded in events.clone() {
        let target = observer.clone();
        scheduler.schedule_at(
          base + recorded.time,
          Task::new(move || recorded.event.deliver_to(target.as_ref())),
        );
      }
      Subscription::empty()
    })
  }

  /// An observer recording everything it sees at the virtual time it sees
  /// it; read the trace back after [start](Self::start) returns.
  pub fn create_observer<T>(&self) -> Arc<RecordingObserver<T>>
  where
    T: ObservableType,
  {
    Arc::new(RecordingObserver::new(self.clone()))
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::testing::recorded::{completed, next};

  use std::sync::Mutex;

  #[test]
  fn hot_observable_shares_one_timeline_test() {
    let scheduler = VirtualScheduler::new(0);
    let source = scheduler.create_hot_observable(vec![
      next(100, "a"),
      next(200, "b"),
      next(300, "c"),
    ]);
    let observer = scheduler.create_observer();
    {
      let source = source.clone();
      let target = observer.clone();
      let slot = Arc::new(Mutex::new(None));
      let keep = slot.clone();
      scheduler.schedule_at(150, Task::new(move || {
        *keep.lock().unwrap() = Some(source.subscribe(target.clone()));
      }));
      let drop_slot = slot;
      scheduler.schedule_at(1000, Task::new(move || {
        drop_slot.lock().unwrap().take();
      }));
    }
    scheduler.start();
    // attached at 150: the event at 100 is gone for this observer
    assert_eq!(observer.events(), [next(200, "b"), next(300, "c")]);
  }

  #[test]
  fn cold_observable_shifts_to_subscribe_time_test() {
    let scheduler = VirtualScheduler::new(0);
    let source = scheduler.create_cold_observable(vec![next(50, 1), completed(60)]);
    let observer = scheduler.create_observer();
    {
      let source = source.clone();
      let target = observer.clone();
      let slot = Arc::new(Mutex::new(None));
      scheduler.schedule_at(30, Task::new(move || {
        *slot.lock().unwrap() = Some(source.subscribe(target.clone()));
      }));
    }
    scheduler.start();
    assert_eq!(observer.events(), [next(80, 1), completed(90)]);
  }

  #[test]
  fn cold_observable_restarts_per_subscription_test() {
    let scheduler = VirtualScheduler::new(0);
    let source = scheduler.create_cold_observable(vec![next(10, "x")]);
    let early = scheduler.create_observer();
    let late = scheduler.create_observer();
    {
      let source = source.clone();
      let target = early.clone();
      let slot = Arc::new(Mutex::new(None));
      scheduler.schedule_at(0, Task::new(move || {
        *slot.lock().unwrap() = Some(source.subscribe(target.clone()));
      }));
    }
    {
      let source = source.clone();
      let target = late.clone();
      let slot = Arc::new(Mutex::new(None));
      scheduler.schedule_at(100, Task::new(move || {
        *slot.lock().unwrap() = Some(source.subscribe(target.clone()));
      }));
    }
    scheduler.start();
    assert_eq!(early.events(), [next(10, "x")]);
    assert_eq!(late.events(), [next(110, "x")]);
  }

  #[test]
  fn disposed_hot_subscription_stops_recording_test() {
    let scheduler = VirtualScheduler::new(0);
    let source = scheduler.create_hot_observable(vec![next(100, 1), next(300, 2)]);
    let observer = scheduler.create_observer();
    let slot = Arc::new(Mutex::new(None));
    {
      let source = source.clone();
      let target = observer.clone();
      let keep = slot.clone();
      scheduler.schedule_at(0, Task::new(move || {
        *keep.lock().unwrap() = Some(source.subscribe(target.clone()));
      }));
    }
    {
      let dispose = slot.clone();
      scheduler.schedule_at(200, Task::new(move || {
        if let Some(subscription) = dispose.lock().unwrap().take() {
          subscription.unsubscribe();
        }
      }));
    }
    scheduler.start();
    assert_eq!(observer.events(), [next(100, 1)]);
  }
}
