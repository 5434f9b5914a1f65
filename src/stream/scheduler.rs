use crate::sync::pool::{ThreadPool, ThreadPoolBuilder};
use crate::sync::task::Task;
use crate::sync::worker::Worker;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerType {
  Worker,
  Pool,
  Immediate,
  Virtual,
}

/// Decouples when an action runs from what it does.
///
/// Time is an integer tick count on the scheduler's own clock: wall clock
/// milliseconds since creation for the real schedulers, a logical clock for
/// [VirtualScheduler](crate::testing::scheduler::VirtualScheduler). An
/// action registered at `due` runs no earlier than `due`. Components that
/// schedule work take their scheduler as an explicit dependency, so tests
/// can substitute the virtual one without any global state.
pub trait Scheduler: Send + Sync {
  /// The scheduler's current tick count.
  fn now(&self) -> u64;
  /// Runs `task` as soon as the scheduler can.
  fn schedule(&self, task: Task);
  /// Registers `task` to run no earlier than tick `due`.
  fn schedule_at(&self, due: u64, task: Task);
  fn scheduler_type(&self) -> SchedulerType;
}

impl Scheduler for Worker {
  fn now(&self) -> u64 {
    self.elapsed()
  }

  fn schedule(&self, task: Task) {
    self.submit(task);
  }

  fn schedule_at(&self, due: u64, task: Task) {
    self.submit_at(due, task);
  }

  fn scheduler_type(&self) -> SchedulerType {
    SchedulerType::Worker
  }
}

impl Scheduler for ThreadPool {
  fn now(&self) -> u64 {
    self.elapsed()
  }

  fn schedule(&self, task: Task) {
    self.submit(task);
  }

  fn schedule_at(&self, due: u64, task: Task) {
    let delay = due.saturating_sub(self.elapsed());
    if delay == 0 {
      self.submit(task);
    } else {
      // the assigned pool thread holds the delay; siblings keep draining
      self.submit(Task::new(move || {
        thread::sleep(Duration::from_millis(delay));
        task.invoke();
      }));
    }
  }

  fn scheduler_type(&self) -> SchedulerType {
    SchedulerType::Pool
  }
}

/// Runs every action inline on the calling thread; an action with a future
/// due time blocks the caller until it is due.
pub struct ImmediateScheduler {
  epoch: Instant,
}

impl ImmediateScheduler {
  pub fn new() -> Self {
    ImmediateScheduler {
      epoch: Instant::now(),
    }
  }
}

impl Default for ImmediateScheduler {
  fn default() -> Self {
    Self::new()
  }
}

impl Scheduler for ImmediateScheduler {
  fn now(&self) -> u64 {
    self.epoch.elapsed().as_millis() as u64
  }

  fn schedule(&self, task: Task) {
    task.invoke();
  }

  fn schedule_at(&self, due: u64, task: Task) {
    let delay = due.saturating_sub(self.now());
    if delay > 0 {
      thread::sleep(Duration::from_millis(delay));
    }
    task.invoke();
  }

  fn scheduler_type(&self) -> SchedulerType {
    SchedulerType::Immediate
  }
}

/// Builds a scheduler of the given strategy; `name` seeds thread names
/// where the strategy spawns any.
pub fn make_scheduler(name: &str, strategy: SchedulerType) -> Arc<dyn Scheduler> {
  match strategy {
    SchedulerType::Worker => Arc::new(Worker::new()),
    SchedulerType::Pool => Arc::new(ThreadPoolBuilder::named(name).build()),
    SchedulerType::Immediate => Arc::new(ImmediateScheduler::new()),
    SchedulerType::Virtual => Arc::new(crate::testing::scheduler::VirtualScheduler::new(0)),
  }
}
