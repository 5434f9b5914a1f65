use crate::stream::scheduler::{Scheduler, SchedulerType};
use crate::sync::task::Task;
use log::warn;

use std::cmp::{Ordering as CmpOrdering, Reverse};
use std::collections::BinaryHeap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Default upper bound on the virtual clock for one
/// [start](VirtualScheduler::start) run.
pub const DEFAULT_RUN_BOUND: u64 = 1000;

/// Reported (and warn-logged) when a run hits its clock bound with work
/// still queued - the safety valve against runaway scripts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerOverrun {
  /// Where the clock stood when the run stopped.
  pub clock: u64,
  /// Actions left queued beyond the bound.
  pub pending: usize,
}

impl Display for SchedulerOverrun {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "virtual run stopped at clock {} with {} actions still queued",
      self.clock, self.pending
    )
  }
}

impl Error for SchedulerOverrun {}

struct ScheduledAction {
  due: u64,
  sequence: u64,
  task: Task,
}

impl PartialEq for ScheduledAction {
  fn eq(&self, other: &Self) -> bool {
    self.due == other.due && self.sequence == other.sequence
  }
}

impl Eq for ScheduledAction {}

impl PartialOrd for ScheduledAction {
  fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
    Some(self.cmp(other))
  }
}

impl Ord for ScheduledAction {
  fn cmp(&self, other: &Self) -> CmpOrdering {
    (self.due, self.sequence).cmp(&(other.due, other.sequence))
  }
}

struct VirtualCore {
  clock: AtomicU64,
  sequence: AtomicU64,
  bound: u64,
  queue: Mutex<BinaryHeap<Reverse<ScheduledAction>>>,
  overrun: Mutex<Option<SchedulerOverrun>>,
}

/// A single threaded scheduler over a logical integer clock.
///
/// Actions queue in stable `(due, sequence)` order - the sequence number is
/// assigned at scheduling time, so equal due times run first-in first-out
/// rather than at the heap's whim. [start](Self::start) pops the minimum,
/// advances the clock to its due time and runs it; actions scheduled while
/// another runs join the same queue in place. Nothing here ever touches a
/// real clock, which is what makes marble tests synchronous and
/// reproducible.
///
/// The type is a cheap handle over shared state: clones schedule into the
/// same queue and read the same clock.
///
/// # Example
/// ```
/// use tempo::stream::scheduler::Scheduler;
/// use tempo::sync::task::Task;
/// use tempo::testing::scheduler::VirtualScheduler;
/// use std::sync::{Arc, Mutex};
///
/// let scheduler = VirtualScheduler::new(0);
/// let order = Arc::new(Mutex::new(Vec::new()));
/// for (due, tag) in [(200u64, "b"), (100u64, "a")].iter() {
///   let order = order.clone();
///   let tag = *tag;
///   scheduler.schedule_at(*due, Task::new(move || {
///     order.lock().unwrap().push(tag);
///   }));
/// }
/// scheduler.start();
/// assert_eq!(*order.lock().unwrap(), ["a", "b"]);
/// assert_eq!(scheduler.now(), 200);
/// ```
#[derive(Clone)]
pub struct VirtualScheduler {
  core: Arc<VirtualCore>,
}

impl VirtualScheduler {
  /// A scheduler with its clock at `initial` and the default run bound.
  pub fn new(initial: u64) -> Self {
    Self::with_bound(initial, DEFAULT_RUN_BOUND)
  }

  pub fn with_bound(initial: u64, bound: u64) -> Self {
    VirtualScheduler {
      core: Arc::new(VirtualCore {
        clock: AtomicU64::new(initial),
        sequence: AtomicU64::new(0),
        bound,
        queue: Mutex::new(BinaryHeap::new()),
        overrun: Mutex::new(None),
      }),
    }
  }

  /// Runs queued actions in `(due, sequence)` order until the queue drains
  /// or the next action lies beyond the run bound. The clock never moves
  /// backwards; an action whose due time already passed runs at the
  /// current clock.
  pub fn start(&self) {
    loop {
      let action = {
        let mut queue = self.core.queue.lock().unwrap();
        match queue.peek() {
          None => break,
          Some(Reverse(head)) if head.due > self.core.bound => {
            let report = SchedulerOverrun {
              clock: self.core.clock.load(Ordering::SeqCst),
              pending: queue.len(),
            };
            warn!("{}", report);
            *self.core.overrun.lock().unwrap() = Some(report);
            break;
          }
          Some(_) => queue.pop().unwrap().0,
        }
      };
      if action.due > self.core.clock.load(Ordering::SeqCst) {
        self.core.clock.store(action.due, Ordering::SeqCst);
      }
      action.task.invoke();
    }
  }

  /// The overrun report, if a run hit the bound with work still queued.
  pub fn overrun(&self) -> Option<SchedulerOverrun> {
    self.core.overrun.lock().unwrap().clone()
  }
}

impl Scheduler for VirtualScheduler {
  fn now(&self) -> u64 {
    self.core.clock.load(Ordering::SeqCst)
  }

  fn schedule(&self, task: Task) {
    self.schedule_at(self.now(), task);
  }

  fn schedule_at(&self, due: u64, task: Task) {
    let due = std::cmp::max(due, self.now());
    let sequence = self.core.sequence.fetch_add(1, Ordering::SeqCst);
    self
      .core
      .queue
      .lock()
      .unwrap()
      .push(Reverse(ScheduledAction { due, sequence, task }));
  }

  fn scheduler_type(&self) -> SchedulerType {
    SchedulerType::Virtual
  }
}
