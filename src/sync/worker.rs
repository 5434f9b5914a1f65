use super::task::Task;
use log::error;

use std::cmp::{Ordering as CmpOrdering, Reverse};
use std::collections::BinaryHeap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

struct TimedTask {
  due: u64,
  seq: u64,
  task: Task,
}

impl PartialEq for TimedTask {
  fn eq(&self, other: &Self) -> bool {
    self.due == other.due && self.seq == other.seq
  }
}

impl Eq for TimedTask {}

impl PartialOrd for TimedTask {
  fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
    Some(self.cmp(other))
  }
}

impl Ord for TimedTask {
  fn cmp(&self, other: &Self) -> CmpOrdering {
    (self.due, self.seq).cmp(&(other.due, other.seq))
  }
}

struct WorkerState {
  queue: BinaryHeap<Reverse<TimedTask>>,
  shutdown: bool,
}

struct WorkerInner {
  state: Mutex<WorkerState>,
  signal: Condvar,
  epoch: Instant,
  seq: AtomicU64,
}

/// A single background thread draining a time-ordered run queue.
///
/// Submitted tasks are held until the wall clock reaches their due time;
/// tasks with equal due times run in submission order. Dropping the worker
/// stops the thread, discarding tasks still waiting on their due time.
///
/// # Example
/// ```
/// use tempo::sync::task::Task;
/// use tempo::sync::worker::Worker;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::{mpsc, Arc, Mutex};
///
/// let worker = Worker::new();
/// let counter = Arc::new(AtomicUsize::new(0));
/// let (tx, rx) = mpsc::channel();
/// let tx = Mutex::new(tx);
/// let cloned = counter.clone();
/// worker.submit(Task::new(move || {
///   cloned.fetch_add(5, Ordering::Relaxed);
///   tx.lock().unwrap().send(()).unwrap();
/// }));
/// rx.recv().unwrap();
/// assert_eq!(counter.load(Ordering::Relaxed), 5);
/// ```
pub struct Worker {
  inner: Arc<WorkerInner>,
}

impl Worker {
  pub fn new() -> Self {
    let inner = Arc::new(WorkerInner {
      state: Mutex::new(WorkerState {
        queue: BinaryHeap::new(),
        shutdown: false,
      }),
      signal: Condvar::new(),
      epoch: Instant::now(),
      seq: AtomicU64::new(0),
    });
    Self::run(inner.clone());
    Worker { inner }
  }

  /// Milliseconds since this worker was created.
  pub fn elapsed(&self) -> u64 {
    self.inner.epoch.elapsed().as_millis() as u64
  }

  /// Submits a task to run as soon as the worker is free.
  pub fn submit(&self, task: Task) {
    self.submit_at(0, task);
  }

  /// Submits a task to run no earlier than `due` milliseconds after the
  /// worker was created.
  pub fn submit_at(&self, due: u64, task: Task) {
    let seq = self.inner.seq.fetch_add(1, Ordering::Relaxed);
    let mut state = self.inner.state.lock().unwrap();
    state.queue.push(Reverse(TimedTask { due, seq, task }));
    self.inner.signal.notify_one();
  }

  fn run(inner: Arc<WorkerInner>) {
    static ID: AtomicUsize = AtomicUsize::new(0);
    let id = ID.fetch_add(1, Ordering::Relaxed);
    std::thread::Builder::new()
      .name(format!("worker{}", id))
      .spawn(move || loop {
        let task = {
          let mut state = inner.state.lock().unwrap();
          loop {
            if state.shutdown {
              return;
            }
            let now = inner.epoch.elapsed().as_millis() as u64;
            match state.queue.peek() {
              None => {
                state = inner.signal.wait(state).unwrap();
              }
              Some(Reverse(head)) if head.due > now => {
                let wait = Duration::from_millis(head.due - now);
                state = inner.signal.wait_timeout(state, wait).unwrap().0;
              }
              Some(_) => break state.queue.pop().unwrap().0.task,
            }
          }
        };
        if catch_unwind(AssertUnwindSafe(|| task.invoke())).is_err() {
          error!("scheduled task panicked on worker thread");
        }
      })
      .unwrap();
  }
}

impl Default for Worker {
  fn default() -> Self {
    Self::new()
  }
}

impl Drop for Worker {
  fn drop(&mut self) {
    let mut state = self.inner.state.lock().unwrap();
    state.shutdown = true;
    self.inner.signal.notify_one();
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::utils::testing::deadline_context;

  use std::sync::mpsc;

  #[test]
  fn submit_runs_in_order_test() {
    deadline_context(|| {
      let worker = Worker::new();
      let (tx, rx) = mpsc::channel();
      for i in 0..3 {
        let tx = Mutex::new(tx.clone());
        worker.submit(Task::new(move || {
          tx.lock().unwrap().send(i).unwrap();
        }));
      }
      assert_eq!(rx.recv().unwrap(), 0);
      assert_eq!(rx.recv().unwrap(), 1);
      assert_eq!(rx.recv().unwrap(), 2);
    });
  }

  #[test]
  fn submit_at_reorders_by_due_time_test() {
    deadline_context(|| {
      let worker = Worker::new();
      let (tx, rx) = mpsc::channel();
      for (due, tag) in [(60u64, "late"), (20u64, "early"), (40u64, "middle")].iter() {
        let tx = Mutex::new(tx.clone());
        let tag = *tag;
        worker.submit_at(*due, Task::new(move || {
          tx.lock().unwrap().send(tag).unwrap();
        }));
      }
      assert_eq!(rx.recv().unwrap(), "early");
      assert_eq!(rx.recv().unwrap(), "middle");
      assert_eq!(rx.recv().unwrap(), "late");
    });
  }

  #[test]
  fn panicking_task_keeps_worker_alive_test() {
    deadline_context(|| {
      let worker = Worker::new();
      worker.submit(Task::new(|| panic!("boom")));
      let (tx, rx) = mpsc::channel();
      let tx = Mutex::new(tx);
      worker.submit(Task::new(move || {
        tx.lock().unwrap().send(()).unwrap();
      }));
      rx.recv().unwrap();
    });
  }
}
