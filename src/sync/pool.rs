use super::task::Task;
use log::error;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Builder for a fixed-size [ThreadPool].
///
/// The pool size defaults to the number of logical CPUs.
pub struct ThreadPoolBuilder {
  name: String,
  size: usize,
}

impl ThreadPoolBuilder {
  pub fn named(name: &str) -> Self {
    ThreadPoolBuilder {
      name: name.to_owned(),
      size: num_cpus::get(),
    }
  }

  pub fn size(mut self, size: usize) -> Self {
    self.size = std::cmp::max(size, 1);
    self
  }

  pub fn build(self) -> ThreadPool {
    let (tx, rx) = channel();
    let rx: Arc<Mutex<Receiver<Task>>> = Arc::new(Mutex::new(rx));
    for i in 0..self.size {
      let rx = rx.clone();
      std::thread::Builder::new()
        .name(format!("{}{}", self.name, i))
        .spawn(move || loop {
          let received = rx.lock().unwrap().recv();
          match received {
            Ok(task) => {
              if catch_unwind(AssertUnwindSafe(|| task.invoke())).is_err() {
                error!("scheduled task panicked on pool thread");
              }
            }
            Err(_) => break,
          }
        })
        .unwrap();
    }
    ThreadPool {
      sender: Mutex::new(tx),
      epoch: Instant::now(),
      size: self.size,
    }
  }
}

/// A fixed set of worker threads sharing one run queue.
///
/// Tasks are taken from the queue in submission order but run concurrently,
/// so completion order across threads is not guaranteed. Dropping the pool
/// closes the queue; workers finish what was already queued and exit.
pub struct ThreadPool {
  sender: Mutex<Sender<Task>>,
  epoch: Instant,
  size: usize,
}

impl ThreadPool {
  pub fn size(&self) -> usize {
    self.size
  }

  /// Milliseconds since this pool was created.
  pub fn elapsed(&self) -> u64 {
    self.epoch.elapsed().as_millis() as u64
  }

  /// Queues a task for the next free worker thread.
  pub fn submit(&self, task: Task) {
    self.sender.lock().unwrap().send(task).unwrap();
  }
}
