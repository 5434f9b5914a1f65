/// A unit of deferred work handed to an executor or scheduler.
pub struct Task {
  job: Box<dyn FnOnce() + Send + 'static>,
}

impl Task {
  pub fn new<F>(job: F) -> Self
  where
    F: FnOnce() + Send + 'static,
  {
    Task { job: Box::new(job) }
  }

  /// Consumes the task and runs its job on the calling thread.
  pub fn invoke(self) {
    (self.job)()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  #[test]
  fn invoke_runs_job_test() {
    let counter = Arc::new(AtomicUsize::new(0));
    let cloned = counter.clone();
    let task = Task::new(move || {
      cloned.fetch_add(1, Ordering::Relaxed);
    });
    task.invoke();
    assert_eq!(counter.load(Ordering::Relaxed), 1);
  }
}
