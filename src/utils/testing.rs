use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// How long a test may block on real-scheduler work before it is failed.
pub const TEST_DEADLINE: Duration = Duration::from_secs(5);

/// Runs `body` on its own thread and panics if it has not finished within
/// `limit`, so a wedged real-scheduler path fails instead of hanging the
/// suite.
pub fn within<T, F>(limit: Duration, body: F) -> T
where
  T: Send + 'static,
  F: FnOnce() -> T + Send + 'static,
{
  let (done, check) = mpsc::channel();
  let handle = thread::Builder::new()
    .name("deadline-thread".to_owned())
    .spawn(move || {
      let value = body();
      let _ = done.send(());
      value
    })
    .unwrap();
  match check.recv_timeout(limit) {
    Ok(_) => handle.join().expect("test body panicked"),
    Err(mpsc::RecvTimeoutError::Timeout) => panic!("test body exceeded its deadline"),
    Err(mpsc::RecvTimeoutError::Disconnected) => handle.join().expect("test body panicked"),
  }
}

/// [within] at the default deadline.
pub fn deadline_context<T, F>(body: F) -> T
where
  T: Send + 'static,
  F: FnOnce() -> T + Send + 'static,
{
  within(TEST_DEADLINE, body)
}
