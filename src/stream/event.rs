use super::observable::ObservableType;
use super::observer::Observer;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// A failure travelling down a stream as a terminal [Event::Error].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamError {
  /// A user supplied predicate or mapping panicked inside an operator.
  Operator(String),
  /// A failure produced (or scripted) by the source itself.
  Source(String),
  /// A blocking collector gave up waiting for a terminal event.
  TimedOut,
}

impl Display for StreamError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      StreamError::Operator(message) => write!(f, "operator failed: {}", message),
      StreamError::Source(message) => write!(f, "source failed: {}", message),
      StreamError::TimedOut => {
        write!(f, "timed out waiting for a terminal event")
      }
    }
  }
}

impl Error for StreamError {}

/// One occurrence on a stream: a value, a terminal error or a terminal
/// completion.
///
/// Once an [Event::Error] or [Event::Completed] has been delivered on a
/// subscription, nothing further may be delivered on it.
#[derive(Clone, Debug, PartialEq)]
pub enum Event<T> {
  Next(T),
  Error(StreamError),
  Completed,
}

impl<T> Event<T> {
  pub fn is_terminal(&self) -> bool {
    !matches!(self, Event::Next(_))
  }

  /// The carried value, if this is an [Event::Next].
  pub fn value(&self) -> Option<&T> {
    match self {
      Event::Next(value) => Some(value),
      _ => None,
    }
  }
}

impl<T> Event<T>
where
  T: ObservableType,
{
  pub(crate) fn deliver_to(&self, observer: &dyn Observer<T>) {
    match self {
      Event::Next(value) => observer.on_next(value.clone()),
      Event::Error(error) => observer.on_error(error.clone()),
      Event::Completed => observer.on_completed(),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn is_terminal_test() {
    assert!(!Event::Next(1).is_terminal());
    assert!(Event::<i32>::Error(StreamError::TimedOut).is_terminal());
    assert!(Event::<i32>::Completed.is_terminal());
  }

  #[test]
  fn value_test() {
    assert_eq!(Event::Next(7).value(), Some(&7));
    assert_eq!(Event::<i32>::Completed.value(), None);
  }

  #[test]
  fn error_display_test() {
    let error = StreamError::Operator("predicate panicked".to_owned());
    assert_eq!(format!("{}", error), "operator failed: predicate panicked");
  }
}
