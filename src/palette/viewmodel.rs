use super::hex::{color_name, parse_hex, Color, Rgb};
use crate::stream::observable::Observable;
use crate::stream::ops::{DistinctUntilChanged, FilterMap, Map};
use crate::stream::subject::{BehaviorSubject, Subject};

/// The reactive color pipeline: one mutable hex-string cell and three
/// streams derived from it by pure operator composition.
///
/// The cell is the sole source of truth; the derived streams hold no state
/// of their own and replay the latest well formed input to new subscribers.
/// A malformed hex string (wrong length or a stray character) emits nothing
/// downstream - the derived streams keep their last good value and the
/// pipeline never terminates on bad input.
///
/// # Example
/// ```
/// use tempo::palette::viewmodel::ColorViewModel;
/// use std::sync::{Arc, Mutex};
///
/// let viewmodel = ColorViewModel::new();
/// let names = Arc::new(Mutex::new(Vec::new()));
/// let cloned = names.clone();
/// let _subscription = viewmodel.color_name().subscribe_next(move |name| {
///   cloned.lock().unwrap().push(name);
/// });
/// viewmodel.set_hex_string("#006636");
/// viewmodel.set_hex_string("#006635");
/// assert_eq!(*names.lock().unwrap(), ["rayWenderlichGreen", "--"]);
/// ```
pub struct ColorViewModel {
  hex_string: BehaviorSubject<String>,
}

impl ColorViewModel {
  pub fn new() -> Self {
    ColorViewModel {
      hex_string: BehaviorSubject::new(String::new()),
    }
  }

  /// The input cell; push new color strings here.
  pub fn hex_string(&self) -> BehaviorSubject<String> {
    self.hex_string.clone()
  }

  /// Convenience setter for the input cell.
  pub fn set_hex_string(&self, value: &str) {
    self.hex_string.next(value.to_owned());
  }

  /// Byte triple parsed from the latest well formed input.
  pub fn rgb(&self) -> Observable<Rgb> {
    self
      .hex_string
      .observe()
      .filter_map(|value: String| parse_hex(&value).ok())
      .distinct_until_changed()
  }

  /// Fully opaque color value for the latest well formed input.
  pub fn color(&self) -> Observable<Color> {
    self.rgb().map(Color::from)
  }

  /// Exact-match color name for the latest well formed input, or `"--"`
  /// when the table has no entry.
  pub fn color_name(&self) -> Observable<String> {
    self.rgb().map(|rgb| color_name(rgb).to_owned())
  }
}

impl Default for ColorViewModel {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  use std::sync::{Arc, Mutex};

  #[test]
  fn rgb_parses_component_order_test() {
    let viewmodel = ColorViewModel::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let cloned = seen.clone();
    let _subscription = viewmodel.rgb().subscribe_next(move |rgb| {
      cloned.lock().unwrap().push(rgb);
    });
    viewmodel.set_hex_string("#ebf2ab");
    assert_eq!(*seen.lock().unwrap(), [Rgb::new(0xeb, 0xf2, 0xab)]);
  }

  #[test]
  fn malformed_input_emits_nothing_test() {
    let viewmodel = ColorViewModel::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let cloned = seen.clone();
    let _subscription = viewmodel.rgb().subscribe_next(move |rgb| {
      cloned.lock().unwrap().push(rgb);
    });
    viewmodel.set_hex_string("#ff0000");
    viewmodel.set_hex_string("#ff00");
    viewmodel.set_hex_string("#zzff00");
    viewmodel.set_hex_string("#00ff00");
    assert_eq!(
      *seen.lock().unwrap(),
      [Rgb::new(0xff, 0, 0), Rgb::new(0, 0xff, 0)]
    );
  }

  #[test]
  fn repeated_input_is_suppressed_test() {
    let viewmodel = ColorViewModel::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let cloned = seen.clone();
    let _subscription = viewmodel.rgb().subscribe_next(move |rgb| {
      cloned.lock().unwrap().push(rgb);
    });
    viewmodel.set_hex_string("#ff0000");
    viewmodel.set_hex_string("ff0000");
    assert_eq!(*seen.lock().unwrap(), [Rgb::new(0xff, 0, 0)]);
  }

  #[test]
  fn derived_streams_replay_latest_parse_test() {
    let viewmodel = ColorViewModel::new();
    viewmodel.set_hex_string("#0000ff");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let cloned = seen.clone();
    let _subscription = viewmodel.color_name().subscribe_next(move |name| {
      cloned.lock().unwrap().push(name);
    });
    assert_eq!(*seen.lock().unwrap(), ["blue"]);
  }
}
