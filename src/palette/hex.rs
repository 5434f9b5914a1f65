use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One parsed color triple, components in red, green, blue order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
  pub red: u8,
  pub green: u8,
  pub blue: u8,
}

impl Rgb {
  pub const fn new(red: u8, green: u8, blue: u8) -> Self {
    Rgb { red, green, blue }
  }
}

/// An opaque display color with unit-interval channels; alpha is always 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
  pub red: f64,
  pub green: f64,
  pub blue: f64,
  pub alpha: f64,
}

impl From<Rgb> for Color {
  fn from(rgb: Rgb) -> Self {
    Color {
      red: f64::from(rgb.red) / 255.0,
      green: f64::from(rgb.green) / 255.0,
      blue: f64::from(rgb.blue) / 255.0,
      alpha: 1.0,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseHexError {
  /// Wrong digit count after the optional leading `#`.
  Length(usize),
  /// The first non-hex character encountered.
  Digit(char),
}

impl Display for ParseHexError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      ParseHexError::Length(count) => {
        write!(f, "expected 6 hex digits, got {}", count)
      }
      ParseHexError::Digit(character) => {
        write!(f, "invalid hex digit '{}'", character)
      }
    }
  }
}

impl Error for ParseHexError {}

/// Parses a six-digit hex color string; the leading `#` is optional.
///
/// # Example
/// ```
/// use tempo::palette::hex::{parse_hex, Rgb};
///
/// assert_eq!(parse_hex("#ebf2ab"), Ok(Rgb::new(0xeb, 0xf2, 0xab)));
/// assert_eq!(parse_hex("006636"), Ok(Rgb::new(0x00, 0x66, 0x36)));
/// assert!(parse_hex("#12345").is_err());
/// ```
pub fn parse_hex(input: &str) -> Result<Rgb, ParseHexError> {
  let digits = input.strip_prefix('#').unwrap_or(input);
  let count = digits.chars().count();
  if count != 6 {
    return Err(ParseHexError::Length(count));
  }
  let mut value: u32 = 0;
  for character in digits.chars() {
    match character.to_digit(16) {
      Some(digit) => value = value * 16 + digit,
      None => return Err(ParseHexError::Digit(character)),
    }
  }
  Ok(Rgb::new(
    (value >> 16) as u8,
    (value >> 8) as u8,
    value as u8,
  ))
}

/// Returned by [color_name] when the triple has no table entry.
pub const NO_MATCH: &str = "--";

lazy_static! {
  static ref COLOR_NAMES: HashMap<Rgb, &'static str> = {
    let mut names = HashMap::new();
    names.insert(Rgb::new(0x00, 0x66, 0x36), "rayWenderlichGreen");
    names.insert(Rgb::new(0xff, 0x00, 0x00), "red");
    names.insert(Rgb::new(0x00, 0xff, 0x00), "green");
    names.insert(Rgb::new(0x00, 0x00, 0xff), "blue");
    names.insert(Rgb::new(0x00, 0x00, 0x00), "black");
    names.insert(Rgb::new(0xff, 0xff, 0xff), "white");
    names.insert(Rgb::new(0x00, 0xff, 0xff), "cyan");
    names.insert(Rgb::new(0xff, 0x00, 0xff), "magenta");
    names.insert(Rgb::new(0xff, 0xff, 0x00), "yellow");
    names
  };
}

/// Exact-equality lookup of a human readable color name; there is no
/// nearest-color heuristic.
pub fn color_name(rgb: Rgb) -> &'static str {
  COLOR_NAMES.get(&rgb).copied().unwrap_or(NO_MATCH)
}
