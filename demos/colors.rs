//! Drives the reactive color pipeline from the command line.

use tempo::palette::viewmodel::ColorViewModel;

fn main() {
  let viewmodel = ColorViewModel::new();
  let _rgb = viewmodel.rgb().subscribe_next(|rgb| {
    println!("  rgb   -> ({}, {}, {})", rgb.red, rgb.green, rgb.blue);
  });
  let _color = viewmodel.color().subscribe_next(|color| {
    println!("  color -> {:.3} {:.3} {:.3} (alpha {})", color.red, color.green, color.blue, color.alpha);
  });
  let _name = viewmodel.color_name().subscribe_next(|name| {
    println!("  name  -> {}", name);
  });
  for input in ["#ff0000", "#006636", "123456", "#nothex", "#ebf2ab"].iter() {
    println!("input: {}", input);
    viewmodel.set_hex_string(input);
  }
}
