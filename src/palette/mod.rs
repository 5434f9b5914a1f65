//! The sample system under test: a reactive color pipeline.
//!
//! * `hex` holds the value types, the hex-string parser and the exact-match
//!   color name table.
//! * `viewmodel` wires one mutable input cell to three derived streams
//!   through pure operator composition.
pub mod hex;
pub mod viewmodel;
