//! Relative-coordinate box model.
//!
//! Containers and gadgets import layout types from here while the implementation
//! details live in the private `core` module.

mod core;

pub use core::{Coord, LayoutBox, RelFlags};
