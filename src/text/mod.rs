//! Text-field editing state machine used by string gadgets.

mod core;

pub use core::{StringState, TextEdit};
