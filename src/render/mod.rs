//! Renderer collaborator interface, gadget snapshots and damage tracking.
//!
//! The engine never draws; renderers pull [`GadgetVisual`] snapshots and use
//! [`DamageTracker`] to skip gadgets whose appearance has not changed.

mod core;
mod damage;
mod visual;

pub use core::{AnsiRenderer, Color, Renderer, RendererSettings, TextureId, paint};
pub use damage::{Damage, DamageTracker};
pub use visual::{EditVisual, GadgetVisual, drawing_order, window_gadgets};
