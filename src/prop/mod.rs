//! Fixed-point pot/body encoding for sliders and scrollbars.

mod core;

pub use core::{
    Axis, MAXBODY, MAXPOT, PropFlags, PropPress, PropState, scroller_decode, scroller_encode,
    slider_decode, slider_encode,
};
