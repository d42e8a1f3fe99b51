//! Gadgets: typed interactive widgets and their input state machine.

mod core;
mod flags;

pub use core::{
    Gadget, GadgetKind, GadgetType, Handler, InputFrame, NewGadget, Owner, Response,
    TabDirection,
};
pub use flags::{Activation, GadgetFlags, IconId, SystemGadget};
