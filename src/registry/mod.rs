mod core;
mod hit;
mod order;

pub use core::{
    DecorMetrics, GadgetId, NewRequester, NewScreen, NewWindow, Registry, Requester, RequesterId,
    Screen, ScreenId, Window, WindowFlags, WindowId,
};
pub use hit::HitChain;
