//! Retro windowing and gadget interaction engine.
//!
//! `intui` models screens, windows, requesters and gadgets laid out with a
//! relative-coordinate box model, and routes pointer and keyboard input through
//! hit-testing, hover/active chains and drag operations. Drawing is left to an
//! external [`Renderer`]; the engine only exposes read-only snapshots of what
//! should be drawn.

pub mod error;
pub mod font;
pub mod gadget;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod prop;
pub mod registry;
pub mod render;
pub mod runtime;
pub mod text;
pub mod widgets;

pub use error::{GuiError, Result};
pub use font::{Font, MonospaceFont, display_width};
pub use gadget::{
    Activation, Gadget, GadgetFlags, GadgetKind, GadgetType, IconId, NewGadget, Owner,
    SystemGadget,
};
pub use geometry::{Insets, Point, Rect, Size};
pub use input::{InputEvent, InputKind};
pub use layout::{Coord, LayoutBox, RelFlags};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{MetricSnapshot, RouterMetrics};
pub use prop::{Axis, MAXBODY, MAXPOT, PropFlags, PropState};
pub use registry::{
    GadgetId, HitChain, NewRequester, NewScreen, NewWindow, Registry, RequesterId, ScreenId,
    WindowFlags, WindowId,
};
pub use render::{
    AnsiRenderer, Color, Damage, DamageTracker, GadgetVisual, Renderer, RendererSettings,
};
pub use runtime::{Chain, Element, InputRouter, Notification, RouterConfig};
pub use text::{StringState, TextEdit};
pub use widgets::{Checkbox, WidgetRole};
