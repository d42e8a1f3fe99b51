mod types;

pub use types::{GuiError, Result};
