//! Session-wide state read by presentation code.
//!
//! - [`MenuController`]: menu visibility, forced hidden whenever a load starts
//! - [`RenderTarget`]: the last feed that loaded successfully

mod menu;
mod render;

pub use menu::{MenuController, MenuState};
pub use render::{RenderState, RenderTarget};
