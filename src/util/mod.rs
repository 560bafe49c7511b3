//! Small helpers shared by the loader and the text presentation.
//!
//! - **Task supervision**: turn panics in spawned work into errors
//! - **Text**: make feed-supplied strings safe and narrow enough for a terminal

mod task;
mod text;

pub use task::catch_task_panic;
pub use text::{display_width, sanitize_line, truncate_to_width};
