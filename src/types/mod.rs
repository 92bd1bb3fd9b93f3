// ABOUTME: Validated domain types shared by every component.
// ABOUTME: Environment colors, environment records, and the application name.

mod app_name;
mod color;
mod environment;

pub use app_name::{AppName, AppNameError};
pub use color::{Color, ParseColorError};
pub use environment::Environment;
