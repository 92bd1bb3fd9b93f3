// ABOUTME: Static description of one blue/green environment.
// ABOUTME: Derived from configuration, never created or destroyed at runtime.

use super::{AppName, Color};
use serde::Serialize;

/// Container, image, and staging port belonging to one color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Environment {
    pub color: Color,
    pub container_name: String,
    pub image_name: String,
    pub port: u16,
}

impl Environment {
    pub fn new(app: &AppName, color: Color, port: u16) -> Self {
        Self {
            color,
            container_name: format!("{}-{}", app, color),
            image_name: format!("{}:{}", app, color),
            port,
        }
    }
}
