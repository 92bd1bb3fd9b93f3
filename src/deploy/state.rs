// ABOUTME: Deployment state marker types for the type state pattern.
// ABOUTME: Each stage of a replacement deployment is its own type.

use super::switch::SwitchReport;

/// Active environment detected, target chosen.
/// Available actions: `build()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Detected;

/// Target image built.
/// Available actions: `stage()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Built;

/// Target running on its staging port.
/// Available actions: `health_check()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Staged;

/// Target answered ready on its staging port.
/// Available actions: `validate()`
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthChecked;

/// Advisory validation done (or skipped).
/// Available actions: `switch()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Validated;

/// Target owns the main port.
/// Available actions: `cleanup()`
#[derive(Debug, Clone)]
pub struct Switched(pub SwitchReport);

/// Deployment finished.
#[derive(Debug, Clone)]
pub struct Completed(pub SwitchReport);
