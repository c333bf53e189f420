//! Interfaces of the collaborators the preview consumes.
//!
//! The preview never owns machine or settings state: it polls the machine on
//! its own cadence and reads settings on construction and on change
//! notifications. The only write path is [`MachineState::begin_jog`].

use std::sync::Arc;

use crate::camera::{WorldPoint, WorldRect};

/// Machine coordinate triple.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ZERO: Point3 = Point3::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

/// One straight move of the toolpath, projected onto the motion plane.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MotionSegment {
    pub from: WorldPoint,
    pub to: WorldPoint,
    /// Laser power normalized to `[0, 1]`.
    pub power: f32,
    /// Whether the tool is active along the move.
    pub powered: bool,
    /// Whether the machine has already executed this move.
    pub executed: bool,
}

impl MotionSegment {
    #[inline]
    pub fn travel(from: WorldPoint, to: WorldPoint) -> Self {
        Self {
            from,
            to,
            power: 0.0,
            powered: false,
            executed: false,
        }
    }

    #[inline]
    pub fn cut(from: WorldPoint, to: WorldPoint, power: f32) -> Self {
        Self {
            from,
            to,
            power: power.clamp(0.0, 1.0),
            powered: true,
            executed: false,
        }
    }
}

/// Loaded toolpath, possibly still streaming in.
///
/// Segments are append-only while a source is alive; a new file yields a new
/// source.
pub trait ToolpathSource: Send + Sync {
    /// Segments available right now.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Segments expected once loading completes.
    fn expected_len(&self) -> usize;

    /// Appends the segments from `start` up to the current length to `out`.
    fn read_segments(&self, start: usize, out: &mut Vec<MotionSegment>);

    /// Extent of the drawing, if it has one.
    fn bounding_box(&self) -> Option<WorldRect>;
}

/// Live machine state and feature toggles.
pub trait MachineState: Send + Sync {
    fn machine_position(&self) -> Point3;
    fn work_position(&self) -> Point3;
    fn working_offset(&self) -> Point3;
    fn feed(&self) -> f32;
    fn speed(&self) -> f32;

    /// Draw non-powered moves.
    fn show_travel(&self) -> bool;
    /// Show the performance block in the HUD.
    fn show_performance(&self) -> bool;
    /// Color already executed moves differently.
    fn show_executed(&self) -> bool;

    /// Currently loaded toolpath, if any.
    fn toolpath(&self) -> Option<Arc<dyn ToolpathSource>>;

    /// Starts a positioning move to `target`; `reverse` marks the secondary action.
    fn begin_jog(&self, target: WorldPoint, reverse: bool);
}

/// Read-only preference source.
pub trait Settings: Send + Sync {
    fn enable_z_jog(&self) -> bool;
    fn click_to_jog(&self) -> bool;
    fn preview_line_width(&self) -> f32;
}

/// Snapshot of the preferences the preview uses.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PreviewSettings {
    pub enable_z_jog: bool,
    pub click_to_jog: bool,
    pub preview_line_width: f32,
}

impl PreviewSettings {
    pub fn read(source: &dyn Settings) -> Self {
        let width = source.preview_line_width();
        Self {
            enable_z_jog: source.enable_z_jog(),
            click_to_jog: source.click_to_jog(),
            preview_line_width: if width.is_finite() && width > 0.0 { width } else { 1.0 },
        }
    }
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            enable_z_jog: false,
            click_to_jog: true,
            preview_line_width: 1.0,
        }
    }
}

impl Settings for PreviewSettings {
    fn enable_z_jog(&self) -> bool {
        self.enable_z_jog
    }

    fn click_to_jog(&self) -> bool {
        self.click_to_jog
    }

    fn preview_line_width(&self) -> f32 {
        self.preview_line_width
    }
}
