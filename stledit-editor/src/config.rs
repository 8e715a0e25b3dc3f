//! Editor configuration
//!
//! All fields have defaults matching the stock cube editor, so a config file
//! only needs to list what it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use stledit_core::{Color, Error, LoadOptions, Result, DEFAULT_FACE_COLOR, PALETTE, POSITION_DECIMALS};

use crate::interaction::EditMode;

/// Axis values whose magnitude is at or below this never drive linked scaling
pub const SCALE_EPSILON: f32 = 0.001;

/// World units moved per pixel of pointer movement while dragging
pub const DRAG_SENSITIVITY: f32 = 0.02;

/// Configuration for an editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Color given to faces when the model is loaded
    pub face_color: Color,
    /// Swatches offered by the color panel
    pub palette: Vec<Color>,
    /// Decimal places two corners must agree to in order to be merged
    pub merge_decimals: u32,
    /// Threshold below which an axis is left alone by linked scaling
    pub scale_epsilon: f32,
    /// Pointer-to-world factor used by drag gestures
    pub drag_sensitivity: f32,
    /// Edit mode the session starts in
    pub initial_mode: EditMode,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            face_color: DEFAULT_FACE_COLOR,
            palette: PALETTE.to_vec(),
            merge_decimals: POSITION_DECIMALS,
            scale_epsilon: SCALE_EPSILON,
            drag_sensitivity: DRAG_SENSITIVITY,
            initial_mode: EditMode::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid editor config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file and validate it
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that numeric settings are usable
    pub fn validate(&self) -> Result<()> {
        if !self.scale_epsilon.is_finite() || self.scale_epsilon < 0.0 {
            return Err(Error::Config(format!(
                "scale_epsilon must be a finite, non-negative number, got {}",
                self.scale_epsilon
            )));
        }
        if !self.drag_sensitivity.is_finite() || self.drag_sensitivity <= 0.0 {
            return Err(Error::Config(format!(
                "drag_sensitivity must be a finite, positive number, got {}",
                self.drag_sensitivity
            )));
        }
        // Quantized coordinates are stored as i64 grid steps.
        if self.merge_decimals > 9 {
            return Err(Error::Config(format!(
                "merge_decimals must be at most 9, got {}",
                self.merge_decimals
            )));
        }
        Ok(())
    }

    /// Set the initial face color
    pub fn with_face_color(mut self, color: Color) -> Self {
        self.face_color = color;
        self
    }

    /// Set the linked scaling threshold
    pub fn with_scale_epsilon(mut self, epsilon: f32) -> Self {
        self.scale_epsilon = epsilon;
        self
    }

    /// Set the drag sensitivity
    pub fn with_drag_sensitivity(mut self, sensitivity: f32) -> Self {
        self.drag_sensitivity = sensitivity;
        self
    }

    /// Set the starting edit mode
    pub fn with_initial_mode(mut self, mode: EditMode) -> Self {
        self.initial_mode = mode;
        self
    }

    /// Loader options derived from this config
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions::default()
            .with_decimals(self.merge_decimals)
            .with_face_color(self.face_color)
    }
}
