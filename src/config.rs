use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::species::Species;

/// Block dimensions and treatments handed to the packer.
///
/// Lengths: `row_length_m` and `alley_width_m` in meters, `row_spacing_cm` in
/// centimeters. `rotation_deg` is absolute and clockwise-positive; offsets are
/// fractions of one lattice step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    pub row_length_m: f64,
    pub row_spacing_cm: f64,
    #[serde(default)]
    pub alley_width_m: f64,
    #[serde(default)]
    pub species: Vec<Species>,
    #[serde(default)]
    pub rotation_deg: f64,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
}

impl BlockConfig {
    pub fn new(
        row_length_m: f64,
        row_spacing_cm: f64,
        alley_width_m: f64,
        species: Vec<Species>,
    ) -> Self {
        Self {
            row_length_m,
            row_spacing_cm,
            alley_width_m,
            species,
            rotation_deg: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    pub fn with_rotation(mut self, rotation_deg: f64) -> Self {
        self.rotation_deg = rotation_deg;
        self
    }

    pub fn with_offsets(mut self, offset_x: f64, offset_y: f64) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    /// Block width across the rows, in meters.
    pub fn block_width_m(&self) -> f64 {
        self.species.len() as f64 * self.row_spacing_m()
    }

    pub fn row_spacing_m(&self) -> f64 {
        self.row_spacing_cm / 100.0
    }

    /// Reject configurations the packer gives no guarantees for.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !(self.row_length_m.is_finite() && self.row_length_m > 0.0) {
            return Err(LayoutError::InvalidConfiguration(format!(
                "row length must be positive, got {}",
                self.row_length_m
            )));
        }
        if !(self.row_spacing_cm.is_finite() && self.row_spacing_cm > 0.0) {
            return Err(LayoutError::InvalidConfiguration(format!(
                "row spacing must be positive, got {}",
                self.row_spacing_cm
            )));
        }
        if !(self.alley_width_m.is_finite() && self.alley_width_m >= 0.0) {
            return Err(LayoutError::InvalidConfiguration(format!(
                "alley width must be zero or positive, got {}",
                self.alley_width_m
            )));
        }
        if self.species.is_empty() {
            return Err(LayoutError::InvalidConfiguration(
                "at least one species is required".into(),
            ));
        }
        for (i, sp) in self.species.iter().enumerate() {
            if self.species[..i].iter().any(|other| other.id == sp.id) {
                return Err(LayoutError::InvalidConfiguration(format!(
                    "duplicate species id '{}'",
                    sp.id
                )));
            }
        }
        if !self.rotation_deg.is_finite() {
            return Err(LayoutError::InvalidConfiguration(
                "rotation must be a finite angle".into(),
            ));
        }
        for (label, offset) in [("x", self.offset_x), ("y", self.offset_y)] {
            if !(0.0..1.0).contains(&offset) {
                return Err(LayoutError::InvalidConfiguration(format!(
                    "offset {label} must lie in [0, 1), got {offset}"
                )));
            }
        }
        Ok(())
    }
}
