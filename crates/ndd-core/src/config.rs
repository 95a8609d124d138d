// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Construction parameters.
//!
//! Plain values handed to [`crate::DetectorConstruction`]. `Default`
//! reproduces the reference apparatus; the setters cover the parameters a
//! run is expected to change. With the `serde` feature every struct here can
//! be persisted by the host; the core owns no file format.

use ndd_geom::units::{CM, DEG, M, MM, NM};
use ndd_geom::Vec3;
use thiserror::Error;

use crate::pixel::{PixelError, PixelLayout};

/// Errors reported by [`DetectorConfig::validate`] and
/// [`DetectorConfig::fitted_pixel_layout`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A length or ratio that must be positive and finite was not.
    #[error("{field} must be positive and finite, got {value}")]
    NotPositive {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// A position component was NaN or infinite.
    #[error("{field} must be finite")]
    NotFinite {
        /// Dotted path of the offending field.
        field: &'static str,
    },
    /// The pixel parameters do not describe a layout.
    #[error("pixel layout: {0}")]
    Pixels(#[from] PixelError),
    /// The pixel layout is wider than the active layer.
    #[error("pixel layout needs radius {required} but the active layer has {available}")]
    PixelsExceedDetector {
        /// Bulk radius of the layout.
        required: f64,
        /// Outer radius of the detector stack.
        available: f64,
    },
}

/// World box and the residual-gas filling.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    /// Half extent along X.
    pub half_x: f64,
    /// Half extent along Y.
    pub half_y: f64,
    /// Half extent along Z.
    pub half_z: f64,
    /// Pressure of the air filling, in Torr.
    pub vacuum_pressure_torr: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            half_x: 0.5 * M,
            half_y: 0.5 * M,
            half_z: 6.0 * M,
            vacuum_pressure_torr: 1e-8,
        }
    }
}

/// Dead layer, active silicon and backing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StackConfig {
    /// Position of the dead layer's upstream face.
    pub position: Vec3,
    /// Dead layer thickness.
    pub dead_layer_thickness: f64,
    /// Active silicon thickness.
    pub active_thickness: f64,
    /// Backing thickness.
    pub backing_thickness: f64,
    /// Outer radius shared by all three layers.
    pub outer_radius: f64,
    /// Azimuthal rotation of the active layer about Z.
    pub active_rotation: f64,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0 * MM),
            dead_layer_thickness: 100.0 * NM,
            active_thickness: 2.0 * MM,
            backing_thickness: 3.0 * MM,
            outer_radius: 7.5 * CM,
            active_rotation: -257.5 * DEG,
        }
    }
}

/// Calibration sources to place. `ids[i]` goes to `positions[i]`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SourceConfig {
    /// Source variant ids.
    pub ids: Vec<i32>,
    /// Carrier centers.
    pub positions: Vec<Vec3>,
    /// Also place the far-side foil of variants that define one.
    pub place_exit_foil: bool,
}

/// Step-size ceilings as fractions of layer thickness.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StepLimitConfig {
    /// Ceiling = `fraction × thickness`.
    pub fraction: f64,
    /// Also limit steps inside source carriers.
    pub limit_carriers: bool,
    /// Also limit steps inside source foils.
    pub limit_foils: bool,
}

impl Default for StepLimitConfig {
    fn default() -> Self {
        Self {
            fraction: 0.1,
            limit_carriers: false,
            limit_foils: false,
        }
    }
}

/// Hexagonal pixelation of the active layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PixelConfig {
    /// Complete rings around the central pixel.
    pub rings: u32,
    /// Corner-to-corner pixel size.
    pub pixel_diameter: f64,
    /// Gap between facing pixel edges.
    pub separation: f64,
}

impl Default for PixelConfig {
    fn default() -> Self {
        Self {
            rings: 2,
            pixel_diameter: 10.3 * MM,
            separation: 0.1 * MM,
        }
    }
}

impl PixelConfig {
    /// Derives the pixel layout.
    pub fn layout(&self) -> Result<PixelLayout, PixelError> {
        PixelLayout::with_rings(self.rings, self.pixel_diameter / 2.0, self.separation)
    }
}

/// Full parameter set for one construction.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectorConfig {
    /// World volume.
    pub world: WorldConfig,
    /// Silicon stack.
    pub stack: StackConfig,
    /// Calibration sources.
    pub sources: SourceConfig,
    /// Step ceilings.
    pub step_limits: StepLimitConfig,
    /// Pixelation.
    pub pixels: PixelConfig,
}

impl DetectorConfig {
    /// Moves the detector stack.
    pub fn set_detector_position(&mut self, position: Vec3) {
        self.stack.position = position;
    }

    /// Sets the dead layer thickness.
    pub fn set_dead_layer_thickness(&mut self, thickness: f64) {
        self.stack.dead_layer_thickness = thickness;
    }

    /// Sets the active silicon thickness.
    pub fn set_active_thickness(&mut self, thickness: f64) {
        self.stack.active_thickness = thickness;
    }

    /// Sets the backing thickness.
    pub fn set_backing_thickness(&mut self, thickness: f64) {
        self.stack.backing_thickness = thickness;
    }

    /// Sets the outer radius of the stack.
    pub fn set_outer_radius(&mut self, radius: f64) {
        self.stack.outer_radius = radius;
    }

    /// Sets the step ceiling fraction.
    pub fn set_step_fraction(&mut self, fraction: f64) {
        self.step_limits.fraction = fraction;
    }

    /// Sets the number of pixel rings.
    pub fn set_pixel_rings(&mut self, rings: u32) {
        self.pixels.rings = rings;
    }

    /// Appends one source id.
    pub fn add_source_id(&mut self, id: i32) {
        self.sources.ids.push(id);
    }

    /// Appends one source position.
    pub fn add_source_position(&mut self, position: Vec3) {
        self.sources.positions.push(position);
    }

    /// Appends a matched (id, position) pair.
    pub fn add_source(&mut self, id: i32, position: Vec3) {
        self.add_source_id(id);
        self.add_source_position(position);
    }

    /// Removes every configured source.
    pub fn clear_sources(&mut self) {
        self.sources.ids.clear();
        self.sources.positions.clear();
    }

    /// Checks dimensions and positions.
    ///
    /// Mismatched source lists are not an error here; construction skips the
    /// source phase and records a diagnostic instead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("world.half_x", self.world.half_x),
            ("world.half_y", self.world.half_y),
            ("world.half_z", self.world.half_z),
            ("world.vacuum_pressure_torr", self.world.vacuum_pressure_torr),
            ("stack.dead_layer_thickness", self.stack.dead_layer_thickness),
            ("stack.active_thickness", self.stack.active_thickness),
            ("stack.backing_thickness", self.stack.backing_thickness),
            ("stack.outer_radius", self.stack.outer_radius),
            ("step_limits.fraction", self.step_limits.fraction),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !self.stack.position.is_finite() {
            return Err(ConfigError::NotFinite {
                field: "stack.position",
            });
        }
        if !self.stack.active_rotation.is_finite() {
            return Err(ConfigError::NotFinite {
                field: "stack.active_rotation",
            });
        }
        if self.sources.positions.iter().any(|p| !p.is_finite()) {
            return Err(ConfigError::NotFinite {
                field: "sources.positions",
            });
        }
        Ok(())
    }

    /// Derives the pixel layout and checks that its bulk cylinder fits
    /// inside the stack's outer radius.
    ///
    /// Pixels place no volumes, so [`Self::validate`] does not run this.
    pub fn fitted_pixel_layout(&self) -> Result<PixelLayout, ConfigError> {
        let layout = self.pixels.layout()?;
        if layout.bulk_radius() > self.stack.outer_radius {
            return Err(ConfigError::PixelsExceedDetector {
                required: layout.bulk_radius(),
                available: self.stack.outer_radius,
            });
        }
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(DetectorConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_thickness_is_rejected() {
        let mut cfg = DetectorConfig::default();
        cfg.set_active_thickness(0.0);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NotPositive {
                field: "stack.active_thickness",
                value: 0.0
            })
        );
    }

    #[test]
    fn oversized_pixel_layout_is_reported_but_still_validates() {
        let mut cfg = DetectorConfig::default();
        cfg.set_pixel_rings(10);
        assert_eq!(cfg.validate(), Ok(()));
        assert!(matches!(
            cfg.fitted_pixel_layout(),
            Err(ConfigError::PixelsExceedDetector { .. })
        ));
    }

    #[test]
    fn narrow_stack_validates_without_fitting_pixels() {
        let mut cfg = DetectorConfig::default();
        cfg.set_outer_radius(20.0 * MM);
        assert_eq!(cfg.validate(), Ok(()));
        assert!(matches!(
            cfg.fitted_pixel_layout(),
            Err(ConfigError::PixelsExceedDetector { available, .. }) if available == 20.0 * MM
        ));
        cfg.set_outer_radius(7.5 * CM);
        assert_eq!(cfg.fitted_pixel_layout().map(|l| l.len()), Ok(19));
    }

    #[test]
    fn huge_ring_count_is_an_error_not_a_panic() {
        let mut cfg = DetectorConfig::default();
        cfg.set_pixel_rings(u32::MAX);
        assert_eq!(cfg.validate(), Ok(()));
        assert!(matches!(
            cfg.fitted_pixel_layout(),
            Err(ConfigError::Pixels(PixelError::TooManyPixels { .. }))
        ));
    }

    #[test]
    fn mismatched_sources_still_validate() {
        let mut cfg = DetectorConfig::default();
        cfg.add_source_id(1);
        cfg.add_source_id(3);
        cfg.add_source_position(Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(cfg.validate(), Ok(()));
        cfg.clear_sources();
        assert!(cfg.sources.ids.is_empty() && cfg.sources.positions.is_empty());
    }
}
