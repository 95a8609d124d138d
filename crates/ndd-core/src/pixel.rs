// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Hexagonal pixel layout of the active silicon layer.
//!
//! Pixels are regular hexagons of circumradius `R` packed with a gap `s`
//! between facing edges, so neighbouring centers sit `√3·R + s` apart along
//! the six directions 0°, 60°, …, 300°. Centers are enumerated ring by ring:
//! the central pixel first, then each ring counter-clockwise starting from
//! the 0° direction.

use thiserror::Error;

/// Margin added around the outermost pixel when sizing the bulk cylinder.
pub const BULK_MARGIN: f64 = 2.0 * ndd_geom::units::MM;

/// Largest layout [`PixelLayout::with_count`] will enumerate.
pub const MAX_PIXELS: usize = 100_000;

/// Errors raised when deriving a layout.
#[derive(Debug, Error, PartialEq)]
pub enum PixelError {
    /// A layout needs at least one pixel.
    #[error("pixel count must be at least 1")]
    Empty,
    /// Radius must be positive, separation non-negative, both finite.
    #[error("invalid pixel dimensions: radius {radius}, separation {separation}")]
    InvalidDimensions {
        /// Circumradius.
        radius: f64,
        /// Edge-to-edge gap.
        separation: f64,
    },
    /// The requested layout holds more than [`MAX_PIXELS`] pixels.
    #[error("pixel layout exceeds {limit} pixels")]
    TooManyPixels {
        /// Largest accepted pixel count.
        limit: usize,
    },
}

/// Number of pixels in a hexagon of `rings` rings around a central pixel,
/// or `None` if that count does not fit in `usize`.
pub fn pixels_in_rings(rings: u32) -> Option<usize> {
    let r = usize::try_from(rings).ok()?;
    r.checked_add(1)
        .and_then(|n| n.checked_mul(r))
        .and_then(|n| n.checked_mul(3))
        .and_then(|n| n.checked_add(1))
}

/// Smallest number of rings holding at least `count` pixels.
pub fn rings_for(count: usize) -> u32 {
    let mut rings = 0;
    while pixels_in_rings(rings).is_some_and(|n| n < count) {
        rings += 1;
    }
    rings
}

/// Pixel centers plus the cylinder of bulk silicon that covers them.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelLayout {
    pixel_radius: f64,
    separation: f64,
    centers: Vec<[f64; 2]>,
}

impl PixelLayout {
    /// Lays out `count` pixels.
    pub fn with_count(count: usize, pixel_radius: f64, separation: f64) -> Result<Self, PixelError> {
        if count == 0 {
            return Err(PixelError::Empty);
        }
        if count > MAX_PIXELS {
            return Err(PixelError::TooManyPixels { limit: MAX_PIXELS });
        }
        if !(pixel_radius.is_finite() && pixel_radius > 0.0 && separation.is_finite() && separation >= 0.0) {
            return Err(PixelError::InvalidDimensions {
                radius: pixel_radius,
                separation,
            });
        }
        let pitch = 3f64.sqrt() * pixel_radius + separation;
        let directions: Vec<[f64; 2]> = (0u32..6)
            .map(|i| {
                let theta = f64::from(i) * std::f64::consts::FRAC_PI_3;
                [pitch * theta.cos(), pitch * theta.sin()]
            })
            .collect();

        let mut centers = vec![[0.0, 0.0]];
        let mut ring: u32 = 1;
        while centers.len() < count {
            let k = f64::from(ring);
            let mut p = [k * directions[0][0], k * directions[0][1]];
            for side in 0..6 {
                let step = directions[(side + 2) % 6];
                for _ in 0..ring {
                    centers.push(p);
                    p = [p[0] + step[0], p[1] + step[1]];
                }
            }
            ring += 1;
        }
        centers.truncate(count);
        Ok(Self {
            pixel_radius,
            separation,
            centers,
        })
    }

    /// Lays out `rings` complete rings around a central pixel.
    pub fn with_rings(rings: u32, pixel_radius: f64, separation: f64) -> Result<Self, PixelError> {
        let count =
            pixels_in_rings(rings).ok_or(PixelError::TooManyPixels { limit: MAX_PIXELS })?;
        Self::with_count(count, pixel_radius, separation)
    }

    /// Center-to-center distance of neighbouring pixels.
    pub fn pitch(&self) -> f64 {
        3f64.sqrt() * self.pixel_radius + self.separation
    }

    /// Pixel circumradius.
    pub fn pixel_radius(&self) -> f64 {
        self.pixel_radius
    }

    /// Pixel centers in enumeration order.
    pub fn centers(&self) -> &[[f64; 2]] {
        &self.centers
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    /// Never `true`; layouts hold at least one pixel.
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Rings needed for this many pixels.
    pub fn rings(&self) -> u32 {
        rings_for(self.centers.len())
    }

    /// Mean of the pixel centers.
    pub fn bulk_center(&self) -> [f64; 2] {
        let n = self.centers.len() as f64;
        let (sx, sy) = self
            .centers
            .iter()
            .fold((0.0, 0.0), |(sx, sy), c| (sx + c[0], sy + c[1]));
        [sx / n, sy / n]
    }

    /// Radius of the bulk cylinder: farthest center plus one pixel, one gap
    /// and [`BULK_MARGIN`].
    pub fn bulk_radius(&self) -> f64 {
        let [cx, cy] = self.bulk_center();
        let farthest = self
            .centers
            .iter()
            .map(|c| (c[0] - cx).hypot(c[1] - cy))
            .fold(0.0, f64::max);
        farthest + self.pixel_radius + self.separation + BULK_MARGIN
    }

    /// Index of the pixel covering `(x, y)`, or `None` for gaps and the
    /// region outside the layout.
    pub fn pixel_at(&self, x: f64, y: f64) -> Option<usize> {
        let apothem = 3f64.sqrt() / 2.0 * self.pixel_radius;
        let normals = [0.0f64, 60.0, 120.0].map(|deg| {
            let t = deg.to_radians();
            [t.cos(), t.sin()]
        });
        self.centers.iter().position(|c| {
            let (dx, dy) = (x - c[0], y - c[1]);
            normals
                .iter()
                .all(|n| (dx * n[0] + dy * n[1]).abs() <= apothem)
        })
    }
}
