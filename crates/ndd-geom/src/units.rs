// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Unit constants.
//!
//! Base units: millimetre (length), MeV (energy), nanosecond (time),
//! radian (angle), g/cm³ (density), g/mole (molar mass). Multiply a literal
//! by a constant to express it in base units, divide to read it back:
//! `2.0 * MM`, `100.0 * NM`, `density / MG_PER_CM3`.

/// Millimetre (base length unit).
pub const MM: f64 = 1.0;
/// Nanometre.
pub const NM: f64 = 1e-6 * MM;
/// Micrometre.
pub const UM: f64 = 1e-3 * MM;
/// Centimetre.
pub const CM: f64 = 10.0 * MM;
/// Metre.
pub const M: f64 = 1000.0 * MM;
/// Inch.
pub const INCH: f64 = 2.54 * CM;

/// Radian (base angle unit).
pub const RAD: f64 = 1.0;
/// Degree.
pub const DEG: f64 = std::f64::consts::PI / 180.0 * RAD;

/// MeV (base energy unit).
pub const MEV: f64 = 1.0;
/// Electronvolt.
pub const EV: f64 = 1e-6 * MEV;
/// keV.
pub const KEV: f64 = 1e-3 * MEV;
/// TeV.
pub const TEV: f64 = 1e6 * MEV;

/// Nanosecond (base time unit).
pub const NS: f64 = 1.0;
/// Second.
pub const S: f64 = 1e9 * NS;

/// g/cm³ (base density unit).
pub const G_PER_CM3: f64 = 1.0;
/// mg/cm³.
pub const MG_PER_CM3: f64 = 1e-3 * G_PER_CM3;
/// kg/m³.
pub const KG_PER_M3: f64 = 1e-3 * G_PER_CM3;

/// g/mole (base molar-mass unit).
pub const G_PER_MOLE: f64 = 1.0;

/// Percent, for mass fractions.
pub const PERCENT: f64 = 0.01;

/// Torr (pressure; only ever used as a ratio).
pub const TORR: f64 = 1.0;
/// Standard atmosphere expressed in Torr.
pub const ATMOSPHERE: f64 = 760.0 * TORR;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_units_nest() {
        assert!((1000.0 * UM - MM).abs() < 1e-15);
        assert!((1e6 * NM - MM).abs() < 1e-12);
        assert_eq!(M, 100.0 * CM);
    }

    #[test]
    fn density_units_agree() {
        assert!((3510.0 * KG_PER_M3 - 3.51 * G_PER_CM3).abs() < 1e-12);
        assert!((1.293 * MG_PER_CM3 - 0.001293).abs() < 1e-15);
    }
}
