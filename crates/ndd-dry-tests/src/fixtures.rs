// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ready-made detector configurations.

use ndd_core::DetectorConfig;
use ndd_geom::units::MM;
use ndd_geom::Vec3;

/// Upstream position for the `slot`-th source: on axis, 40 mm apart,
/// starting 30 mm in front of the stack.
pub fn source_position(slot: usize) -> Vec3 {
    Vec3::new(0.0, 0.0, -30.0 * MM - 40.0 * MM * slot as f64)
}

/// Default stack plus one source of every id 0..=4 (id 2 builds nothing).
pub fn all_sources_config() -> DetectorConfig {
    let mut cfg = DetectorConfig::default();
    for (slot, id) in (0..=4).enumerate() {
        cfg.add_source(id, source_position(slot));
    }
    cfg
}

/// Two ids but three positions.
pub fn mismatched_sources_config() -> DetectorConfig {
    let mut cfg = DetectorConfig::default();
    cfg.add_source_id(1);
    cfg.add_source_id(3);
    for slot in 0..3 {
        cfg.add_source_position(source_position(slot));
    }
    cfg
}
