//! Dead-zone normalization for absolute axes.

/// Map a raw absolute sample into `[-1.0, 1.0]`, reporting exactly `0.0` inside
/// the dead zone.
///
/// Values outside the dead zone are passed through unscaled: a stick just past a
/// 0.1 dead zone reports ~0.1, not ~0.0. Samples beyond `full_scale` (e.g. -32768
/// against a 32767 scale) are clamped to the unit range.
///
/// `full_scale` must be positive; layouts are validated before any sample is
/// normalized.
#[inline]
pub fn normalize(raw_sample: i32, full_scale: f32, dead_zone: f32) -> f32 {
    let v = raw_sample as f32 / full_scale;
    if v.abs() < dead_zone {
        0.0
    } else {
        v.clamp(-1.0, 1.0)
    }
}
