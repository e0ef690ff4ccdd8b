use crate::types::Rgb;
use serde::{Deserialize, Serialize};

/// Bloom post-processing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloomSettings {
    pub enabled: bool,
    /// Multiplier applied to the blurred highlights before they are added back.
    pub strength: f32,
    /// Blends mip weights toward the wider levels. 0 keeps the tight glow.
    pub radius: f32,
    /// Luminance above which a pixel contributes to the glow.
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: 1.0,
            radius: 0.2,
            threshold: 0.002,
        }
    }
}

/// Fixed scene configuration. Nothing here is user-editable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub cube_size: f32,
    pub cube_segments: u32,
    pub cube_color: Rgb,
    pub clear_color: Rgb,
    pub camera_fov_degrees: f32,
    pub camera_near: f32,
    pub camera_far: f32,
    pub camera_distance: f32,
    pub orbit_damping: f32,
    /// Radians per second.
    pub rotation_rate: f64,
    pub max_pixel_ratio: f64,
    pub bloom: BloomSettings,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            cube_size: 1.0,
            cube_segments: 8,
            cube_color: Rgb::from_hex(0xfff000),
            clear_color: Rgb::BLACK,
            camera_fov_degrees: 20.0,
            camera_near: 0.1,
            camera_far: 100.0,
            camera_distance: 3.0,
            orbit_damping: 0.02,
            rotation_rate: std::f64::consts::PI,
            max_pixel_ratio: 2.0,
            bloom: BloomSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_constants() {
        let cfg = SceneConfig::default();
        assert_eq!(cfg.cube_segments, 8);
        assert_eq!(cfg.camera_fov_degrees, 20.0);
        assert_eq!(cfg.camera_distance, 3.0);
        assert_eq!(cfg.orbit_damping, 0.02);
        assert_eq!(cfg.max_pixel_ratio, 2.0);
        assert_eq!(cfg.bloom.strength, 1.0);
        assert_eq!(cfg.bloom.radius, 0.2);
        assert_eq!(cfg.bloom.threshold, 0.002);
    }
}
