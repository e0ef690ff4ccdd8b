use crate::error::TumbleError;
use serde::{Deserialize, Serialize};

/// Viewport size in logical (CSS) pixels, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when both dimensions are finite and strictly positive.
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Width over height. Only meaningful for drawable viewports.
    pub fn aspect(&self) -> f32 {
        (self.width / self.height) as f32
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Size of a render buffer in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferSize {
    pub width: u32,
    pub height: u32,
}

impl BufferSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Physical buffer size for a viewport, with the device pixel ratio capped
    /// at `max_pixel_ratio`.
    pub fn for_viewport(
        viewport: ViewportSize,
        device_pixel_ratio: f64,
        max_pixel_ratio: f64,
    ) -> Result<Self, TumbleError> {
        if !viewport.is_drawable() {
            return Err(TumbleError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let ratio = effective_pixel_ratio(device_pixel_ratio, max_pixel_ratio);
        Ok(Self {
            width: ((viewport.width * ratio).floor() as u32).max(1),
            height: ((viewport.height * ratio).floor() as u32).max(1),
        })
    }

    /// Halve both dimensions, rounding to nearest and never dropping below 1.
    pub fn halved(&self) -> Self {
        Self {
            width: ((self.width as f64 / 2.0).round() as u32).max(1),
            height: ((self.height as f64 / 2.0).round() as u32).max(1),
        }
    }

    pub fn texel(&self) -> [f32; 2] {
        [1.0 / self.width as f32, 1.0 / self.height as f32]
    }
}

/// Device pixel ratio clamped to `(0, max]`. Garbage input falls back to 1.
pub fn effective_pixel_ratio(device_pixel_ratio: f64, max_pixel_ratio: f64) -> f64 {
    if !device_pixel_ratio.is_finite() || device_pixel_ratio <= 0.0 {
        return 1.0;
    }
    device_pixel_ratio.min(max_pixel_ratio)
}

/// RGB color with components in `[0, 1]`, stored in sRGB space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Build from a `0xRRGGBB` literal.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Convert to linear RGBA for shading into an sRGB surface.
    pub fn to_linear_rgba(&self) -> [f32; 4] {
        fn channel(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [channel(self.r), channel(self.g), channel(self.b), 1.0]
    }
}
