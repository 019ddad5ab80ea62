use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::api::config::ColorScheme;

/// Linear RGBA colour, each channel in 0..1.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Rgba = Rgba { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// From a 0xRRGGBB literal.
    pub fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as f32 / 255.0,
            g: ((rgb >> 8) & 0xff) as f32 / 255.0,
            b: (rgb & 0xff) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    /// Multiply the current alpha.
    pub fn fade(self, factor: f32) -> Self {
        self.with_alpha(self.a * factor)
    }
}

/// Star palette for a scheme: three accent shades and white.
pub fn palette(scheme: ColorScheme) -> [Rgba; 4] {
    let [a, b, c] = match scheme {
        ColorScheme::Purple => [0x9333ea, 0xa855f7, 0xc084fc],
        ColorScheme::Blue => [0x3b82f6, 0x60a5fa, 0x93c5fd],
        ColorScheme::Green => [0x10b981, 0x34d399, 0x6ee7b7],
        ColorScheme::Amber => [0xf59e0b, 0xfbbf24, 0xfcd34d],
        ColorScheme::Red => [0xef4444, 0xf87171, 0xfca5a5],
    };
    [Rgba::hex(a), Rgba::hex(b), Rgba::hex(c), Rgba::WHITE]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_decodes_channels() {
        let c = Rgba::hex(0xff8000);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn alpha_is_clamped() {
        assert_eq!(Rgba::WHITE.with_alpha(2.0).a, 1.0);
        assert_eq!(Rgba::WHITE.fade(0.5).a, 0.5);
    }

    #[test]
    fn every_palette_ends_in_white() {
        for scheme in [ColorScheme::Purple, ColorScheme::Blue, ColorScheme::Red] {
            assert_eq!(palette(scheme)[3], Rgba::WHITE);
        }
    }
}
