use serde::{Deserialize, Serialize};

/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Build from a `0xRRGGBB` literal.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    pub const fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Linear-light components, ready for shading.
    pub fn to_linear(self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Colors cycled through by clicks on the render surface.
pub const PALETTE: [Rgb; 5] = [
    Rgb::from_hex(0xff0000),
    Rgb::from_hex(0x00ff00),
    Rgb::from_hex(0x7513cc),
    Rgb::from_hex(0xcc13a8),
    Rgb::from_hex(0x2e1fe7),
];

/// Color every cube starts with, before the first click.
pub const DEFAULT_CUBE_COLOR: Rgb = Rgb::from_hex(0x00ff00);

/// Strength of the emissive term relative to the emissive color.
pub const EMISSIVE_INTENSITY: f32 = 0.3;

/// Surface material of a cube. Surface and glow color are set together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubeMaterial {
    pub color: Rgb,
    pub emissive: Rgb,
    pub emissive_intensity: f32,
}

impl CubeMaterial {
    /// Material whose surface and emissive colors are both `color`.
    pub fn glowing(color: Rgb) -> Self {
        Self {
            color,
            emissive: color,
            emissive_intensity: EMISSIVE_INTENSITY,
        }
    }
}

impl Default for CubeMaterial {
    fn default() -> Self {
        Self::glowing(DEFAULT_CUBE_COLOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let c = Rgb::from_hex(0x7513cc);
        assert_eq!((c.r, c.g, c.b), (0x75, 0x13, 0xcc));
        assert_eq!(c.to_hex(), 0x7513cc);
        assert_eq!(c.to_string(), "#7513cc");
    }

    #[test]
    fn linear_endpoints() {
        assert_eq!(Rgb::from_hex(0x000000).to_linear(), [0.0, 0.0, 0.0]);
        let white = Rgb::from_hex(0xffffff).to_linear();
        for c in white {
            assert!((c - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn default_material_is_green_glow() {
        let m = CubeMaterial::default();
        assert_eq!(m.color, Rgb::from_hex(0x00ff00));
        assert_eq!(m.emissive, m.color);
        assert_eq!(m.emissive_intensity, 0.3);
    }
}
