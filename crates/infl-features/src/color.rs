//! sRGB to CIE L\*a\*b\* under the D65 white point.

use serde::{Deserialize, Serialize};

/// D65 reference white, Y normalised to 1.
const WHITE: [f64; 3] = [0.950_47, 1.0, 1.088_83];

const EPSILON: f64 = 216.0 / 24_389.0;
const KAPPA: f64 = 24_389.0 / 27.0;

/// A colour in CIE L\*a\*b\* space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    #[must_use]
    pub fn to_array(self) -> [f64; 3] {
        [self.l, self.a, self.b]
    }
}

fn linearize(channel: f64) -> f64 {
    if channel <= 0.040_45 {
        channel / 12.92
    } else {
        ((channel + 0.055) / 1.055).powf(2.4)
    }
}

fn f(t: f64) -> f64 {
    if t > EPSILON {
        t.cbrt()
    } else {
        (KAPPA * t + 16.0) / 116.0
    }
}

/// Converts an 8-bit-scale sRGB triple (each channel in `0.0..=255.0`) to
/// L\*a\*b\*.
#[must_use]
pub fn srgb_to_lab(rgb: [f64; 3]) -> Lab {
    let [r, g, b] = rgb.map(|c| linearize((c / 255.0).clamp(0.0, 1.0)));

    let x = 0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b;
    let y = 0.212_672_9 * r + 0.715_152_2 * g + 0.072_175_0 * b;
    let z = 0.019_333_9 * r + 0.119_192_0 * g + 0.950_304_1 * b;

    let fx = f(x / WHITE[0]);
    let fy = f(y / WHITE[1]);
    let fz = f(z / WHITE[2]);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}
