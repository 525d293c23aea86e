use plotters::style::RGBColor;

/// Continuous colour scales, sampled from their published stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Viridis,
    Plasma,
}

const VIRIDIS: &[(u8, u8, u8)] = &[
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

const PLASMA: &[(u8, u8, u8)] = &[
    (13, 8, 135),
    (126, 3, 168),
    (204, 71, 120),
    (248, 149, 64),
    (240, 249, 33),
];

/// Qualitative palette for categories (legend order).
const CATEGORICAL: &[(u8, u8, u8)] = &[
    (99, 110, 250),
    (239, 85, 59),
    (0, 204, 150),
    (171, 99, 250),
    (255, 161, 90),
    (25, 211, 243),
    (255, 102, 146),
    (182, 232, 128),
    (255, 151, 255),
    (254, 203, 82),
];

impl Scale {
    fn stops(&self) -> &'static [(u8, u8, u8)] {
        match self {
            Scale::Viridis => VIRIDIS,
            Scale::Plasma => PLASMA,
        }
    }

    /// Colour at `t` in [0, 1]; out-of-range input is clamped.
    pub fn at(&self, t: f64) -> RGBColor {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let pos = t * (stops.len() - 1) as f64;
        let i = (pos.floor() as usize).min(stops.len() - 2);
        let frac = pos - i as f64;
        let (a, b) = (stops[i], stops[i + 1]);
        RGBColor(lerp(a.0, b.0, frac), lerp(a.1, b.1, frac), lerp(a.2, b.2, frac))
    }

    pub fn for_value(&self, v: f64, lo: f64, hi: f64) -> RGBColor {
        self.at(normalize(v, lo, hi))
    }
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

/// Position of `v` inside [lo, hi]; a flat range maps everything to the top.
pub fn normalize(v: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        ((v - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

pub fn category(i: usize) -> RGBColor {
    let (r, g, b) = CATEGORICAL[i % CATEGORICAL.len()];
    RGBColor(r, g, b)
}
