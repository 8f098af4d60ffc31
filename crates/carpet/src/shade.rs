//! Shades of green for execution frequency.

/// Number of discrete shades
pub const SHADE_COUNT: usize = 10;

/// 256-color palette entries, palest first
pub const GREEN_SHADES: [u8; SHADE_COUNT] = [29, 30, 34, 36, 40, 42, 46, 48, 50, 51];

/// Keeps a ratio of exactly 1.0 inside the last bucket
const EPSILON: f64 = 1e-5;

/// One discrete color-intensity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Shade(u8);

impl Shade {
    /// Shade at `index`, saturating at the last one
    #[must_use]
    pub const fn new(index: usize) -> Self {
        if index >= SHADE_COUNT {
            Self((SHADE_COUNT - 1) as u8)
        } else {
            Self(index as u8)
        }
    }

    /// Position in the palette, 0..SHADE_COUNT
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// 256-color terminal value of this shade
    #[inline]
    #[must_use]
    pub const fn color_value(self) -> u8 {
        GREEN_SHADES[self.0 as usize]
    }

    /// All shades in palette order
    pub fn all() -> impl Iterator<Item = Self> {
        (0..SHADE_COUNT).map(Self::new)
    }
}

/// Map a normalized coverage ratio to a shade
///
/// Ratios outside [0, 1] are clamped; NaN counts as 0.
#[must_use]
pub fn shade_for(ratio: f64) -> Shade {
    let ratio = if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    };
    let bucket = ((ratio - EPSILON) * SHADE_COUNT as f64).floor();
    if bucket <= 0.0 {
        Shade::new(0)
    } else {
        Shade::new(bucket as usize)
    }
}
