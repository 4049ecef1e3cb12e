use std::fmt;

/// Stereo separation mode.
///
/// Holds one of `-1`, `0`, `+1`: the sign and presence of the angular offset
/// applied to the two eyes. Toggling cycles `0 → 1 → -1 → 0`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct StereoMode(i8);

impl StereoMode {
    pub const NEGATIVE: Self = Self(-1);
    pub const OFF: Self = Self(0);
    pub const POSITIVE: Self = Self(1);

    #[inline]
    pub fn raw(self) -> i8 {
        self.0
    }

    /// Signed multiplier applied to the eye separation.
    #[inline]
    pub fn factor(self) -> f32 {
        f32::from(self.0)
    }

    /// Next mode in the cycle: `((m + 2) mod 3) - 1`.
    #[inline]
    pub fn toggled(self) -> Self {
        Self((self.0 + 2).rem_euclid(3) - 1)
    }

    pub fn toggle(&mut self) {
        *self = self.toggled();
    }
}

impl Default for StereoMode {
    fn default() -> Self {
        Self::POSITIVE
    }
}

impl fmt::Display for StereoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            -1 => f.write_str("reversed"),
            0 => f.write_str("off"),
            _ => f.write_str("normal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [StereoMode; 3] = [StereoMode::NEGATIVE, StereoMode::OFF, StereoMode::POSITIVE];

    #[test]
    fn toggle_cycles_off_positive_negative() {
        let mut m = StereoMode::OFF;
        m.toggle();
        assert_eq!(m, StereoMode::POSITIVE);
        m.toggle();
        assert_eq!(m, StereoMode::NEGATIVE);
        m.toggle();
        assert_eq!(m, StereoMode::OFF);
    }

    #[test]
    fn three_toggles_are_identity() {
        for m in ALL {
            assert_eq!(m.toggled().toggled().toggled(), m);
        }
    }

    #[test]
    fn toggle_stays_in_range() {
        for m in ALL {
            let t = m.toggled();
            assert!((-1..=1).contains(&t.raw()));
            assert_ne!(t, m);
        }
    }

    #[test]
    fn factor_matches_raw() {
        assert_eq!(StereoMode::NEGATIVE.factor(), -1.0);
        assert_eq!(StereoMode::OFF.factor(), 0.0);
        assert_eq!(StereoMode::POSITIVE.factor(), 1.0);
    }
}
