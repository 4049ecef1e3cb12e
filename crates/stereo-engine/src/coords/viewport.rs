/// Pixel rectangle on a render target, origin top-left.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ViewportRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ViewportRect {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn right(self) -> u32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(self) -> u32 {
        self.y + self.height
    }

    /// Whether the two rectangles share at least one pixel.
    pub fn overlaps(self, other: Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Splits a `width`×`height` drawable into left and right halves.
///
/// Both halves are `width / 2` wide; for odd widths the last column is left
/// uncovered, never shared.
pub fn side_by_side(width: u32, height: u32) -> [ViewportRect; 2] {
    let half = width / 2;
    [
        ViewportRect::new(0, 0, half, height),
        ViewportRect::new(half, 0, half, height),
    ]
}
