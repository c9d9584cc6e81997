//! Integer bit widths at which arguments are declared and comparisons are
//! recorded.

use core::fmt;

/// The bit width of an integer argument or of a recorded comparison.
///
/// Widths are ordered by their bit count, so `Width::W8 < Width::W64`.
///
/// # Example
///
/// ```
/// use cmphints::Width;
///
/// assert_eq!(Width::W16.truncate(0x12345678), 0x5678);
/// assert_eq!(Width::W8.sign_extend(0xab, Width::W32), 0xffffffab);
/// assert_eq!(Width::from_bits(24), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Width {
    /// 8 bits.
    W8,
    /// 16 bits.
    W16,
    /// 32 bits.
    W32,
    /// 64 bits.
    W64,
}

impl Width {
    /// Every supported width, narrowest first.
    pub const ALL: [Width; 4] = [Width::W8, Width::W16, Width::W32, Width::W64];

    /// Get the width with the given number of bits, if it is supported.
    #[must_use]
    pub fn from_bits(bits: u32) -> Option<Width> {
        match bits {
            8 => Some(Width::W8),
            16 => Some(Width::W16),
            32 => Some(Width::W32),
            64 => Some(Width::W64),
            _ => None,
        }
    }

    /// Get the width with the given number of bytes, if it is supported.
    #[must_use]
    pub fn from_bytes(bytes: usize) -> Option<Width> {
        match bytes {
            1 => Some(Width::W8),
            2 => Some(Width::W16),
            4 => Some(Width::W32),
            8 => Some(Width::W64),
            _ => None,
        }
    }

    /// The number of bits in this width.
    #[inline]
    #[must_use]
    pub fn bits(self) -> u32 {
        match self {
            Width::W8 => 8,
            Width::W16 => 16,
            Width::W32 => 32,
            Width::W64 => 64,
        }
    }

    /// The number of bytes in this width.
    #[inline]
    #[must_use]
    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    /// A mask with the low `self.bits()` bits set.
    #[inline]
    #[must_use]
    pub fn mask(self) -> u64 {
        u64::MAX >> (64 - self.bits())
    }

    /// Keep only the low `self.bits()` bits of `value`.
    #[inline]
    #[must_use]
    pub fn truncate(self, value: u64) -> u64 {
        value & self.mask()
    }

    /// Whether `value` is representable in this width without loss.
    #[inline]
    #[must_use]
    pub fn fits(self, value: u64) -> bool {
        value & !self.mask() == 0
    }

    /// Whether the most significant bit of `value`, within this width, is set.
    #[inline]
    #[must_use]
    pub fn top_bit_set(self, value: u64) -> bool {
        value & (1 << (self.bits() - 1)) != 0
    }

    /// Sign-extend `value`, read at this width, out to the wider width `to`.
    ///
    /// The added high bits are filled with copies of `value`'s top bit. When
    /// `to` is not wider than `self`, this is truncation to `to`.
    #[must_use]
    pub fn sign_extend(self, value: u64, to: Width) -> u64 {
        let value = self.truncate(value);
        if to <= self || !self.top_bit_set(value) {
            return to.truncate(value);
        }
        to.truncate(value | !self.mask())
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks() {
        assert_eq!(Width::W8.mask(), 0xff);
        assert_eq!(Width::W16.mask(), 0xffff);
        assert_eq!(Width::W32.mask(), 0xffff_ffff);
        assert_eq!(Width::W64.mask(), u64::MAX);
    }

    #[test]
    fn fits_and_truncate() {
        assert!(Width::W8.fits(0xff));
        assert!(!Width::W8.fits(0x100));
        assert!(Width::W64.fits(u64::MAX));
        assert_eq!(Width::W32.truncate(0x1234_5678_9abc_def0), 0x9abc_def0);
    }

    #[test]
    fn sign_extension() {
        assert_eq!(Width::W8.sign_extend(0xab, Width::W16), 0xffab);
        assert_eq!(Width::W8.sign_extend(0xab, Width::W64), 0xffff_ffff_ffff_ffab);
        assert_eq!(Width::W16.sign_extend(0x7fab, Width::W64), 0x7fab);
        assert_eq!(Width::W32.sign_extend(0x8000_0000, Width::W64), 0xffff_ffff_8000_0000);
        // Narrowing is just truncation.
        assert_eq!(Width::W32.sign_extend(0xffff_ffab, Width::W8), 0xab);
    }

    #[test]
    fn ordering() {
        assert!(Width::W8 < Width::W16);
        assert!(Width::W32 < Width::W64);
        let mut sorted = Width::ALL;
        sorted.sort();
        assert_eq!(sorted, Width::ALL);
    }

    #[test]
    fn conversions() {
        for w in Width::ALL {
            assert_eq!(Width::from_bits(w.bits()), Some(w));
            assert_eq!(Width::from_bytes(w.bytes()), Some(w));
        }
        assert_eq!(Width::from_bits(0), None);
        assert_eq!(Width::from_bytes(3), None);
    }
}
