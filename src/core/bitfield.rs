//! Named sub-byte fields.
//!
//! The radio packs its flag bytes most-significant-bit first: the first field
//! declared in a byte occupies its top bits. A [`BitField`] names one such
//! range relative to the start of a record.

/// `width` bits at `shift` within the byte at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub offset: usize,
    pub shift: u8,
    pub width: u8,
}

impl BitField {
    /// Field of `width` bits whose most significant bit is bit `msb` (7 = top).
    pub const fn new(offset: usize, msb: u8, width: u8) -> Self {
        Self {
            offset,
            shift: msb + 1 - width,
            width,
        }
    }

    pub const fn flag(offset: usize, bit: u8) -> Self {
        Self::new(offset, bit, 1)
    }

    #[inline]
    pub const fn mask(&self) -> u8 {
        (((1u16 << self.width) - 1) as u8) << self.shift
    }

    /// Largest value the field can hold.
    #[inline]
    pub const fn max(&self) -> u8 {
        ((1u16 << self.width) - 1) as u8
    }

    /// Same field relative to `base`.
    pub const fn at(&self, base: usize) -> Self {
        Self {
            offset: base + self.offset,
            shift: self.shift,
            width: self.width,
        }
    }

    #[inline]
    pub fn get(&self, byte: u8) -> u8 {
        (byte & self.mask()) >> self.shift
    }

    /// `byte` with this field replaced by `value`. Excess high bits of `value` are dropped.
    #[inline]
    pub fn put(&self, byte: u8, value: u8) -> u8 {
        (byte & !self.mask()) | ((value << self.shift) & self.mask())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msb_first_layout() {
        // power:2, wideth:2, offsetdir:2, freqinvert:1, talkaround:1
        let power = BitField::new(0, 7, 2);
        let wideth = BitField::new(0, 5, 2);
        let offsetdir = BitField::new(0, 3, 2);
        let talkaround = BitField::flag(0, 0);

        let byte = 0b10_01_10_0_1;
        assert_eq!(power.get(byte), 2);
        assert_eq!(wideth.get(byte), 1);
        assert_eq!(offsetdir.get(byte), 2);
        assert_eq!(talkaround.get(byte), 1);
        assert_eq!(power.mask(), 0xC0);
        assert_eq!(offsetdir.max(), 3);
    }

    #[test]
    fn put_leaves_neighbours_alone() {
        let sqtype = BitField::new(0, 3, 4);
        let byte = sqtype.put(0xF0, 0x0A);
        assert_eq!(byte, 0xFA);
        assert_eq!(sqtype.put(byte, 0), 0xF0);
        // value wider than the field is masked
        assert_eq!(BitField::flag(0, 5).put(0x00, 0xFF), 0x20);
    }
}
