//! Owned memory image with typed field access.
//!
//! Every accessor is a pure function of `(offset, width)` over the arena.
//! Offsets come from [`layout`](super::layout); an out-of-bounds offset is a
//! programming error and panics like slice indexing does.

use super::bitfield::BitField;
use super::layout::IMAGE_SIZE;
use crate::error::{CodeplugError, Result};
use std::fmt;
use std::path::Path;

#[derive(Clone, PartialEq, Eq)]
pub struct MemoryImage {
    data: Box<[u8; IMAGE_SIZE]>,
}

impl fmt::Debug for MemoryImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryImage")
            .field("len", &IMAGE_SIZE)
            .finish()
    }
}

impl Default for MemoryImage {
    fn default() -> Self {
        Self::erased()
    }
}

impl MemoryImage {
    /// Image filled with `0xFF`, the erased-flash state.
    pub fn erased() -> Self {
        Self {
            data: Box::new([0xFF; IMAGE_SIZE]),
        }
    }

    pub fn zeroed() -> Self {
        Self {
            data: Box::new([0x00; IMAGE_SIZE]),
        }
    }

    /// Take ownership of a buffer that must be exactly one image long.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let len = bytes.len();
        let data: Box<[u8; IMAGE_SIZE]> = bytes
            .into_boxed_slice()
            .try_into()
            .map_err(|_| CodeplugError::InvalidImageSize(len))?;
        Ok(Self { data })
    }

    /// Load a raw image file (no header).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_bytes(std::fs::read(path)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.as_bytes())?;
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..]
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data.to_vec()
    }

    /// Page `index` of the transfer layout.
    pub fn page(&self, index: usize, page_size: usize) -> &[u8] {
        let start = index * page_size;
        &self.data[start..(start + page_size).min(IMAGE_SIZE)]
    }

    #[inline]
    pub fn u8(&self, offset: usize) -> u8 {
        self.data[offset]
    }

    #[inline]
    pub fn set_u8(&mut self, offset: usize, value: u8) {
        self.data[offset] = value;
    }

    pub fn u16_be(&self, offset: usize) -> u16 {
        u16::from_be_bytes([self.data[offset], self.data[offset + 1]])
    }

    pub fn set_u16_be(&mut self, offset: usize, value: u16) {
        self.data[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    }

    pub fn u32_be(&self, offset: usize) -> u32 {
        let mut b = [0u8; 4];
        b.copy_from_slice(&self.data[offset..offset + 4]);
        u32::from_be_bytes(b)
    }

    pub fn set_u32_be(&mut self, offset: usize, value: u32) {
        self.data[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
    }

    pub fn i32_be(&self, offset: usize) -> i32 {
        self.u32_be(offset) as i32
    }

    pub fn set_i32_be(&mut self, offset: usize, value: i32) {
        self.set_u32_be(offset, value as u32);
    }

    pub fn u64_le(&self, offset: usize) -> u64 {
        let mut b = [0u8; 8];
        b.copy_from_slice(&self.data[offset..offset + 8]);
        u64::from_le_bytes(b)
    }

    pub fn set_u64_le(&mut self, offset: usize, value: u64) {
        self.data[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn bits(&self, field: BitField) -> u8 {
        field.get(self.data[field.offset])
    }

    #[inline]
    pub fn set_bits(&mut self, field: BitField, value: u8) {
        let byte = self.data[field.offset];
        self.data[field.offset] = field.put(byte, value);
    }

    pub fn flag(&self, field: BitField) -> bool {
        self.bits(field) != 0
    }

    pub fn set_flag(&mut self, field: BitField, on: bool) {
        self.set_bits(field, u8::from(on));
    }

    pub fn slice(&self, offset: usize, len: usize) -> &[u8] {
        &self.data[offset..offset + len]
    }

    pub fn slice_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        &mut self.data[offset..offset + len]
    }

    pub fn fill(&mut self, offset: usize, len: usize, value: u8) {
        self.data[offset..offset + len].fill(value);
    }

    /// Bytes that differ from `other`, as `(offset, ours, theirs)`.
    pub fn diff(&self, other: &MemoryImage) -> Vec<(usize, u8, u8)> {
        self.data
            .iter()
            .zip(other.data.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, (a, b))| (i, *a, *b))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            MemoryImage::from_bytes(vec![0; IMAGE_SIZE + 1]),
            Err(CodeplugError::InvalidImageSize(n)) if n == IMAGE_SIZE + 1
        ));
        assert!(MemoryImage::from_bytes(vec![0; IMAGE_SIZE]).is_ok());
    }

    #[test]
    fn word_endianness() {
        let mut img = MemoryImage::zeroed();
        img.set_u16_be(0x10, 0x1234);
        assert_eq!(img.slice(0x10, 2), &[0x12, 0x34]);
        img.set_u32_be(0x20, 0x44152500);
        assert_eq!(img.slice(0x20, 4), &[0x44, 0x15, 0x25, 0x00]);
        img.set_u64_le(0x30, 0x0102);
        assert_eq!(img.slice(0x30, 2), &[0x02, 0x01]);
        assert_eq!(img.u64_le(0x30), 0x0102);
    }

    #[test]
    fn bitfields_through_image() {
        let mut img = MemoryImage::zeroed();
        let field = BitField::new(0x100, 6, 2);
        img.set_bits(field, 3);
        assert_eq!(img.u8(0x100), 0x60);
        assert_eq!(img.bits(field), 3);
        img.set_flag(BitField::flag(0x100, 0), true);
        assert_eq!(img.u8(0x100), 0x61);
    }

    #[test]
    fn diff_lists_changed_bytes() {
        let a = MemoryImage::zeroed();
        let mut b = a.clone();
        b.set_u8(7, 0xAA);
        assert_eq!(a.diff(&b), vec![(7, 0x00, 0xAA)]);
    }
}
