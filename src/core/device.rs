//! Device header and model variants.
//!
//! The first 128 bytes of the image describe the radio: model name, band
//! limits, firmware versions and feature bytes. Setting them has no effect on
//! the radio, so they are exposed read-only.

use super::fields::Field;
use super::freq::decode_freq;
use super::image::MemoryImage;
use super::layout::DEVICE_INFO;
use super::text::decode_text;
use crate::error::{CodeplugError, Result};
use std::ops::RangeInclusive;

/// Model name reported by the K6 variant.
pub const K6_MODEL: &str = "BF-K6";

const MHZ: u64 = 1_000_000;

const K6_BANDS: &[RangeInclusive<u64>] = &[136 * MHZ..=174 * MHZ, 400 * MHZ..=470 * MHZ];

const STANDARD_BANDS: &[RangeInclusive<u64>] = &[
    136 * MHZ..=174 * MHZ,
    200 * MHZ..=260 * MHZ,
    350 * MHZ..=399 * MHZ,
    400 * MHZ..=520 * MHZ,
];

/// Hardware variant, chosen from the model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelVariant {
    #[default]
    Standard,
    K6,
}

impl ModelVariant {
    pub fn from_model(model: &str) -> Self {
        if model.trim() == K6_MODEL {
            ModelVariant::K6
        } else {
            ModelVariant::Standard
        }
    }

    pub fn bands(self) -> &'static [RangeInclusive<u64>] {
        match self {
            ModelVariant::K6 => K6_BANDS,
            ModelVariant::Standard => STANDARD_BANDS,
        }
    }

    pub fn in_band(self, hz: u64) -> bool {
        self.bands().iter().any(|band| band.contains(&hz))
    }

    /// `OutOfBand` unless `hz` falls inside one of the variant's bands.
    pub fn check_band(self, hz: u64) -> Result<()> {
        if self.in_band(hz) {
            Ok(())
        } else {
            Err(CodeplugError::OutOfBand(hz))
        }
    }
}

/// Header fields addressable as `device.<name>`.
pub const DEVICE_FIELDS: &[Field] = &[
    Field::ascii("name", 0, 16),
    Field::ascii("software_version", 80, 8),
    Field::ascii("hardware_version", 88, 8),
    Field::ascii("production_date", 96, 16),
    Field::byte("freq_band", 112),
    Field::byte("limits", 113),
    Field::byte("scramble", 114),
    Field::byte("features1", 115),
    Field::byte("features2", 116),
];

const RX_RANGES: usize = 16;
const TX_RANGES: usize = 48;
const RANGE_COUNT: usize = 4;

/// Decoded device header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceHeader {
    pub name: String,
    /// `(low, high)` Hz pairs; empty slots are skipped.
    pub rx_ranges: Vec<(u64, u64)>,
    pub tx_ranges: Vec<(u64, u64)>,
    pub software_version: String,
    pub hardware_version: String,
    pub production_date: String,
    pub freq_band: u8,
}

fn ranges(image: &MemoryImage, offset: usize) -> Vec<(u64, u64)> {
    (0..RANGE_COUNT)
        .map(|i| {
            let at = DEVICE_INFO + offset + i * 8;
            (decode_freq(image.u32_be(at)), decode_freq(image.u32_be(at + 4)))
        })
        .filter(|&(low, high)| low != 0 || high != 0)
        .collect()
}

impl DeviceHeader {
    pub fn read(image: &MemoryImage) -> Self {
        let text = |offset: usize, len: usize| decode_text(image.slice(DEVICE_INFO + offset, len));
        Self {
            name: text(0, 16),
            rx_ranges: ranges(image, RX_RANGES),
            tx_ranges: ranges(image, TX_RANGES),
            software_version: text(80, 8),
            hardware_version: text(88, 8),
            production_date: text(96, 16),
            freq_band: image.u8(DEVICE_INFO + 112),
        }
    }

    pub fn variant(&self) -> ModelVariant {
        ModelVariant::from_model(&self.name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::core::freq::encode_freq;

    #[test]
    fn variant_bands() {
        assert_eq!(ModelVariant::from_model("BF-K6"), ModelVariant::K6);
        assert_eq!(ModelVariant::from_model("5RH-PRO"), ModelVariant::Standard);
        assert!(ModelVariant::K6.in_band(446_000_000));
        assert!(!ModelVariant::K6.in_band(480_000_000));
        assert!(ModelVariant::Standard.in_band(480_000_000));
        assert!(ModelVariant::Standard.in_band(220_000_000));
        assert!(matches!(
            ModelVariant::K6.check_band(220_000_000),
            Err(CodeplugError::OutOfBand(220_000_000))
        ));
    }

    #[test]
    fn header_decode() {
        let mut img = MemoryImage::erased();
        img.slice_mut(0, 5).copy_from_slice(b"BF-K6");
        img.set_u32_be(RX_RANGES, encode_freq(136_000_000).unwrap());
        img.set_u32_be(RX_RANGES + 4, encode_freq(174_000_000).unwrap());
        img.set_u8(112, 2);
        let header = DeviceHeader::read(&img);
        assert_eq!(header.name, "BF-K6");
        assert_eq!(header.rx_ranges, vec![(136_000_000, 174_000_000)]);
        assert!(header.tx_ranges.is_empty());
        assert_eq!(header.freq_band, 2);
        assert_eq!(header.variant(), ModelVariant::K6);
    }
}
