//! Editable view over a downloaded memory image.

use crate::core::channel::{Channel, Record, RecordKind};
use crate::core::device::{DeviceHeader, ModelVariant};
use crate::core::image::MemoryImage;
use crate::core::layout::{channel_offset, vfo_offset, CHANNEL_COUNT, CHANNEL_LEN, VFO_COUNT};
use crate::core::zones::{self, NormalizeReport};
use crate::error::{CodeplugError, Result};
use std::path::Path;
use tracing::{debug, info};

/// A memory image and the model variant it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codeplug {
    image: MemoryImage,
    variant: ModelVariant,
}

pub(crate) fn check_channel(n: u16) -> Result<()> {
    if n == 0 || usize::from(n) > CHANNEL_COUNT {
        return Err(CodeplugError::OutOfRange {
            what: "channel number",
            value: i64::from(n),
        });
    }
    Ok(())
}

pub(crate) fn check_vfo(index: usize) -> Result<()> {
    if index >= VFO_COUNT {
        return Err(CodeplugError::OutOfRange {
            what: "VFO index",
            value: index as i64,
        });
    }
    Ok(())
}

impl Codeplug {
    pub fn new(image: MemoryImage, variant: ModelVariant) -> Self {
        Self { image, variant }
    }

    /// Take the variant from the image's own device header.
    pub fn from_image(image: MemoryImage) -> Self {
        let variant = DeviceHeader::read(&image).variant();
        Self::new(image, variant)
    }

    /// Load a raw 49,152-byte image file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let image = MemoryImage::load(path.as_ref())?;
        let codeplug = Self::from_image(image);
        info!(path = %path.as_ref().display(), variant = ?codeplug.variant, "Codeplug loaded");
        Ok(codeplug)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Codeplug saved");
        Ok(())
    }

    pub fn image(&self) -> &MemoryImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut MemoryImage {
        &mut self.image
    }

    pub fn into_image(self) -> MemoryImage {
        self.image
    }

    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    pub fn device(&self) -> DeviceHeader {
        DeviceHeader::read(&self.image)
    }

    pub(crate) fn record(&self, offset: usize) -> Record {
        let mut rec = [0u8; CHANNEL_LEN];
        rec.copy_from_slice(self.image.slice(offset, CHANNEL_LEN));
        rec
    }

    pub(crate) fn put_record(&mut self, offset: usize, rec: &Record) {
        self.image.slice_mut(offset, CHANNEL_LEN).copy_from_slice(rec);
    }

    pub fn is_channel_valid(&self, n: u16) -> bool {
        zones::is_channel_valid(&self.image, n)
    }

    /// Channel `n` (1-based), `None` when it is not marked valid.
    pub fn channel(&self, n: u16) -> Option<Channel> {
        if check_channel(n).is_err() || !self.is_channel_valid(n) {
            return None;
        }
        let rec = self.record(channel_offset(n));
        Some(Channel::from_record(&rec, RecordKind::Memory))
    }

    /// Every valid channel in number order.
    pub fn channels(&self) -> Vec<(u16, Channel)> {
        zones::ValidityBitmap::read(&self.image)
            .valid_channels()
            .filter_map(|n| self.channel(n).map(|ch| (n, ch)))
            .collect()
    }

    /// Store channel `n`, mark it valid and place it in its home zone.
    pub fn set_channel(&mut self, n: u16, channel: &Channel) -> Result<()> {
        check_channel(n)?;
        self.variant.check_band(channel.rx_freq)?;
        let offset = channel_offset(n);
        let rec = channel.to_record(&self.record(offset), RecordKind::Memory)?;
        self.put_record(offset, &rec);
        zones::set_channel_valid(&mut self.image, n, true);
        zones::add_channel_to_zone(&mut self.image, zones::home_zone(n), n);
        debug!(channel = n, name = %channel.name, rx = channel.rx_freq, "Channel stored");
        Ok(())
    }

    /// Mark `n` absent, drop it from every zone and zero its record.
    /// Returns whether it was valid before.
    pub fn delete_channel(&mut self, n: u16) -> Result<bool> {
        check_channel(n)?;
        let was_valid = self.is_channel_valid(n);
        zones::set_channel_valid(&mut self.image, n, false);
        let zones = zones::remove_channel_everywhere(&mut self.image, n);
        self.image.fill(channel_offset(n), CHANNEL_LEN, 0x00);
        debug!(channel = n, zones, "Channel deleted");
        Ok(was_valid)
    }

    pub fn vfo(&self, index: usize) -> Option<Channel> {
        check_vfo(index).ok()?;
        let rec = self.record(vfo_offset(index));
        Some(Channel::from_record(&rec, RecordKind::Vfo))
    }

    pub fn set_vfo(&mut self, index: usize, channel: &Channel) -> Result<()> {
        check_vfo(index)?;
        self.variant.check_band(channel.rx_freq)?;
        let offset = vfo_offset(index);
        let rec = channel.to_record(&self.record(offset), RecordKind::Vfo)?;
        self.put_record(offset, &rec);
        Ok(())
    }

    /// Restore zone consistency after a batch of edits.
    pub fn normalize(&mut self) -> NormalizeReport {
        zones::normalize(&mut self.image)
    }

    pub fn zone_channels(&self, z: usize) -> Vec<u16> {
        zones::zone_channels(&self.image, z)
    }

    pub fn zone_names(&self) -> Vec<String> {
        zones::zone_names(&self.image)
    }

    pub fn add_to_zone(&mut self, z: usize, n: u16) -> bool {
        zones::add_channel_to_zone(&mut self.image, z, n)
    }

    pub fn remove_from_zone(&mut self, z: usize, n: u16) -> bool {
        zones::remove_channel_from_zone(&mut self.image, z, n)
    }

    pub fn move_in_zone(&mut self, z: usize, n: u16, new_pos: usize) -> bool {
        zones::move_channel_in_zone(&mut self.image, z, n, new_pos)
    }
}
