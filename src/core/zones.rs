//! # Zone consistency engine
//!
//! Keeps the channel validity bitmap, the ten zone tables and `zone_total`
//! consistent with each other.
//!
//! ## Rules
//!
//! - A channel exists when its bit in the validity bitmap is **clear**.
//! - Channel `n` belongs to zone `(n-1) / 64` at slot `(n-1) % 64` (its home).
//!   Zone slots store the 0-based id `n-1`; `0xFFFF` marks an empty slot.
//! - `chn_num` is one past the last occupied slot; everything after it is
//!   empty. Empty slots before it are gaps left by missing channels.
//! - `zone_total` is the 1-based index of the highest zone that holds a
//!   channel or carries a non-default name, and is never below 1.
//!
//! [`normalize`] restores all of this from the bitmap alone. The incremental
//! operations keep the tables tidy between normalizations. None of them fail;
//! requests that cannot be honoured return `false`.

use super::image::MemoryImage;
use super::layout::{
    zone_offset, CHANNEL_COUNT, CHANNEL_VALID, CHANNEL_VALID_WORDS, ZONE_CHN_NUM, ZONE_COUNT,
    ZONE_IDS, ZONE_NAME, ZONE_NAME_LEN, ZONE_SENTINEL, ZONE_SLOTS, ZONE_TOTAL,
};
use super::text::{decode_text, encode_text};
use tracing::{debug, info};

/// Channel validity bitmap. A set bit means the channel is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityBitmap {
    words: [u64; CHANNEL_VALID_WORDS],
}

impl Default for ValidityBitmap {
    /// No channels.
    fn default() -> Self {
        Self {
            words: [u64::MAX; CHANNEL_VALID_WORDS],
        }
    }
}

impl ValidityBitmap {
    pub fn read(image: &MemoryImage) -> Self {
        let mut words = [0u64; CHANNEL_VALID_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = image.u64_le(CHANNEL_VALID + i * 8);
        }
        Self { words }
    }

    pub fn write(&self, image: &mut MemoryImage) {
        for (i, word) in self.words.iter().enumerate() {
            image.set_u64_le(CHANNEL_VALID + i * 8, *word);
        }
    }

    fn locate(n: u16) -> Option<(usize, u64)> {
        if n == 0 || usize::from(n) > CHANNEL_COUNT {
            return None;
        }
        let id = usize::from(n - 1);
        Some((id / 64, 1u64 << (id % 64)))
    }

    /// Whether 1-based channel `n` exists. Out-of-range numbers never do.
    pub fn is_valid(&self, n: u16) -> bool {
        Self::locate(n).is_some_and(|(word, bit)| self.words[word] & bit == 0)
    }

    /// Returns `false` for an out-of-range channel number.
    pub fn set(&mut self, n: u16, valid: bool) -> bool {
        let Some((word, bit)) = Self::locate(n) else {
            return false;
        };
        if valid {
            self.words[word] &= !bit;
        } else {
            self.words[word] |= bit;
        }
        true
    }

    /// Valid channel numbers, ascending.
    pub fn valid_channels(&self) -> impl Iterator<Item = u16> + '_ {
        (1..=CHANNEL_COUNT as u16).filter(move |&n| self.is_valid(n))
    }

    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_zeros() as usize).sum()
    }
}

/// Zone that channel `n` lives in.
pub fn home_zone(n: u16) -> usize {
    usize::from(n.saturating_sub(1)) / ZONE_SLOTS
}

/// Slot of channel `n` inside its home zone.
pub fn home_slot(n: u16) -> usize {
    usize::from(n.saturating_sub(1)) % ZONE_SLOTS
}

/// Default name of zone `index` (0-based).
pub fn default_zone_name(index: usize) -> String {
    format!("Zone {}", index + 1)
}

/// Value copy of one zone record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub index: usize,
    /// Stored count; may be garbage in an erased image.
    pub chn_num: u8,
    /// 0-based channel ids or [`ZONE_SENTINEL`].
    pub slots: [u16; ZONE_SLOTS],
    pub name: String,
}

impl Zone {
    pub fn read(image: &MemoryImage, index: usize) -> Self {
        let base = zone_offset(index);
        let mut slots = [ZONE_SENTINEL; ZONE_SLOTS];
        for (i, slot) in slots.iter_mut().enumerate() {
            *slot = image.u16_be(base + ZONE_IDS + i * 2);
        }
        Self {
            index,
            chn_num: image.u8(base + ZONE_CHN_NUM),
            slots,
            name: decode_text(image.slice(base + ZONE_NAME, ZONE_NAME_LEN)),
        }
    }

    /// Write `chn_num` and the slots. The name is written by [`set_zone_name`].
    fn write_slots(&self, image: &mut MemoryImage) {
        let base = zone_offset(self.index);
        image.set_u8(base + ZONE_CHN_NUM, self.chn_num);
        for (i, slot) in self.slots.iter().enumerate() {
            image.set_u16_be(base + ZONE_IDS + i * 2, *slot);
        }
    }

    /// `chn_num` clamped to the slot count.
    pub fn len(&self) -> usize {
        usize::from(self.chn_num).min(ZONE_SLOTS)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 1-based channel numbers in slot order, gaps skipped.
    pub fn channels(&self) -> Vec<u16> {
        self.slots[..self.len()]
            .iter()
            .filter(|&&id| id != ZONE_SENTINEL)
            .map(|&id| id.wrapping_add(1))
            .collect()
    }

    fn position(&self, n: u16) -> Option<usize> {
        let id = n.checked_sub(1)?;
        self.slots[..self.len()].iter().position(|&s| s == id)
    }

    /// Drop trailing gaps so `chn_num` points past the last occupied slot.
    fn trim(&mut self) {
        let mut len = self.len();
        while len > 0 && self.slots[len - 1] == ZONE_SENTINEL {
            len -= 1;
        }
        self.slots[len..].fill(ZONE_SENTINEL);
        self.chn_num = len as u8;
    }

    fn has_custom_name(&self) -> bool {
        let name = self.name.trim();
        !name.is_empty() && name != default_zone_name(self.index)
    }
}

/// What [`normalize`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Valid channels placed into their home zone.
    pub added: usize,
    /// Entries dropped because the channel is invalid, duplicated or homed elsewhere.
    pub removed: usize,
    /// Entries kept but relocated to their home slot.
    pub moved: usize,
    /// Zones that received the default name.
    pub renamed: usize,
    pub zone_total: u8,
}

impl NormalizeReport {
    pub fn is_clean(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.moved == 0 && self.renamed == 0
    }
}

/// Rebuild every zone from the validity bitmap and recompute `zone_total`.
///
/// Idempotent: a second call reports no changes and leaves the image untouched.
pub fn normalize(image: &mut MemoryImage) -> NormalizeReport {
    let bitmap = ValidityBitmap::read(image);
    let mut report = NormalizeReport::default();
    let mut total = 1usize;

    for index in 0..ZONE_COUNT {
        let mut zone = Zone::read(image, index);

        let mut rebuilt = [ZONE_SENTINEL; ZONE_SLOTS];
        let mut len = 0usize;
        for (slot, entry) in rebuilt.iter_mut().enumerate() {
            let n = (index * ZONE_SLOTS + slot + 1) as u16;
            if bitmap.is_valid(n) {
                *entry = n - 1;
                len = slot + 1;
            }
        }

        let mut seen = [false; ZONE_SLOTS];
        for (slot, &id) in zone.slots[..zone.len()].iter().enumerate() {
            if id == ZONE_SENTINEL {
                continue;
            }
            let home = usize::from(id).checked_sub(index * ZONE_SLOTS);
            match home {
                Some(home) if home < ZONE_SLOTS && rebuilt[home] == id && !seen[home] => {
                    seen[home] = true;
                    if home != slot {
                        report.moved += 1;
                    }
                }
                _ => report.removed += 1,
            }
        }
        report.added += rebuilt[..len]
            .iter()
            .zip(seen.iter())
            .filter(|&(&id, &kept)| id != ZONE_SENTINEL && !kept)
            .count();

        if zone.slots != rebuilt || usize::from(zone.chn_num) != len {
            zone.slots = rebuilt;
            zone.chn_num = len as u8;
            zone.write_slots(image);
        }

        if len > 0 && zone.name.trim().is_empty() {
            zone.name = default_zone_name(index);
            set_zone_name(image, index, &zone.name);
            report.renamed += 1;
        }

        if len > 0 || zone.has_custom_name() {
            total = index + 1;
        }
    }

    report.zone_total = total as u8;
    image.set_u8(ZONE_TOTAL, report.zone_total);

    if report.is_clean() {
        debug!(zone_total = report.zone_total, "Zones already consistent");
    } else {
        info!(
            added = report.added,
            removed = report.removed,
            moved = report.moved,
            renamed = report.renamed,
            zone_total = report.zone_total,
            "Zones normalized"
        );
    }
    report
}

/// Mark channel `n` valid or absent. Touches exactly one bit.
pub fn set_channel_valid(image: &mut MemoryImage, n: u16, valid: bool) -> bool {
    let mut bitmap = ValidityBitmap::read(image);
    if !bitmap.set(n, valid) {
        return false;
    }
    bitmap.write(image);
    true
}

pub fn is_channel_valid(image: &MemoryImage, n: u16) -> bool {
    ValidityBitmap::read(image).is_valid(n)
}

/// Insert channel `n` into zone `z`.
///
/// In its home zone the channel goes to its home slot, filling a gap in place
/// or shifting later entries right. Elsewhere it is appended. Returns `false`
/// when `n` is not valid or the zone is full, `true` when it is already there.
pub fn add_channel_to_zone(image: &mut MemoryImage, z: usize, n: u16) -> bool {
    if z >= ZONE_COUNT || !is_channel_valid(image, n) {
        return false;
    }
    let mut zone = Zone::read(image, z);
    if zone.position(n).is_some() {
        return true;
    }
    let len = zone.len();
    let pos = if home_zone(n) == z { home_slot(n) } else { len };

    if pos >= len {
        if pos >= ZONE_SLOTS {
            return false;
        }
        zone.slots[len..pos].fill(ZONE_SENTINEL);
        zone.slots[pos] = n - 1;
        zone.chn_num = (pos + 1) as u8;
    } else if zone.slots[pos] == ZONE_SENTINEL {
        zone.slots[pos] = n - 1;
    } else {
        if len >= ZONE_SLOTS {
            return false;
        }
        zone.slots[pos..=len].rotate_right(1);
        zone.slots[pos] = n - 1;
        zone.chn_num = (len + 1) as u8;
    }
    zone.trim();
    zone.write_slots(image);

    let total = usize::from(image.u8(ZONE_TOTAL));
    let total = if (1..=ZONE_COUNT).contains(&total) { total } else { 1 };
    image.set_u8(ZONE_TOTAL, total.max(z + 1) as u8);

    debug!(zone = z, channel = n, slot = pos, "Channel added to zone");
    true
}

/// Remove channel `n` from zone `z`, shifting later entries left.
pub fn remove_channel_from_zone(image: &mut MemoryImage, z: usize, n: u16) -> bool {
    if z >= ZONE_COUNT {
        return false;
    }
    let mut zone = Zone::read(image, z);
    let Some(pos) = zone.position(n) else {
        return false;
    };
    let len = zone.len();
    zone.slots[pos..len].rotate_left(1);
    zone.slots[len - 1] = ZONE_SENTINEL;
    zone.chn_num = (len - 1) as u8;
    zone.trim();
    zone.write_slots(image);
    debug!(zone = z, channel = n, "Channel removed from zone");
    true
}

/// Remove every copy of channel `n` from every zone. Returns how many zones held it.
pub fn remove_channel_everywhere(image: &mut MemoryImage, n: u16) -> usize {
    (0..ZONE_COUNT)
        .filter(|&z| {
            let mut held = false;
            while remove_channel_from_zone(image, z, n) {
                held = true;
            }
            held
        })
        .count()
}

/// Move channel `n` to `new_pos` within the occupied part of zone `z`.
pub fn move_channel_in_zone(image: &mut MemoryImage, z: usize, n: u16, new_pos: usize) -> bool {
    if z >= ZONE_COUNT {
        return false;
    }
    let mut zone = Zone::read(image, z);
    let Some(pos) = zone.position(n) else {
        return false;
    };
    if new_pos >= zone.len() {
        return false;
    }
    if pos < new_pos {
        zone.slots[pos..=new_pos].rotate_left(1);
    } else {
        zone.slots[new_pos..=pos].rotate_right(1);
    }
    zone.write_slots(image);
    true
}

/// 1-based channel numbers listed in zone `z`.
pub fn zone_channels(image: &MemoryImage, z: usize) -> Vec<u16> {
    if z >= ZONE_COUNT {
        return Vec::new();
    }
    Zone::read(image, z).channels()
}

pub fn zone_names(image: &MemoryImage) -> Vec<String> {
    (0..ZONE_COUNT)
        .map(|z| decode_text(image.slice(zone_offset(z) + ZONE_NAME, ZONE_NAME_LEN)))
        .collect()
}

pub fn set_zone_name(image: &mut MemoryImage, z: usize, name: &str) {
    if z >= ZONE_COUNT {
        return;
    }
    let field = encode_text(name, ZONE_NAME_LEN);
    image
        .slice_mut(zone_offset(z) + ZONE_NAME, ZONE_NAME_LEN)
        .copy_from_slice(&field);
}

/// Stored `zone_total`, clamped to 1..=10.
pub fn active_zone_count(image: &MemoryImage) -> usize {
    usize::from(image.u8(ZONE_TOTAL)).clamp(1, ZONE_COUNT)
}
