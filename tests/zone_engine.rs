//! Zone bookkeeping through the `Codeplug` API.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use radio_codeplug::core::channel::Channel;
use radio_codeplug::core::device::ModelVariant;
use radio_codeplug::core::image::MemoryImage;
use radio_codeplug::core::layout::{
    zone_offset, ZONE_COUNT, ZONE_IDS, ZONE_SENTINEL, ZONE_SLOTS, ZONE_TOTAL,
};
use radio_codeplug::core::zones::{
    default_zone_name, home_slot, home_zone, set_channel_valid, set_zone_name, ValidityBitmap,
    Zone,
};
use radio_codeplug::Codeplug;

fn blank() -> Codeplug {
    let mut image = MemoryImage::zeroed();
    ValidityBitmap::default().write(&mut image);
    for z in 0..ZONE_COUNT {
        image.fill(zone_offset(z) + ZONE_IDS, ZONE_SLOTS * 2, 0xFF);
    }
    Codeplug::new(image, ModelVariant::Standard)
}

fn simplex(n: u16) -> Channel {
    Channel::simplex(&format!("CH{n}"), 446_000_000 + u64::from(n) * 12_500)
}

/// Every valid channel sits at its home slot and nowhere else, tails are
/// sentinel-filled, and `zone_total` covers the highest used zone.
fn assert_consistent(image: &MemoryImage) {
    let bitmap = ValidityBitmap::read(image);
    let zones: Vec<Zone> = (0..ZONE_COUNT).map(|z| Zone::read(image, z)).collect();

    for n in bitmap.valid_channels() {
        let home = &zones[home_zone(n)];
        assert_eq!(home.slots[home_slot(n)], n - 1, "channel {n} not at home");
        let appearances: usize = zones
            .iter()
            .map(|z| z.slots.iter().filter(|&&id| id == n - 1).count())
            .sum();
        assert_eq!(appearances, 1, "channel {n} listed {appearances} times");
    }

    let mut highest = 1;
    for zone in &zones {
        let len = usize::from(zone.chn_num);
        assert!(len <= ZONE_SLOTS);
        assert!(zone.slots[len..].iter().all(|&s| s == ZONE_SENTINEL));
        if len > 0 {
            assert_ne!(zone.slots[len - 1], ZONE_SENTINEL, "zone {} has a trailing gap", zone.index);
        }
        for &id in &zone.slots[..len] {
            assert!(id == ZONE_SENTINEL || bitmap.is_valid(id + 1));
        }
        let named = !zone.name.trim().is_empty() && zone.name != default_zone_name(zone.index);
        if len > 0 || named {
            highest = zone.index + 1;
        }
    }
    assert_eq!(usize::from(image.u8(ZONE_TOTAL)), highest);
}

#[test]
fn test_fresh_channels_land_home() {
    let mut cp = blank();
    for n in [1, 2, 64, 65, 300, 640] {
        cp.set_channel(n, &simplex(n)).unwrap();
    }
    cp.normalize();
    assert_consistent(cp.image());
    assert_eq!(cp.zone_channels(0), vec![1, 2, 64]);
    assert_eq!(cp.zone_channels(1), vec![65]);
    assert_eq!(cp.zone_channels(9), vec![640]);
}

#[test]
fn test_bitmap_edits_repaired_by_normalize() {
    let mut cp = blank();
    for n in [3, 4, 5] {
        cp.set_channel(n, &simplex(n)).unwrap();
    }
    // bitmap flipped behind the engine's back
    set_channel_valid(cp.image_mut(), 4, false);
    set_channel_valid(cp.image_mut(), 200, true);

    let report = cp.normalize();
    assert_eq!(report.removed, 1);
    assert_eq!(report.added, 1);
    assert_consistent(cp.image());
    assert_eq!(cp.zone_channels(0), vec![3, 5]);
    assert_eq!(cp.zone_channels(3), vec![200]);
    assert_eq!(cp.image().u8(ZONE_TOTAL), 4);
}

#[test]
fn test_manual_zone_edits_undone_by_normalize() {
    let mut cp = blank();
    for n in [1, 2, 3, 70] {
        cp.set_channel(n, &simplex(n)).unwrap();
    }
    assert!(cp.move_in_zone(0, 3, 0));
    assert_eq!(cp.zone_channels(0), vec![3, 1, 2]);
    assert!(cp.add_to_zone(5, 70));
    assert_eq!(cp.zone_channels(5), vec![70]);
    assert!(cp.remove_from_zone(0, 2));
    assert_eq!(cp.zone_channels(0), vec![3, 1]);

    let report = cp.normalize();
    assert_eq!(report.removed, 1, "foreign copy of 70");
    assert_eq!(report.added, 1, "channel 2 back home");
    assert!(report.moved >= 2);
    assert_consistent(cp.image());
    assert_eq!(cp.zone_channels(0), vec![1, 2, 3]);
    assert!(cp.zone_channels(5).is_empty());

    assert!(cp.normalize().is_clean());
}

#[test]
fn test_delete_clears_foreign_copies() {
    let mut cp = blank();
    cp.set_channel(10, &simplex(10)).unwrap();
    assert!(cp.add_to_zone(7, 10));
    assert!(cp.delete_channel(10).unwrap());

    assert!(!cp.is_channel_valid(10));
    assert!(cp.zone_channels(0).is_empty());
    assert!(cp.zone_channels(7).is_empty());
    assert!(!cp.delete_channel(10).unwrap());

    cp.normalize();
    assert_consistent(cp.image());
    assert_eq!(cp.image().u8(ZONE_TOTAL), 1);
}

#[test]
fn test_custom_name_keeps_zone_active() {
    let mut cp = blank();
    set_zone_name(cp.image_mut(), 6, "Marine");
    cp.normalize();
    assert_consistent(cp.image());
    assert_eq!(cp.image().u8(ZONE_TOTAL), 7);
    assert_eq!(cp.zone_names()[6], "Marine");
}

#[test]
fn test_erased_image_normalizes() {
    let mut cp = Codeplug::new(MemoryImage::erased(), ModelVariant::Standard);
    let report = cp.normalize();
    assert_eq!(report.added, 0);
    assert_consistent(cp.image());
    assert!(cp.channels().is_empty());
}

#[test]
fn test_full_image_fills_every_zone() {
    let mut cp = blank();
    for n in 1..=640u16 {
        set_channel_valid(cp.image_mut(), n, true);
    }
    let report = cp.normalize();
    assert_eq!(report.added, 640);
    assert_eq!(report.zone_total, 10);
    assert_consistent(cp.image());
    assert!((0..ZONE_COUNT).all(|z| Zone::read(cp.image(), z).chn_num == 64));
}
