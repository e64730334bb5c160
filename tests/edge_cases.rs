#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Boundary conditions of the memory image codec, exercised through the
//! `Codeplug` API the way an editor would hit them.

use radio_codeplug::core::channel::{Channel, Duplex, OffsetDirection, ToneMode};
use radio_codeplug::core::device::ModelVariant;
use radio_codeplug::core::fields::SettingValue;
use radio_codeplug::core::image::MemoryImage;
use radio_codeplug::core::layout::{channel_offset, IMAGE_SIZE};
use radio_codeplug::core::tone::{decode_tone, Tone};
use radio_codeplug::core::zones::{ValidityBitmap, Zone};
use radio_codeplug::error::CodeplugError;
use radio_codeplug::Codeplug;

fn blank(variant: ModelVariant) -> Codeplug {
    let mut image = MemoryImage::zeroed();
    ValidityBitmap::default().write(&mut image);
    Codeplug::new(image, variant)
}

fn stored(cp: &mut Codeplug, n: u16, ch: &Channel) -> Channel {
    cp.set_channel(n, ch).unwrap();
    cp.channel(n).expect("channel should exist")
}

// ============================================================================
// IMAGE
// ============================================================================

#[test]
fn test_image_size_must_match() {
    for len in [0, IMAGE_SIZE - 1, IMAGE_SIZE + 1] {
        match MemoryImage::from_bytes(vec![0; len]) {
            Err(CodeplugError::InvalidImageSize(got)) => assert_eq!(got, len),
            other => panic!("unexpected: {other:?}"),
        }
    }
    assert!(MemoryImage::from_bytes(vec![0; IMAGE_SIZE]).is_ok());
}

#[test]
fn test_diff_reports_changed_bytes() {
    let before = blank(ModelVariant::Standard);
    let mut after = before.clone();
    after
        .set_channel(1, &Channel::simplex("A", 446_000_000))
        .unwrap();

    let diff = before.image().diff(after.image());
    assert!(!diff.is_empty());
    assert!(diff
        .iter()
        .any(|&(offset, _, _)| (channel_offset(1)..channel_offset(2)).contains(&offset)));
}

// ============================================================================
// CHANNEL NUMBERS AND BANDS
// ============================================================================

#[test]
fn test_channel_number_bounds() {
    let mut cp = blank(ModelVariant::Standard);
    let ch = Channel::simplex("X", 446_000_000);
    for n in [0u16, 641, u16::MAX] {
        assert!(matches!(
            cp.set_channel(n, &ch),
            Err(CodeplugError::OutOfRange { .. })
        ));
        assert!(cp.channel(n).is_none());
    }
    assert!(cp.set_channel(640, &ch).is_ok());
    assert!(cp.set_channel(1, &ch).is_ok());
}

#[test]
fn test_band_edges_follow_variant() {
    let mut standard = blank(ModelVariant::Standard);
    let mut k6 = blank(ModelVariant::K6);
    let vhf_edge = Channel::simplex("Edge", 174_000_000);
    let airband = Channel::simplex("220", 223_500_000);

    assert!(standard.set_channel(1, &vhf_edge).is_ok());
    assert!(k6.set_channel(1, &vhf_edge).is_ok());
    assert!(standard.set_channel(2, &airband).is_ok());
    assert!(matches!(
        k6.set_channel(2, &airband),
        Err(CodeplugError::OutOfBand(223_500_000))
    ));
    assert!(!k6.is_channel_valid(2));
}

// ============================================================================
// FREQUENCIES AND DUPLEX
// ============================================================================

#[test]
fn test_frequency_rounds_to_ten_hz() {
    let mut cp = blank(ModelVariant::Standard);
    let ch = stored(&mut cp, 1, &Channel::simplex("R", 446_006_254));
    assert_eq!(ch.rx_freq, 446_006_250);
}

#[test]
fn test_tx_off_survives_storage() {
    let mut cp = blank(ModelVariant::Standard);
    let mut ch = Channel::simplex("RX only", 162_550_000);
    ch.set_duplex(Duplex::Off);
    let back = stored(&mut cp, 3, &ch);
    assert_eq!(back.tx_freq, 0);
    assert_eq!(back.duplex(), Duplex::Off);
}

#[test]
fn test_repeater_offset() {
    let mut cp = blank(ModelVariant::Standard);
    let mut ch = Channel::simplex("Repeater", 439_500_000);
    ch.set_duplex(Duplex::Minus(5_000_000));
    let back = stored(&mut cp, 4, &ch);
    assert_eq!(back.tx_freq, 434_500_000);
    assert_eq!(back.offset_dir, OffsetDirection::Minus);
    assert_eq!(back.duplex(), Duplex::Minus(5_000_000));
}

#[test]
fn test_cross_band_is_split() {
    let mut cp = blank(ModelVariant::Standard);
    let mut ch = Channel::simplex("Cross", 145_800_000);
    ch.set_duplex(Duplex::Split(435_000_000));
    let back = stored(&mut cp, 5, &ch);
    assert_eq!(back.duplex(), Duplex::Split(435_000_000));
}

#[test]
fn test_frequency_text_forms() {
    let mut cp = blank(ModelVariant::Standard);
    cp.set_channel(6, &Channel::simplex("T", 446_000_000))
        .unwrap();
    cp.set("channel.6.rx_freq", SettingValue::from("446.00625"))
        .unwrap();
    assert_eq!(
        cp.get("channel.6.rx_freq").unwrap(),
        SettingValue::Int(446_006_250)
    );
    assert!(cp
        .set("channel.6.rx_freq", SettingValue::from("446.0x"))
        .is_err());
}

// ============================================================================
// TONES
// ============================================================================

#[test]
fn test_nonstandard_dcs_snaps_on_decode() {
    // D024 is not a standard code; D023 and D025 are equally close
    assert_eq!(
        decode_tone(0x80, 0x24),
        Tone::Dcs {
            code: 23,
            inverted: false
        }
    );
    assert_eq!(
        decode_tone(0xC0, 0x24),
        Tone::Dcs {
            code: 23,
            inverted: true
        }
    );
}

#[test]
fn test_nonstandard_dcs_rejected_on_encode() {
    let mut cp = blank(ModelVariant::Standard);
    let mut ch = Channel::simplex("DCS", 446_000_000);
    ch.tx_tone = Tone::Dcs {
        code: 24,
        inverted: false,
    };
    assert!(matches!(
        cp.set_channel(1, &ch),
        Err(CodeplugError::InvalidValue(_))
    ));
    assert!(!cp.is_channel_valid(1));
}

#[test]
fn test_tone_modes() {
    let mut cp = blank(ModelVariant::Standard);
    cp.set_channel(1, &Channel::simplex("T", 446_000_000))
        .unwrap();
    cp.set("channel.1.tx_tone", SettingValue::from("88.5")).unwrap();
    assert_eq!(cp.channel(1).unwrap().tone_mode(), ToneMode::Tone);
    cp.set("channel.1.rx_tone", SettingValue::from("88.5Hz")).unwrap();
    assert_eq!(cp.channel(1).unwrap().tone_mode(), ToneMode::Tsql);
    cp.set("channel.1.rx_tone", SettingValue::from("D023I")).unwrap();
    assert_eq!(cp.channel(1).unwrap().tone_mode(), ToneMode::Cross);
    cp.set("channel.1.tx_tone", SettingValue::from("D023I")).unwrap();
    assert_eq!(cp.channel(1).unwrap().tone_mode(), ToneMode::Dcs);
    cp.set("channel.1.rx_tone", SettingValue::from("off")).unwrap();
    assert_eq!(
        cp.get("channel.1.rx_tone").unwrap(),
        SettingValue::Tone(Tone::None)
    );
}

#[test]
fn test_ctcss_above_bcd_range() {
    let mut cp = blank(ModelVariant::Standard);
    cp.set_channel(1, &Channel::simplex("T", 446_000_000))
        .unwrap();
    let before = cp.image().clone();
    assert!(cp
        .set("channel.1.tx_tone", SettingValue::Tone(Tone::Ctcss(8000)))
        .is_err());
    assert!(cp.image() == &before);
}

// ============================================================================
// NAMES
// ============================================================================

#[test]
fn test_long_name_truncated() {
    let mut cp = blank(ModelVariant::Standard);
    let ch = stored(
        &mut cp,
        1,
        &Channel::simplex("ABCDEFGHIJKLMNOPQRSTUVWXYZ", 446_000_000),
    );
    assert_eq!(ch.name, "ABCDEFGHIJKLMNOP");
}

#[test]
fn test_chinese_name() {
    let mut cp = blank(ModelVariant::Standard);
    let ch = stored(&mut cp, 1, &Channel::simplex("中继台", 446_000_000));
    assert_eq!(ch.name, "中继台");
}

#[test]
fn test_wide_name_never_splits_character() {
    let mut cp = blank(ModelVariant::Standard);
    // nine two-byte characters, only eight fit
    let ch = stored(&mut cp, 1, &Channel::simplex("一二三四五六七八九", 446_000_000));
    assert_eq!(ch.name, "一二三四五六七八");
}

#[test]
fn test_unmappable_name_falls_back() {
    let mut cp = blank(ModelVariant::Standard);
    let ch = stored(&mut cp, 1, &Channel::simplex("Net😀", 446_000_000));
    assert_eq!(ch.name, "Net?");
}

// ============================================================================
// ERASED CONTENT
// ============================================================================

#[test]
fn test_erased_image_has_no_channels() {
    let cp = Codeplug::new(MemoryImage::erased(), ModelVariant::Standard);
    assert!(cp.channels().is_empty());
    assert!(cp.channel(1).is_none());
    assert_eq!(
        cp.get("channel.1.valid").unwrap(),
        SettingValue::Bool(false)
    );
}

#[test]
fn test_oversized_frequencies_rejected_by_path() {
    let mut cp = blank(ModelVariant::Standard);
    cp.set_channel(1, &Channel::simplex("T", 446_000_000))
        .unwrap();
    let before = cp.image().clone();
    for (path, text) in [
        ("channel.1.tx_freq", "18446744073709551615"),
        ("channel.1.tx_freq", "99999999999999.5"),
        ("scan.range.0.upper", "99999999999999.5"),
        ("scan.range.0.lower", "18446744073709551615"),
    ] {
        assert!(cp.set(path, SettingValue::from(text)).is_err(), "{path} = {text}");
    }
    assert!(cp.image() == &before);
}

#[test]
fn test_set_channel_on_erased_image_keeps_zone_count_sane() {
    let mut cp = Codeplug::new(MemoryImage::erased(), ModelVariant::Standard);
    cp.set_channel(3, &Channel::simplex("Three", 446_000_000))
        .unwrap();
    let zone = Zone::read(cp.image(), 0);
    assert_eq!(zone.chn_num, 3);
    assert_eq!(zone.channels(), vec![3]);
}
