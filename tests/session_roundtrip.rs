//! Full download/upload against the in-process radio emulator.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::{fast_config, RadioEmulator};
use radio_codeplug::core::channel::Channel;
use radio_codeplug::core::device::ModelVariant;
use radio_codeplug::core::fields::SettingValue;
use radio_codeplug::core::layout::{IMAGE_SIZE, PAGE_COUNT};
use radio_codeplug::core::image::MemoryImage;
use radio_codeplug::core::zones::{home_slot, ValidityBitmap, Zone};
use radio_codeplug::error::CodeplugError;
use radio_codeplug::protocol::{Direction, NoProgress, Progress, Session};
use radio_codeplug::transport::Transport;
use radio_codeplug::utils::cipher::SeedPolicy;
use radio_codeplug::Radio;

#[test]
fn test_download_matches_radio_image() {
    let emulator = RadioEmulator::patterned("5RH-PRO");
    let expected = emulator.image.clone();
    let mut radio = Radio::new(emulator, fast_config(SeedPolicy::Random));

    let mut progress = Vec::new();
    let codeplug = radio
        .download(&mut |p: &Progress| progress.push(*p))
        .expect("download should succeed");

    assert_eq!(codeplug.image(), &expected);
    assert_eq!(codeplug.variant(), ModelVariant::Standard);
    assert_eq!(progress.len(), PAGE_COUNT);
    assert!(progress.iter().all(|p| p.direction == Direction::Download));
    assert_eq!(progress.last().unwrap().bytes_done, IMAGE_SIZE);

    let device = radio.device().expect("device info recorded");
    assert_eq!(device.model, "5RH-PRO");
    assert!(radio.transport().finalized);
    assert_eq!(radio.transport().pages_served, PAGE_COUNT);
}

#[test]
fn test_k6_detected_from_info() {
    let emulator = RadioEmulator::patterned("BF-K6");
    let mut radio = Radio::new(emulator, fast_config(SeedPolicy::Fixed(0)));
    let codeplug = radio.download(&mut NoProgress).unwrap();
    assert_eq!(codeplug.variant(), ModelVariant::K6);
    assert!(radio.device().unwrap().is_k6());
}

#[test]
fn test_edit_and_upload() {
    let mut blank = MemoryImage::zeroed();
    ValidityBitmap::default().write(&mut blank);
    let emulator = RadioEmulator::new(blank, "5RH-PRO");
    let mut radio = Radio::new(emulator, fast_config(SeedPolicy::Fixed(0x5C)));
    let mut codeplug = radio.download(&mut NoProgress).unwrap();

    codeplug
        .set_channel(130, &Channel::simplex("Simplex", 145_500_000))
        .unwrap();
    codeplug
        .set("settings.radio_name", SettingValue::from("BH4ABC"))
        .unwrap();
    codeplug.set("channel.7.valid", SettingValue::Bool(true)).unwrap();

    let report = radio.upload(&mut codeplug, &mut NoProgress).unwrap();
    assert_eq!(report.added, 1, "channel 7 was only marked valid");

    let emulator = radio.into_inner();
    assert!(emulator.finalized);
    assert_eq!(emulator.pages_written, PAGE_COUNT);
    assert_eq!(&emulator.image, codeplug.image());

    let zone = Zone::read(&emulator.image, 2);
    assert_eq!(zone.slots[home_slot(130)], 129);
    assert_eq!(Zone::read(&emulator.image, 0).channels(), vec![7]);
    assert_eq!(
        codeplug.get("settings.radio_name").unwrap(),
        SettingValue::from("BH4ABC")
    );
}

#[test]
fn test_password_protected_radio() {
    let mut emulator = RadioEmulator::patterned("5RH-PRO");
    emulator.password = Some("2580".into());

    let mut config = fast_config(SeedPolicy::Fixed(0x11));
    config.password = Some("1111".into());
    let mut session = Session::new(emulator, config.clone());
    assert!(matches!(
        session.download(&mut NoProgress),
        Err(CodeplugError::WrongPassword)
    ));

    let mut emulator = session.into_inner();
    emulator.password = Some("2580".into());
    config.password = Some("2580".into());
    let mut session = Session::new(emulator, config);
    assert!(session.download(&mut NoProgress).is_ok());
}

#[test]
fn test_escalates_to_listening_baud() {
    let mut emulator = RadioEmulator::patterned("5RH-PRO");
    emulator.listen_baud = 115_200;
    let mut radio = Radio::new(emulator, fast_config(SeedPolicy::Fixed(0)));
    radio.download(&mut NoProgress).expect("download after escalation");
    assert_eq!(radio.transport().baud_rate(), 115_200);
}

#[test]
fn test_silent_radio() {
    let mut emulator = RadioEmulator::patterned("5RH-PRO");
    emulator.listen_baud = 9_600;
    let mut radio = Radio::new(emulator, fast_config(SeedPolicy::Fixed(0)));
    assert!(matches!(
        radio.download(&mut NoProgress),
        Err(CodeplugError::NoResponse)
    ));
    assert!(radio.device().is_none());
}

#[test]
fn test_short_pages_are_retried() {
    let mut emulator = RadioEmulator::patterned("5RH-PRO");
    emulator.short_pages = 3;
    let expected = emulator.image.clone();
    let mut radio = Radio::new(emulator, fast_config(SeedPolicy::Fixed(0x42)));
    let codeplug = radio.download(&mut NoProgress).unwrap();
    assert_eq!(codeplug.image(), &expected);
}

#[test]
fn test_too_many_short_pages_fail() {
    let mut emulator = RadioEmulator::patterned("5RH-PRO");
    emulator.short_pages = 4;
    let mut radio = Radio::new(emulator, fast_config(SeedPolicy::Fixed(0x42)));
    match radio.download(&mut NoProgress) {
        Err(CodeplugError::TransferFailed { address, .. }) => assert_eq!(address, 0),
        other => panic!("expected TransferFailed, got {other:?}"),
    }
    assert!(!radio.transport().finalized);
}

#[test]
fn test_upload_nack_stops_transfer() {
    let mut emulator = RadioEmulator::patterned("5RH-PRO");
    emulator.nack_page = Some(5);
    let mut radio = Radio::new(emulator, fast_config(SeedPolicy::Fixed(0x09)));
    let mut codeplug = radio.download(&mut NoProgress).unwrap();

    match radio.upload(&mut codeplug, &mut NoProgress) {
        Err(CodeplugError::TransferFailed { address, .. }) => assert_eq!(address, 5 * 4096),
        other => panic!("expected TransferFailed, got {other:?}"),
    }
    assert_eq!(radio.transport().pages_written, 5);
}
