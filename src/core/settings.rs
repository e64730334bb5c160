//! Radio-wide settings block at `0x7980`.

use super::bitfield::BitField;
use super::fields::{find, Field, SettingValue, DIGITS};
use super::image::MemoryImage;
use super::layout::SETTINGS;
use crate::error::{CodeplugError, Result};

pub const POWER_ON_PASSWORD: usize = 64;
pub const PROGRAM_PASSWORD: usize = 72;
pub const PASSWORD_LEN: usize = 8;
pub const RADIO_NAME: usize = 80;
pub const BLUETOOTH_NAME: usize = 96;
pub const PAIR_NAME: usize = 112;

/// Every named field of the block, offsets relative to [`SETTINGS`].
pub const SETTINGS_FIELDS: &[Field] = &[
    Field::range("ch_a_mode", 0, 0, 1),
    Field::range("ch_b_mode", 1, 0, 1),
    Field::word("ch_a_num", 2, 639),
    Field::word("ch_b_num", 4, 639),
    Field::range("ch_a_zone", 6, 0, 9),
    Field::range("ch_b_zone", 7, 0, 9),
    Field::range("backlight_time", 8, 0, 11),
    Field::byte("backlight_level", 9),
    Field::bits_max("display_a", BitField::new(10, 7, 4), 3),
    Field::bits_max("display_b", BitField::new(10, 3, 4), 3),
    Field::range("dual_watch", 11, 0, 2),
    Field::range("main_band", 12, 0, 1),
    Field::range("squelch_level", 13, 0, 9),
    Field::range("vox_level", 14, 0, 9),
    Field::byte("vox_delay", 15),
    Field::range("power_save", 16, 0, 3),
    Field::range("power_save_delay", 17, 0, 4),
    Field::byte("lone_work_time", 18),
    Field::byte("lone_work_response", 19),
    Field::range("auto_power_off", 20, 0, 5),
    Field::byte("tot", 21),
    Field::range("tot_alert", 22, 0, 10),
    Field::range("gps_zone", 24, 0, 24),
    Field::range("tone_burst", 26, 0, 3),
    Field::range("noaa_channel", 30, 0, 9),
    Field::byte("gps_id", 31),
    Field::flag("vox", 32, 7),
    Field::flag("aprs", 32, 6),
    Field::flag("lone_work", 32, 5),
    Field::flag("fall_alarm", 32, 4),
    Field::bits_max("voice", BitField::new(32, 3, 2), 2),
    Field::bits_max("busy_lock", BitField::new(32, 1, 2), 2),
    Field::flag("key_lock", 33, 7),
    Field::flag("auto_key_lock", 33, 6),
    Field::flag("beep", 34, 7),
    Field::bits("end_tone", BitField::new(34, 6, 2)),
    Field::flag("gps", 35, 7),
    Field::bits("gps_mode", BitField::new(35, 6, 2)),
    Field::flag("gps_share", 35, 4),
    Field::flag("gps_request", 35, 3),
    Field::flag("bluetooth", 36, 7),
    Field::bits("bluetooth_pair", BitField::new(36, 6, 2)),
    Field::flag("bluetooth_app", 36, 4),
    Field::flag("record", 37, 7),
    Field::bits("record_mode", BitField::new(37, 6, 2)),
    Field::flag("engineering", 37, 4),
    Field::flag("weather", 37, 3),
    Field::flag("language", 37, 2),
    Field::bits("power_on_display", BitField::new(37, 1, 2)),
    Field::bits_max("tail_tone", BitField::new(38, 7, 3), 4),
    Field::flag("noaa", 38, 4),
    Field::flag("display_reverse", 38, 3),
    Field::flag("fm_interrupt", 38, 2),
    Field::flag("noise_cancel", 38, 1),
    Field::flag("enhance", 38, 0),
    Field::byte("bluetooth_hold", 40),
    Field::byte("bluetooth_rx_delay", 41),
    Field::byte("bluetooth_mic_gain", 42),
    Field::byte("bluetooth_speaker", 43),
    Field::ascii("bluetooth_pin", 44, 4),
    Field::range("pf1_short", 48, 0, 15),
    Field::range("pf2_short", 49, 0, 15),
    Field::range("pf1_long", 50, 0, 15),
    Field::range("pf2_long", 51, 0, 15),
    Field::dialled("power_on_password", POWER_ON_PASSWORD, PASSWORD_LEN, DIGITS),
    Field::dialled("program_password", PROGRAM_PASSWORD, PASSWORD_LEN, DIGITS),
    Field::text("radio_name", RADIO_NAME, 16),
    Field::text("bluetooth_name", BLUETOOTH_NAME, 16),
    Field::text("pair_name", PAIR_NAME, 16),
];

/// Read `settings.<name>`.
pub fn get_setting(image: &MemoryImage, name: &str) -> Result<SettingValue> {
    let field = find(SETTINGS_FIELDS, name)
        .ok_or_else(|| CodeplugError::UnknownSetting(format!("settings.{name}")))?;
    Ok(field.read(image, SETTINGS))
}

/// Write `settings.<name>`. The image is unchanged on error.
pub fn set_setting(image: &mut MemoryImage, name: &str, value: &SettingValue) -> Result<()> {
    let field = find(SETTINGS_FIELDS, name)
        .ok_or_else(|| CodeplugError::UnknownSetting(format!("settings.{name}")))?;
    field.write(image, SETTINGS, value)
}

/// The stored programming password, `None` when unset.
pub fn program_password(image: &MemoryImage) -> Option<String> {
    match get_setting(image, "program_password") {
        Ok(SettingValue::Text(pw)) if !pw.is_empty() => Some(pw),
        _ => None,
    }
}
