//! Dotted-path access to every editable value in a [`Codeplug`].
//!
//! | Path | Notes |
//! |---|---|
//! | `channel.<n>.<field>` | `n` is 1-based; also `valid` and `scan_add` |
//! | `vfo.<0\|1>.<field>` | channel fields without `valid`/`scan_add` |
//! | `zone.<z>.name`, `zone.<z>.channels`, `zone.total` | `channels` and `total` are read-only |
//! | `settings.<field>` | settings block, passwords and names |
//! | `scan.<field>`, `scan.range.<i>.upper\|lower` | |
//! | `dtmf.<field>`, `dtmf.code.<i>` | an empty code frees the entry |
//! | `twotone.<i>.freq1\|freq2\|name` | |
//! | `aprs.<field>` | |
//! | `gps.<i>.id\|name\|valid` | |
//! | `device.<field>` | read-only |
//!
//! Tables other than channels are indexed from 0. A failed `set` leaves the
//! image untouched.

use super::codeplug::{check_channel, check_vfo, Codeplug};
use crate::core::channel::{Bandwidth, Channel, OffsetDirection, PowerLevel, RecordKind};
use crate::core::device::DEVICE_FIELDS;
use crate::core::fields::{find, Field, SettingValue};
use crate::core::layout::{
    channel_offset, vfo_offset, APRS, DEVICE_INFO, DTMF_CODE_COUNT, DTMF_SYS, GPS_BOOK_COUNT,
    SCAN_DATA, SCAN_RANGE_COUNT, TWO_TONE_COUNT, ZONE_COUNT,
};
use crate::core::location::{
    gps_entry_offset, gps_entry_valid, set_gps_entry_valid, APRS_FIELDS, GPS_FIELDS,
};
use crate::core::scan::{range_offset, scan_add, set_scan_add, RANGE_FIELDS, SCAN_FIELDS};
use crate::core::settings::{get_setting, set_setting};
use crate::core::signaling::{
    dtmf_code, set_dtmf_code, two_tone_offset, DTMF_FIELDS, TWO_TONE_FIELDS,
};
use crate::core::zones;
use crate::error::{constants, CodeplugError, Result};
use tracing::debug;

/// Field names accepted after `channel.<n>.` and `vfo.<i>.`.
pub const CHANNEL_FIELDS: &[&str] = &[
    "name",
    "rx_freq",
    "tx_freq",
    "rx_tone",
    "tx_tone",
    "power",
    "bandwidth",
    "offset_dir",
    "freq_invert",
    "talkaround",
    "busy_lock",
    "tx_disable",
    "scramble",
    "compand",
    "cepin_dcs",
    "cepin_24bit",
    "jump_freq",
    "dtmf_ptt",
    "five_tone_ptt",
    "squelch_type",
    "signal_type",
    "freq_step",
    "dtmf_idx",
    "twotone_idx",
    "fivetone_idx",
    "mdc_idx",
    "scan_list",
    "emerg_list",
];

fn unknown(path: &str) -> CodeplugError {
    CodeplugError::UnknownSetting(path.to_string())
}

fn read_only(path: &str) -> CodeplugError {
    CodeplugError::InvalidValue(format!("{}: {path}", constants::ERR_READ_ONLY))
}

/// Parse a table index and check it against `count`.
fn index(path: &str, text: &str, what: &'static str, count: usize) -> Result<usize> {
    let i: usize = text.parse().map_err(|_| unknown(path))?;
    if i >= count {
        return Err(CodeplugError::OutOfRange {
            what,
            value: i as i64,
        });
    }
    Ok(i)
}

fn channel_number(path: &str, text: &str) -> Result<u16> {
    let n: u16 = text.parse().map_err(|_| unknown(path))?;
    check_channel(n)?;
    Ok(n)
}

fn field<'a>(table: &'a [Field], path: &str, name: &str) -> Result<&'a Field> {
    find(table, name).ok_or_else(|| unknown(path))
}

fn small_int(value: &SettingValue, what: &'static str) -> Result<u8> {
    let v = value.as_int()?;
    u8::try_from(v).map_err(|_| CodeplugError::OutOfRange { what, value: v })
}

fn power_value(value: &SettingValue) -> Result<PowerLevel> {
    match value {
        SettingValue::Text(s) => match s.to_ascii_lowercase().as_str() {
            "low" => Ok(PowerLevel::Low),
            "medium" | "mid" => Ok(PowerLevel::Medium),
            "high" => Ok(PowerLevel::High),
            _ => Err(CodeplugError::InvalidValue(format!("Unknown power level: {s}"))),
        },
        _ => PowerLevel::try_from(small_int(value, "power level")?),
    }
}

fn bandwidth_value(value: &SettingValue) -> Result<Bandwidth> {
    match value {
        SettingValue::Text(s) => match s.to_ascii_lowercase().as_str() {
            "narrow" | "nfm" => Ok(Bandwidth::Narrow),
            "wide" | "fm" => Ok(Bandwidth::Wide),
            _ => Err(CodeplugError::InvalidValue(format!("Unknown bandwidth: {s}"))),
        },
        _ => Bandwidth::try_from(small_int(value, "bandwidth")?),
    }
}

fn offset_value(value: &SettingValue) -> Result<OffsetDirection> {
    match value {
        SettingValue::Text(s) => match s.trim() {
            "" | "none" => Ok(OffsetDirection::None),
            "+" | "plus" => Ok(OffsetDirection::Plus),
            "-" | "minus" => Ok(OffsetDirection::Minus),
            _ => Err(CodeplugError::InvalidValue(format!("Unknown offset direction: {s}"))),
        },
        _ => OffsetDirection::try_from(small_int(value, "offset direction")?),
    }
}

fn get_channel_field(ch: &Channel, name: &str) -> Option<SettingValue> {
    let int = |v: u8| SettingValue::Int(i64::from(v));
    let value = match name {
        "name" => SettingValue::Text(ch.name.clone()),
        "rx_freq" => SettingValue::Int(ch.rx_freq as i64),
        "tx_freq" => SettingValue::Int(ch.tx_freq as i64),
        "rx_tone" => SettingValue::Tone(ch.rx_tone),
        "tx_tone" => SettingValue::Tone(ch.tx_tone),
        "power" => int(ch.power as u8),
        "bandwidth" => int(ch.bandwidth as u8),
        "offset_dir" => int(ch.offset_dir as u8),
        "freq_invert" => SettingValue::Bool(ch.freq_invert),
        "talkaround" => SettingValue::Bool(ch.talkaround),
        "busy_lock" => int(ch.busy_lock),
        "tx_disable" => SettingValue::Bool(ch.tx_disable),
        "scramble" => SettingValue::Bool(ch.scramble),
        "compand" => SettingValue::Bool(ch.compand),
        "cepin_dcs" => SettingValue::Bool(ch.cepin_dcs),
        "cepin_24bit" => SettingValue::Bool(ch.cepin_24bit),
        "jump_freq" => int(ch.jump_freq),
        "dtmf_ptt" => int(ch.dtmf_ptt),
        "five_tone_ptt" => int(ch.five_tone_ptt),
        "squelch_type" => int(ch.squelch_type),
        "signal_type" => int(ch.signal_type),
        "freq_step" => int(ch.freq_step),
        "dtmf_idx" => int(ch.dtmf_idx),
        "twotone_idx" => int(ch.twotone_idx),
        "fivetone_idx" => int(ch.fivetone_idx),
        "mdc_idx" => int(ch.mdc_idx),
        "scan_list" => int(ch.scan_list),
        "emerg_list" => int(ch.emerg_list),
        _ => return None,
    };
    Some(value)
}

/// Apply one field to a decoded channel. Range checks happen when it is encoded.
fn set_channel_field(ch: &mut Channel, name: &str, value: &SettingValue) -> Result<()> {
    match name {
        "name" => ch.name = value.as_text()?.to_string(),
        "rx_freq" => ch.rx_freq = value.as_freq()?,
        "tx_freq" => ch.tx_freq = value.as_freq()?,
        "rx_tone" => ch.rx_tone = value.as_tone()?,
        "tx_tone" => ch.tx_tone = value.as_tone()?,
        "power" => ch.power = power_value(value)?,
        "bandwidth" => ch.bandwidth = bandwidth_value(value)?,
        "offset_dir" => ch.offset_dir = offset_value(value)?,
        "freq_invert" => ch.freq_invert = value.as_bool()?,
        "talkaround" => ch.talkaround = value.as_bool()?,
        "busy_lock" => ch.busy_lock = small_int(value, "busy lock")?,
        "tx_disable" => ch.tx_disable = value.as_bool()?,
        "scramble" => ch.scramble = value.as_bool()?,
        "compand" => ch.compand = value.as_bool()?,
        "cepin_dcs" => ch.cepin_dcs = value.as_bool()?,
        "cepin_24bit" => ch.cepin_24bit = value.as_bool()?,
        "jump_freq" => ch.jump_freq = small_int(value, "jump frequency")?,
        "dtmf_ptt" => ch.dtmf_ptt = small_int(value, "DTMF PTT-ID")?,
        "five_tone_ptt" => ch.five_tone_ptt = small_int(value, "five-tone PTT-ID")?,
        "squelch_type" => ch.squelch_type = small_int(value, "squelch type")?,
        "signal_type" => ch.signal_type = small_int(value, "signal type")?,
        "freq_step" => ch.freq_step = small_int(value, "frequency step")?,
        "dtmf_idx" => ch.dtmf_idx = small_int(value, "DTMF index")?,
        "twotone_idx" => ch.twotone_idx = small_int(value, "two-tone index")?,
        "fivetone_idx" => ch.fivetone_idx = small_int(value, "five-tone index")?,
        "mdc_idx" => ch.mdc_idx = small_int(value, "MDC index")?,
        "scan_list" => ch.scan_list = small_int(value, "scan list")?,
        "emerg_list" => ch.emerg_list = small_int(value, "emergency system")?,
        _ => return Err(unknown(name)),
    }
    Ok(())
}

impl Codeplug {
    /// Read the value at `path`.
    pub fn get(&self, path: &str) -> Result<SettingValue> {
        let parts: Vec<&str> = path.split('.').collect();
        let image = self.image();
        match parts.as_slice() {
            ["channel", n, "valid"] => {
                let n = channel_number(path, n)?;
                Ok(SettingValue::Bool(self.is_channel_valid(n)))
            }
            ["channel", n, "scan_add"] => {
                let n = channel_number(path, n)?;
                Ok(SettingValue::Bool(scan_add(image, n)))
            }
            ["channel", n, name] => {
                let n = channel_number(path, n)?;
                let ch = Channel::from_record(&self.record(channel_offset(n)), RecordKind::Memory);
                get_channel_field(&ch, name).ok_or_else(|| unknown(path))
            }
            ["vfo", i, name] => {
                let i: usize = i.parse().map_err(|_| unknown(path))?;
                check_vfo(i)?;
                let ch = Channel::from_record(&self.record(vfo_offset(i)), RecordKind::Vfo);
                get_channel_field(&ch, name).ok_or_else(|| unknown(path))
            }
            ["zone", "total"] => Ok(SettingValue::Int(zones::active_zone_count(image) as i64)),
            ["zone", z, "name"] => {
                let z = index(path, z, "zone index", ZONE_COUNT)?;
                Ok(SettingValue::Text(self.zone_names()[z].clone()))
            }
            ["zone", z, "channels"] => {
                let z = index(path, z, "zone index", ZONE_COUNT)?;
                Ok(SettingValue::List(self.zone_channels(z)))
            }
            ["settings", name] => get_setting(image, name),
            ["scan", "range", i, name] => {
                let i = index(path, i, "scan range", SCAN_RANGE_COUNT)?;
                Ok(field(RANGE_FIELDS, path, name)?.read(image, range_offset(i)))
            }
            ["scan", name] => Ok(field(SCAN_FIELDS, path, name)?.read(image, SCAN_DATA)),
            ["dtmf", "code", i] => {
                let i = index(path, i, "DTMF code index", DTMF_CODE_COUNT)?;
                Ok(SettingValue::Text(dtmf_code(image, i).unwrap_or_default()))
            }
            ["dtmf", name] => Ok(field(DTMF_FIELDS, path, name)?.read(image, DTMF_SYS)),
            ["twotone", i, name] => {
                let i = index(path, i, "two-tone index", TWO_TONE_COUNT)?;
                Ok(field(TWO_TONE_FIELDS, path, name)?.read(image, two_tone_offset(i)))
            }
            ["aprs", name] => Ok(field(APRS_FIELDS, path, name)?.read(image, APRS)),
            ["gps", i, "valid"] => {
                let i = index(path, i, "GPS book index", GPS_BOOK_COUNT)?;
                Ok(SettingValue::Bool(gps_entry_valid(image, i)))
            }
            ["gps", i, name] => {
                let i = index(path, i, "GPS book index", GPS_BOOK_COUNT)?;
                Ok(field(GPS_FIELDS, path, name)?.read(image, gps_entry_offset(i)))
            }
            ["device", name] => Ok(field(DEVICE_FIELDS, path, name)?.read(image, DEVICE_INFO)),
            _ => Err(unknown(path)),
        }
    }

    /// Write `value` at `path`.
    ///
    /// Zone membership is not updated here, except that `channel.<n>.valid`
    /// flips the bitmap bit; call [`Codeplug::normalize`] after a batch.
    pub fn set(&mut self, path: &str, value: SettingValue) -> Result<()> {
        let parts: Vec<&str> = path.split('.').collect();
        match parts.as_slice() {
            ["channel", n, "valid"] => {
                let n = channel_number(path, n)?;
                zones::set_channel_valid(self.image_mut(), n, value.as_bool()?);
            }
            ["channel", n, "scan_add"] => {
                let n = channel_number(path, n)?;
                set_scan_add(self.image_mut(), n, value.as_bool()?);
            }
            ["channel", n, name] => {
                let n = channel_number(path, n)?;
                let fresh = !self.is_channel_valid(n);
                self.set_record_field(
                    path,
                    channel_offset(n),
                    RecordKind::Memory,
                    name,
                    &value,
                    fresh,
                )?;
            }
            ["vfo", i, name] => {
                let i: usize = i.parse().map_err(|_| unknown(path))?;
                check_vfo(i)?;
                self.set_record_field(path, vfo_offset(i), RecordKind::Vfo, name, &value, false)?;
            }
            ["zone", "total"] => return Err(read_only(path)),
            ["zone", z, "channels"] => {
                index(path, z, "zone index", ZONE_COUNT)?;
                return Err(read_only(path));
            }
            ["zone", z, "name"] => {
                let z = index(path, z, "zone index", ZONE_COUNT)?;
                zones::set_zone_name(self.image_mut(), z, value.as_text()?);
            }
            ["settings", name] => set_setting(self.image_mut(), name, &value)?,
            ["scan", "range", i, name] => {
                let i = index(path, i, "scan range", SCAN_RANGE_COUNT)?;
                field(RANGE_FIELDS, path, name)?.write(self.image_mut(), range_offset(i), &value)?;
            }
            ["scan", name] => field(SCAN_FIELDS, path, name)?.write(self.image_mut(), SCAN_DATA, &value)?,
            ["dtmf", "code", i] => {
                let i = index(path, i, "DTMF code index", DTMF_CODE_COUNT)?;
                let code = value.as_text()?;
                let code = (!code.trim().is_empty()).then_some(code);
                set_dtmf_code(self.image_mut(), i, code)?;
            }
            ["dtmf", name] => field(DTMF_FIELDS, path, name)?.write(self.image_mut(), DTMF_SYS, &value)?,
            ["twotone", i, name] => {
                let i = index(path, i, "two-tone index", TWO_TONE_COUNT)?;
                field(TWO_TONE_FIELDS, path, name)?.write(self.image_mut(), two_tone_offset(i), &value)?;
            }
            ["aprs", name] => field(APRS_FIELDS, path, name)?.write(self.image_mut(), APRS, &value)?,
            ["gps", i, "valid"] => {
                let i = index(path, i, "GPS book index", GPS_BOOK_COUNT)?;
                let valid = value.as_bool()?;
                if !set_gps_entry_valid(self.image_mut(), i, valid) {
                    return Err(CodeplugError::OutOfRange {
                        what: "GPS valid flag",
                        value: i as i64,
                    });
                }
            }
            ["gps", i, name] => {
                let i = index(path, i, "GPS book index", GPS_BOOK_COUNT)?;
                field(GPS_FIELDS, path, name)?.write(self.image_mut(), gps_entry_offset(i), &value)?;
            }
            ["device", name] => {
                field(DEVICE_FIELDS, path, name)?;
                return Err(read_only(path));
            }
            _ => return Err(unknown(path)),
        }
        debug!(path, value = %value, "Setting updated");
        Ok(())
    }

    /// Decode, change one field, re-encode. An absent channel starts from defaults.
    fn set_record_field(
        &mut self,
        path: &str,
        offset: usize,
        kind: RecordKind,
        name: &str,
        value: &SettingValue,
        fresh: bool,
    ) -> Result<()> {
        let base = self.record(offset);
        let mut ch = if fresh {
            Channel::default()
        } else {
            Channel::from_record(&base, kind)
        };
        if !CHANNEL_FIELDS.contains(&name) {
            return Err(unknown(path));
        }
        set_channel_field(&mut ch, name, value)?;
        if name == "rx_freq" {
            self.variant().check_band(ch.rx_freq)?;
        }
        let rec = ch.to_record(&base, kind)?;
        self.put_record(offset, &rec);
        Ok(())
    }
}
