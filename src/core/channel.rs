//! Channel and VFO records.
//!
//! Both are 48-byte records with the same byte layout. They differ only in how
//! byte 16 packs power, bandwidth, offset direction, frequency invert and
//! talkaround.

use super::bitfield::BitField;
use super::freq::{decode_freq, encode_freq, NO_FREQ};
use super::layout::{CHANNEL_LEN, MAX_EMERGENCY_LIST, MAX_SCAN_LIST};
use super::text::{decode_text, encode_text};
use super::tone::{decode_tone, encode_tone, Tone};
use crate::error::{CodeplugError, Result};
use crate::utils::metrics::global_metrics;
use tracing::warn;

/// One raw record.
pub type Record = [u8; CHANNEL_LEN];

/// Byte offsets inside a record.
pub mod offsets {
    pub const RX_FREQ: usize = 0;
    pub const TX_FREQ: usize = 4;
    pub const RX_TONE: usize = 8;
    pub const TX_TONE: usize = 10;
    pub const DIV_FREQ: usize = 12;
    pub const FREQ_STEP: usize = 24;
    pub const DTMF_IDX: usize = 25;
    pub const TWOTONE_IDX: usize = 26;
    pub const FIVETONE_IDX: usize = 27;
    pub const MDC_IDX: usize = 28;
    pub const SCAN_LIST: usize = 29;
    pub const EMERG_LIST: usize = 30;
    pub const NAME: usize = 32;
    pub const NAME_LEN: usize = 16;
}

/// Bitfields shared by channel and VFO records.
pub mod fields {
    use super::BitField;

    pub const FIVE_TONE_PTT: BitField = BitField::new(17, 7, 2);
    pub const DTMF_PTT: BitField = BitField::new(17, 5, 2);
    pub const SQUELCH_TYPE: BitField = BitField::new(17, 3, 4);
    pub const SIGNAL_TYPE: BitField = BitField::new(18, 7, 3);
    pub const JUMP_FREQ: BitField = BitField::new(18, 4, 2);
    pub const BUSY_LOCK: BitField = BitField::new(19, 7, 2);
    pub const TX_DISABLE: BitField = BitField::flag(19, 5);
    pub const SCRAMBLE: BitField = BitField::flag(20, 7);
    pub const COMPAND: BitField = BitField::flag(20, 6);
    pub const CEPIN_DCS: BitField = BitField::flag(20, 5);
    pub const CEPIN_24BIT: BitField = BitField::flag(20, 4);
}

/// Which packing byte 16 uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Memory,
    Vfo,
}

impl RecordKind {
    pub const fn power(self) -> BitField {
        BitField::new(16, 7, 2)
    }

    pub const fn bandwidth(self) -> BitField {
        match self {
            RecordKind::Memory => BitField::new(16, 5, 2),
            RecordKind::Vfo => BitField::flag(16, 5),
        }
    }

    pub const fn offset_dir(self) -> BitField {
        match self {
            RecordKind::Memory => BitField::new(16, 3, 2),
            RecordKind::Vfo => BitField::new(16, 4, 2),
        }
    }

    pub const fn freq_invert(self) -> BitField {
        match self {
            RecordKind::Memory => BitField::flag(16, 1),
            RecordKind::Vfo => BitField::flag(16, 2),
        }
    }

    pub const fn talkaround(self) -> BitField {
        match self {
            RecordKind::Memory => BitField::flag(16, 0),
            RecordKind::Vfo => BitField::flag(16, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerLevel {
    Low = 0,
    Medium = 1,
    #[default]
    High = 2,
}

impl PowerLevel {
    pub fn watts(self) -> f32 {
        match self {
            PowerLevel::Low => 2.0,
            PowerLevel::Medium => 5.0,
            PowerLevel::High => 10.0,
        }
    }

    /// Level closest to `watts`.
    pub fn from_watts(watts: f32) -> Self {
        [PowerLevel::Low, PowerLevel::Medium, PowerLevel::High]
            .into_iter()
            .min_by(|a, b| {
                (a.watts() - watts)
                    .abs()
                    .total_cmp(&(b.watts() - watts).abs())
            })
            .unwrap_or_default()
    }
}

impl TryFrom<u8> for PowerLevel {
    type Error = CodeplugError;

    fn try_from(v: u8) -> Result<Self> {
        match v {
            0 => Ok(PowerLevel::Low),
            1 => Ok(PowerLevel::Medium),
            2 => Ok(PowerLevel::High),
            _ => Err(CodeplugError::OutOfRange {
                what: "power level",
                value: i64::from(v),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bandwidth {
    Narrow = 0,
    #[default]
    Wide = 1,
}

impl TryFrom<u8> for Bandwidth {
    type Error = CodeplugError;

    fn try_from(v: u8) -> Result<Self> {
        match v {
            0 => Ok(Bandwidth::Narrow),
            1 => Ok(Bandwidth::Wide),
            _ => Err(CodeplugError::OutOfRange {
                what: "bandwidth",
                value: i64::from(v),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetDirection {
    #[default]
    None = 0,
    Plus = 1,
    Minus = 2,
}

impl TryFrom<u8> for OffsetDirection {
    type Error = CodeplugError;

    fn try_from(v: u8) -> Result<Self> {
        match v {
            0 => Ok(OffsetDirection::None),
            1 => Ok(OffsetDirection::Plus),
            2 => Ok(OffsetDirection::Minus),
            _ => Err(CodeplugError::OutOfRange {
                what: "offset direction",
                value: i64::from(v),
            }),
        }
    }
}

/// Transmit relationship derived from RX/TX frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duplex {
    Simplex,
    /// TX above RX by this many Hz.
    Plus(u64),
    /// TX below RX by this many Hz.
    Minus(u64),
    /// Independent TX frequency.
    Split(u64),
    /// Transmit disabled.
    Off,
}

/// Offsets wider than this are treated as a split.
pub const SPLIT_THRESHOLD_HZ: u64 = 70_000_000;

/// Squelch tone arrangement derived from the RX and TX tones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneMode {
    None,
    /// TX tone only.
    Tone,
    /// Same CTCSS on RX and TX.
    Tsql,
    /// Same DCS code and polarity on RX and TX.
    Dcs,
    Cross,
}

/// Limits on the signalling index bytes.
pub const MAX_DTMF_IDX: u8 = 15;
pub const MAX_TWOTONE_IDX: u8 = 15;
pub const MAX_FIVETONE_IDX: u8 = 103;
pub const MAX_MDC_IDX: u8 = 99;
pub const MAX_FREQ_STEP: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub name: String,
    pub rx_freq: u64,
    /// 0 means transmit is off.
    pub tx_freq: u64,
    pub rx_tone: Tone,
    pub tx_tone: Tone,
    /// Kept as stored; its meaning is undocumented.
    pub div_freq: u32,
    pub power: PowerLevel,
    pub bandwidth: Bandwidth,
    pub offset_dir: OffsetDirection,
    pub freq_invert: bool,
    pub talkaround: bool,
    pub five_tone_ptt: u8,
    pub dtmf_ptt: u8,
    pub squelch_type: u8,
    pub signal_type: u8,
    pub jump_freq: u8,
    pub busy_lock: u8,
    pub tx_disable: bool,
    pub scramble: bool,
    pub compand: bool,
    pub cepin_dcs: bool,
    pub cepin_24bit: bool,
    pub freq_step: u8,
    pub dtmf_idx: u8,
    pub twotone_idx: u8,
    pub fivetone_idx: u8,
    pub mdc_idx: u8,
    pub scan_list: u8,
    pub emerg_list: u8,
}

impl Default for Channel {
    /// A freshly created channel: high power, wide, everything else off.
    fn default() -> Self {
        Self {
            name: String::new(),
            rx_freq: 0,
            tx_freq: 0,
            rx_tone: Tone::None,
            tx_tone: Tone::None,
            div_freq: 0,
            power: PowerLevel::High,
            bandwidth: Bandwidth::Wide,
            offset_dir: OffsetDirection::None,
            freq_invert: false,
            talkaround: false,
            five_tone_ptt: 0,
            dtmf_ptt: 0,
            squelch_type: 0,
            signal_type: 0,
            jump_freq: 0,
            busy_lock: 0,
            tx_disable: false,
            scramble: false,
            compand: false,
            cepin_dcs: false,
            cepin_24bit: false,
            freq_step: 0,
            dtmf_idx: 0,
            twotone_idx: 0,
            fivetone_idx: 0,
            mdc_idx: 0,
            scan_list: 0,
            emerg_list: 0,
        }
    }
}

fn read_u32(rec: &Record, at: usize) -> u32 {
    u32::from_be_bytes([rec[at], rec[at + 1], rec[at + 2], rec[at + 3]])
}

fn write_u32(rec: &mut Record, at: usize, value: u32) {
    rec[at..at + 4].copy_from_slice(&value.to_be_bytes());
}

fn get(rec: &Record, f: BitField) -> u8 {
    f.get(rec[f.offset])
}

fn put(rec: &mut Record, f: BitField, value: u8) {
    rec[f.offset] = f.put(rec[f.offset], value);
}

fn check(what: &'static str, value: u8, max: u8) -> Result<()> {
    if value > max {
        return Err(CodeplugError::OutOfRange {
            what,
            value: i64::from(value),
        });
    }
    Ok(())
}

impl Channel {
    /// Simplex channel on `hz`.
    pub fn simplex(name: &str, hz: u64) -> Self {
        Self {
            name: name.to_string(),
            rx_freq: hz,
            tx_freq: hz,
            ..Self::default()
        }
    }

    /// Decode a record. Out-of-range enum values are logged and replaced.
    pub fn from_record(rec: &Record, kind: RecordKind) -> Self {
        let raw_power = get(rec, kind.power());
        let power = PowerLevel::try_from(raw_power).unwrap_or_else(|_| {
            warn!(value = raw_power, "Unknown power level, using High");
            global_metrics().decode_warning();
            PowerLevel::High
        });
        let bandwidth = if get(rec, kind.bandwidth()) == 0 {
            Bandwidth::Narrow
        } else {
            Bandwidth::Wide
        };
        let raw_dir = get(rec, kind.offset_dir());
        let offset_dir = OffsetDirection::try_from(raw_dir).unwrap_or_else(|_| {
            warn!(value = raw_dir, "Unknown offset direction, using none");
            global_metrics().decode_warning();
            OffsetDirection::None
        });

        Self {
            name: decode_text(&rec[offsets::NAME..offsets::NAME + offsets::NAME_LEN]),
            rx_freq: decode_freq(read_u32(rec, offsets::RX_FREQ)),
            tx_freq: decode_freq(read_u32(rec, offsets::TX_FREQ)),
            rx_tone: decode_tone(rec[offsets::RX_TONE], rec[offsets::RX_TONE + 1]),
            tx_tone: decode_tone(rec[offsets::TX_TONE], rec[offsets::TX_TONE + 1]),
            div_freq: read_u32(rec, offsets::DIV_FREQ),
            power,
            bandwidth,
            offset_dir,
            freq_invert: get(rec, kind.freq_invert()) != 0,
            talkaround: get(rec, kind.talkaround()) != 0,
            five_tone_ptt: get(rec, fields::FIVE_TONE_PTT),
            dtmf_ptt: get(rec, fields::DTMF_PTT),
            squelch_type: get(rec, fields::SQUELCH_TYPE),
            signal_type: get(rec, fields::SIGNAL_TYPE),
            jump_freq: get(rec, fields::JUMP_FREQ),
            busy_lock: get(rec, fields::BUSY_LOCK),
            tx_disable: get(rec, fields::TX_DISABLE) != 0,
            scramble: get(rec, fields::SCRAMBLE) != 0,
            compand: get(rec, fields::COMPAND) != 0,
            cepin_dcs: get(rec, fields::CEPIN_DCS) != 0,
            cepin_24bit: get(rec, fields::CEPIN_24BIT) != 0,
            freq_step: rec[offsets::FREQ_STEP],
            dtmf_idx: rec[offsets::DTMF_IDX],
            twotone_idx: rec[offsets::TWOTONE_IDX],
            fivetone_idx: rec[offsets::FIVETONE_IDX],
            mdc_idx: rec[offsets::MDC_IDX],
            scan_list: rec[offsets::SCAN_LIST],
            emerg_list: rec[offsets::EMERG_LIST],
        }
    }

    /// Check every field against its width and documented range.
    pub fn validate(&self) -> Result<()> {
        encode_freq(self.rx_freq)?;
        encode_freq(self.tx_freq)?;
        encode_tone(self.rx_tone)?;
        encode_tone(self.tx_tone)?;
        check("five-tone PTT-ID", self.five_tone_ptt, fields::FIVE_TONE_PTT.max())?;
        check("DTMF PTT-ID", self.dtmf_ptt, fields::DTMF_PTT.max())?;
        check("squelch type", self.squelch_type, fields::SQUELCH_TYPE.max())?;
        check("signal type", self.signal_type, fields::SIGNAL_TYPE.max())?;
        check("jump frequency", self.jump_freq, fields::JUMP_FREQ.max())?;
        check("busy lock", self.busy_lock, fields::BUSY_LOCK.max())?;
        check("frequency step", self.freq_step, MAX_FREQ_STEP)?;
        check("DTMF index", self.dtmf_idx, MAX_DTMF_IDX)?;
        check("two-tone index", self.twotone_idx, MAX_TWOTONE_IDX)?;
        check("five-tone index", self.fivetone_idx, MAX_FIVETONE_IDX)?;
        check("MDC index", self.mdc_idx, MAX_MDC_IDX)?;
        check("scan list", self.scan_list, MAX_SCAN_LIST)?;
        check("emergency system", self.emerg_list, MAX_EMERGENCY_LIST)?;
        Ok(())
    }

    /// Encode over `base`, keeping its reserved bits. Nothing is written on error.
    pub fn to_record(&self, base: &Record, kind: RecordKind) -> Result<Record> {
        self.validate()?;
        let mut rec = *base;

        write_u32(&mut rec, offsets::RX_FREQ, encode_freq(self.rx_freq)?);
        write_u32(
            &mut rec,
            offsets::TX_FREQ,
            if self.tx_freq == 0 {
                NO_FREQ
            } else {
                encode_freq(self.tx_freq)?
            },
        );
        let (h, l) = encode_tone(self.rx_tone)?;
        rec[offsets::RX_TONE] = h;
        rec[offsets::RX_TONE + 1] = l;
        let (h, l) = encode_tone(self.tx_tone)?;
        rec[offsets::TX_TONE] = h;
        rec[offsets::TX_TONE + 1] = l;
        write_u32(&mut rec, offsets::DIV_FREQ, self.div_freq);

        put(&mut rec, kind.power(), self.power as u8);
        put(&mut rec, kind.bandwidth(), self.bandwidth as u8);
        put(&mut rec, kind.offset_dir(), self.offset_dir as u8);
        put(&mut rec, kind.freq_invert(), u8::from(self.freq_invert));
        put(&mut rec, kind.talkaround(), u8::from(self.talkaround));
        put(&mut rec, fields::FIVE_TONE_PTT, self.five_tone_ptt);
        put(&mut rec, fields::DTMF_PTT, self.dtmf_ptt);
        put(&mut rec, fields::SQUELCH_TYPE, self.squelch_type);
        put(&mut rec, fields::SIGNAL_TYPE, self.signal_type);
        put(&mut rec, fields::JUMP_FREQ, self.jump_freq);
        put(&mut rec, fields::BUSY_LOCK, self.busy_lock);
        put(&mut rec, fields::TX_DISABLE, u8::from(self.tx_disable));
        put(&mut rec, fields::SCRAMBLE, u8::from(self.scramble));
        put(&mut rec, fields::COMPAND, u8::from(self.compand));
        put(&mut rec, fields::CEPIN_DCS, u8::from(self.cepin_dcs));
        put(&mut rec, fields::CEPIN_24BIT, u8::from(self.cepin_24bit));

        rec[offsets::FREQ_STEP] = self.freq_step;
        rec[offsets::DTMF_IDX] = self.dtmf_idx;
        rec[offsets::TWOTONE_IDX] = self.twotone_idx;
        rec[offsets::FIVETONE_IDX] = self.fivetone_idx;
        rec[offsets::MDC_IDX] = self.mdc_idx;
        rec[offsets::SCAN_LIST] = self.scan_list;
        rec[offsets::EMERG_LIST] = self.emerg_list;
        rec[offsets::NAME..offsets::NAME + offsets::NAME_LEN]
            .copy_from_slice(&encode_text(&self.name, offsets::NAME_LEN));

        Ok(rec)
    }

    pub fn duplex(&self) -> Duplex {
        if self.tx_freq == 0 {
            return Duplex::Off;
        }
        if self.tx_freq == self.rx_freq {
            return Duplex::Simplex;
        }
        if self.rx_freq.abs_diff(self.tx_freq) > SPLIT_THRESHOLD_HZ {
            return Duplex::Split(self.tx_freq);
        }
        match self.offset_dir {
            OffsetDirection::Plus => Duplex::Plus(self.tx_freq.saturating_sub(self.rx_freq)),
            OffsetDirection::Minus => Duplex::Minus(self.rx_freq.saturating_sub(self.tx_freq)),
            OffsetDirection::None => Duplex::Simplex,
        }
    }

    /// Set TX frequency and offset direction from `duplex`.
    pub fn set_duplex(&mut self, duplex: Duplex) {
        match duplex {
            Duplex::Simplex => {
                self.tx_freq = self.rx_freq;
                self.offset_dir = OffsetDirection::None;
            }
            Duplex::Plus(offset) => {
                self.tx_freq = self.rx_freq.saturating_add(offset);
                self.offset_dir = OffsetDirection::Plus;
            }
            Duplex::Minus(offset) => {
                self.tx_freq = self.rx_freq.saturating_sub(offset);
                self.offset_dir = OffsetDirection::Minus;
            }
            Duplex::Split(tx) => self.tx_freq = tx,
            Duplex::Off => self.tx_freq = 0,
        }
    }

    pub fn tone_mode(&self) -> ToneMode {
        match (self.rx_tone, self.tx_tone) {
            (Tone::None, Tone::None) => ToneMode::None,
            (Tone::None, Tone::Ctcss(_)) => ToneMode::Tone,
            (Tone::Ctcss(a), Tone::Ctcss(b)) if a == b => ToneMode::Tsql,
            (Tone::Dcs { .. }, Tone::Dcs { .. }) if self.rx_tone == self.tx_tone => ToneMode::Dcs,
            _ => ToneMode::Cross,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn blank() -> Record {
        [0u8; CHANNEL_LEN]
    }

    #[test]
    fn memory_byte16_packing() {
        let ch = Channel {
            power: PowerLevel::Medium,
            bandwidth: Bandwidth::Wide,
            offset_dir: OffsetDirection::Minus,
            talkaround: true,
            ..Channel::simplex("A", 446_006_250)
        };
        let rec = ch.to_record(&blank(), RecordKind::Memory).unwrap();
        assert_eq!(rec[16], 0b01_01_10_0_1);
    }

    #[test]
    fn vfo_byte16_packing() {
        let ch = Channel {
            power: PowerLevel::High,
            bandwidth: Bandwidth::Wide,
            offset_dir: OffsetDirection::Plus,
            freq_invert: true,
            ..Channel::simplex("", 145_500_000)
        };
        let rec = ch.to_record(&blank(), RecordKind::Vfo).unwrap();
        assert_eq!(rec[16], 0b10_1_01_1_0_0);
        let back = Channel::from_record(&rec, RecordKind::Vfo);
        assert_eq!(back, ch);
    }

    #[test]
    fn record_round_trip() {
        let ch = Channel {
            name: "中继台".into(),
            rx_freq: 438_500_000,
            tx_freq: 431_100_000,
            rx_tone: Tone::Dcs { code: 754, inverted: true },
            tx_tone: Tone::Ctcss(885),
            offset_dir: OffsetDirection::Minus,
            busy_lock: 1,
            squelch_type: 5,
            signal_type: 3,
            scramble: true,
            cepin_24bit: true,
            dtmf_idx: 15,
            fivetone_idx: 103,
            mdc_idx: 99,
            scan_list: 16,
            emerg_list: 10,
            ..Channel::default()
        };
        let rec = ch.to_record(&blank(), RecordKind::Memory).unwrap();
        assert_eq!(Channel::from_record(&rec, RecordKind::Memory), ch);
        assert_eq!(ch.duplex(), Duplex::Minus(7_400_000));
        assert_eq!(ch.tone_mode(), ToneMode::Cross);
    }

    #[test]
    fn reserved_bits_survive_encode() {
        let mut base = blank();
        base[18] = 0b000_00_111;
        base[21] = 0xAB;
        let rec = Channel::simplex("x", 146_520_000)
            .to_record(&base, RecordKind::Memory)
            .unwrap();
        assert_eq!(rec[18] & 0x07, 0x07);
        assert_eq!(rec[21], 0xAB);
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let ch = Channel {
            fivetone_idx: 104,
            ..Channel::simplex("x", 146_520_000)
        };
        assert!(matches!(
            ch.to_record(&blank(), RecordKind::Memory),
            Err(CodeplugError::OutOfRange { what: "five-tone index", value: 104 })
        ));
    }

    #[test]
    fn duplex_rules() {
        let mut ch = Channel::simplex("", 146_940_000);
        assert_eq!(ch.duplex(), Duplex::Simplex);
        ch.set_duplex(Duplex::Minus(600_000));
        assert_eq!(ch.tx_freq, 146_340_000);
        assert_eq!(ch.duplex(), Duplex::Minus(600_000));
        ch.set_duplex(Duplex::Split(446_000_000));
        assert_eq!(ch.duplex(), Duplex::Split(446_000_000));
        ch.set_duplex(Duplex::Off);
        assert_eq!(ch.duplex(), Duplex::Off);
        let rec = ch.to_record(&blank(), RecordKind::Memory).unwrap();
        assert_eq!(&rec[4..8], &[0xFF; 4]);
    }

    #[test]
    fn tone_modes() {
        let mut ch = Channel::simplex("", 146_520_000);
        assert_eq!(ch.tone_mode(), ToneMode::None);
        ch.tx_tone = Tone::Ctcss(1000);
        assert_eq!(ch.tone_mode(), ToneMode::Tone);
        ch.rx_tone = Tone::Ctcss(1000);
        assert_eq!(ch.tone_mode(), ToneMode::Tsql);
        ch.rx_tone = Tone::Dcs { code: 23, inverted: false };
        ch.tx_tone = ch.rx_tone;
        assert_eq!(ch.tone_mode(), ToneMode::Dcs);
    }

    #[test]
    fn power_from_watts() {
        assert_eq!(PowerLevel::from_watts(4.0), PowerLevel::Medium);
        assert_eq!(PowerLevel::from_watts(25.0), PowerLevel::High);
        assert_eq!(PowerLevel::from_watts(0.5), PowerLevel::Low);
    }
}
