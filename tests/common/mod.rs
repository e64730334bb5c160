//! In-process radio emulator for integration tests.
//!
//! Answers the clone-mode protocol from an owned memory image, the way the
//! handset firmware does: wake ack in clear, everything after PROGRAM
//! obfuscated with the seed the host chose.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use radio_codeplug::config::SessionConfig;
use radio_codeplug::core::image::MemoryImage;
use radio_codeplug::core::layout::PAGE_SIZE;
use radio_codeplug::transport::Transport;
use radio_codeplug::utils::cipher::SeedPolicy;
use radio_codeplug::Result;
use std::collections::VecDeque;
use std::time::Duration;

const WAKE: [u8; 16] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Asleep,
    Awake,
    Program,
    Ready,
    Reading,
    Writing,
    Done,
}

pub struct RadioEmulator {
    pub image: MemoryImage,
    pub model: String,
    pub freq_band: u8,
    /// Digits the radio expects; `None` accepts only the "no password" frame.
    pub password: Option<String>,
    /// Only wake packets sent at this rate are answered.
    pub listen_baud: u32,
    /// Truncate this many page responses before answering normally.
    pub short_pages: usize,
    /// Refuse the write ack for this page index.
    pub nack_page: Option<usize>,
    seed: u8,
    mode: Mode,
    outbox: VecDeque<u8>,
    baud: u32,
    timeout: Duration,
    pub pages_served: usize,
    pub pages_written: usize,
    pub finalized: bool,
}

impl RadioEmulator {
    pub fn new(image: MemoryImage, model: &str) -> Self {
        Self {
            image,
            model: model.to_string(),
            freq_band: 0x01,
            password: None,
            listen_baud: 38_400,
            short_pages: 0,
            nack_page: None,
            seed: 0,
            mode: Mode::Asleep,
            outbox: VecDeque::new(),
            baud: 38_400,
            timeout: Duration::from_secs(1),
            pages_served: 0,
            pages_written: 0,
            finalized: false,
        }
    }

    /// Image with a recognisable pattern in every page.
    pub fn patterned(model: &str) -> Self {
        let bytes: Vec<u8> = (0..radio_codeplug::core::layout::IMAGE_SIZE)
            .map(|i| (i % 251) as u8)
            .collect();
        Self::new(MemoryImage::from_bytes(bytes).unwrap(), model)
    }

    pub fn seed(&self) -> u8 {
        self.seed
    }

    fn send(&mut self, bytes: &[u8]) {
        self.outbox.extend(bytes.iter().copied());
    }

    fn ack(&mut self) {
        let byte = b'A' ^ self.seed;
        self.send(&[byte]);
    }

    fn decode(&self, data: &[u8]) -> Vec<u8> {
        data.iter().map(|b| b ^ self.seed).collect()
    }

    fn password_frame(&self) -> [u8; 8] {
        let mut frame = [0xFFu8; 8];
        if let Some(pw) = &self.password {
            frame[..pw.len()].copy_from_slice(pw.as_bytes());
        }
        frame
    }

    fn info(&self) -> Vec<u8> {
        let mut info = vec![0xFFu8; 16];
        let name = self.model.as_bytes();
        info[..name.len()].copy_from_slice(name);
        if name.len() < 8 {
            info[name.len()] = 0x00;
        }
        info[8] = self.freq_band;
        self.decode(&info)
    }

    fn handle(&mut self, data: &[u8]) {
        if data == WAKE {
            if self.baud == self.listen_baud {
                self.mode = Mode::Awake;
                self.send(b"A");
            }
            return;
        }
        match self.mode {
            Mode::Asleep | Mode::Done => {}
            Mode::Awake => {
                if data.len() == 8 && &data[..7] == b"PROGRAM" {
                    self.seed = data[7];
                    self.mode = Mode::Program;
                    self.ack();
                }
            }
            Mode::Program => {
                if data.len() == 8 && self.decode(data) == self.password_frame() {
                    self.mode = Mode::Ready;
                    self.ack();
                } else {
                    self.send(&[b'N' ^ self.seed]);
                }
            }
            Mode::Ready | Mode::Reading | Mode::Writing => self.command(data),
        }
    }

    fn command(&mut self, data: &[u8]) {
        let plain = self.decode(data);
        if plain == b"INFORMATION" {
            let info = self.info();
            self.send(&info);
        } else if plain == b"END\0" {
            self.mode = Mode::Done;
            self.finalized = true;
            self.ack();
        } else if plain == b"R" {
            self.mode = Mode::Reading;
            self.ack();
        } else if plain == b"W" {
            self.mode = Mode::Writing;
            self.ack();
        } else if self.mode == Mode::Reading && data.len() == 4 && plain[0] == b'R' {
            let address = usize::from(u16::from_be_bytes([data[1], data[2]]));
            let mut reply = data.to_vec();
            reply.extend(self.decode(self.image.slice(address, PAGE_SIZE)));
            if self.short_pages > 0 {
                self.short_pages -= 1;
                reply.truncate(1000);
            } else {
                self.pages_served += 1;
            }
            self.send(&reply);
        } else if self.mode == Mode::Writing && data.len() > 4 && plain[0] == b'W' {
            let address = usize::from(u16::from_be_bytes([data[1], data[2]]));
            if self.nack_page == Some(address / PAGE_SIZE) {
                self.send(&[0x00]);
                return;
            }
            let payload = self.decode(&data[4..]);
            self.image
                .slice_mut(address, payload.len())
                .copy_from_slice(&payload);
            self.pages_written += 1;
            self.ack();
        }
    }
}

impl Transport for RadioEmulator {
    fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let take = n.min(self.outbox.len());
        Ok(self.outbox.drain(..take).collect())
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.handle(data);
        Ok(())
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.timeout = timeout;
        Ok(())
    }

    fn baud_rate(&self) -> u32 {
        self.baud
    }

    fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        self.baud = baud;
        Ok(())
    }
}

/// Session settings with the sleeps taken out.
pub fn fast_config(seed: SeedPolicy) -> SessionConfig {
    SessionConfig {
        handshake_poll_interval: Duration::ZERO,
        page_retry_backoff: Duration::ZERO,
        seed,
        ..SessionConfig::default()
    }
}
