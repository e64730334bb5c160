#![no_main]

use libfuzzer_sys::fuzz_target;
use radio_codeplug::core::image::MemoryImage;
use radio_codeplug::core::layout::IMAGE_SIZE;
use radio_codeplug::Codeplug;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    // Tile the input over a whole image so every block sees fuzzed bytes
    let bytes: Vec<u8> = data.iter().copied().cycle().take(IMAGE_SIZE).collect();
    let Ok(image) = MemoryImage::from_bytes(bytes) else {
        return;
    };
    let mut codeplug = Codeplug::from_image(image);

    for (n, _) in codeplug.channels() {
        let _ = codeplug.get(&format!("channel.{n}.rx_tone"));
    }
    for path in ["settings.radio_name", "scan.range.0.upper", "dtmf.code.3", "gps.5.name"] {
        let _ = codeplug.get(path);
    }

    codeplug.normalize();
    let once = codeplug.image().clone();
    assert!(codeplug.normalize().is_clean());
    assert!(codeplug.image() == &once);
});
