#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    use zune_ugo::zune_core::bytestream::ZCursor;
    use zune_ugo::{UgoDecoder, UgoFormat};

    // the first two bytes pick the dimensions, the rest is the image
    if data.len() < 2 {
        return;
    }
    let width = usize::from(data[0]);
    let height = usize::from(data[1]);

    for format in [UgoFormat::NTFT, UgoFormat::NBF, UgoFormat::NPF] {
        let mut decoder = UgoDecoder::new(ZCursor::new(&data[2..]), format, width, height);
        let _ = decoder.decode();
    }
});
