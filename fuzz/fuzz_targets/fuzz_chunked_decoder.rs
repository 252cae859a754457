#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use shiguredo_chunked::{ChunkedDecoder, DecodeEvent, DecoderLimits, decode_chunked};

#[derive(Arbitrary, Debug)]
struct FuzzDecoder {
    data: Vec<u8>,
    split_hint: u8,
    max_body_size: u16,
}

fuzz_target!(|input: FuzzDecoder| {
    // 任意の入力でパニックしない
    let _ = decode_chunked(&input.data);

    let limits = DecoderLimits {
        max_body_size: input.max_body_size as usize,
        ..DecoderLimits::default()
    };
    let mut decoder = ChunkedDecoder::with_limits(limits);
    let split_size = (input.split_hint as usize % 32) + 1;
    let mut body_len = 0usize;

    'outer: for part in input.data.chunks(split_size) {
        if decoder.feed(part).is_err() {
            break;
        }
        loop {
            match decoder.decode() {
                Ok(Some(DecodeEvent::Data(data))) => {
                    assert!(!data.is_empty());
                    body_len += data.len();
                }
                Ok(Some(DecodeEvent::Complete { .. })) => {
                    assert!(decoder.is_complete());
                }
                Ok(None) => break,
                Err(_) => break 'outer,
            }
        }
    }

    assert!(body_len <= input.max_body_size as usize);
    assert!(body_len <= decoder.body_size());
});
