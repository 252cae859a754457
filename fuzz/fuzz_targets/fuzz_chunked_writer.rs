#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use shiguredo_chunked::{ChunkedDecoder, ChunkedWriter, DecodeEvent, DecoderLimits, Error};

#[derive(Arbitrary, Debug)]
enum Op {
    Write(Vec<u8>),
    WriteByte(u8),
    Flush,
    Finish,
}

#[derive(Arbitrary, Debug)]
struct FuzzWriter {
    ops: Vec<Op>,
    capacity: u8,
    split_hint: u8,
}

fn decode(encoded: &[u8], split_size: usize) -> Vec<u8> {
    let mut decoder = ChunkedDecoder::with_limits(DecoderLimits::unlimited());
    let mut body = Vec::new();
    let mut completed = false;
    for part in encoded.chunks(split_size) {
        decoder.feed(part).unwrap();
        while let Some(event) = decoder.decode().unwrap() {
            match event {
                DecodeEvent::Data(data) => body.extend_from_slice(&data),
                DecodeEvent::Complete { .. } => completed = true,
            }
        }
    }
    assert!(completed);
    assert!(decoder.remaining().is_empty());
    body
}

fuzz_target!(|input: FuzzWriter| {
    let mut writer = ChunkedWriter::with_capacity(Vec::new(), input.capacity as usize);
    let mut expected = Vec::new();

    for op in input.ops.into_iter().take(256) {
        let was_finished = writer.is_finished();
        let before = writer.get_ref().len();

        let (result, is_finish) = match op {
            Op::Write(data) => {
                let result = writer.write(&data);
                if result.is_ok() {
                    expected.extend_from_slice(&data);
                }
                (result, false)
            }
            Op::WriteByte(b) => {
                let result = writer.write_byte(b);
                if result.is_ok() {
                    expected.push(b);
                }
                (result, false)
            }
            Op::Flush => (writer.flush(), false),
            Op::Finish => (writer.finish(), true),
        };

        match result {
            Ok(()) => assert!(!was_finished || is_finish),
            Err(Error::AlreadyFinished) => assert!(was_finished && !is_finish),
            Err(Error::Failed) => panic!("Vec<u8> never fails"),
            Err(Error::Io(e)) => panic!("Vec<u8> never fails: {e}"),
        }
        if was_finished {
            // 終了後は何も出力しない
            assert_eq!(writer.get_ref().len(), before);
        }
    }

    writer.finish().unwrap();
    assert!(writer.is_finished());
    let encoded = writer.get_ref();
    assert!(encoded.ends_with(b"0\r\n\r\n"));

    let split_size = (input.split_hint as usize % 32) + 1;
    assert_eq!(decode(encoded, split_size), expected);
});
