//! ライターのライフサイクルのテスト
//!
//! 書き込み先の解放 (close) と終端チャンクの関係を確認する。
//!
//! ## なぜ PBT ではなくシナリオテストなのか
//!
//! PBT は「任意の書き込み列に対するフレームの正しさ」を検証する。
//! このテストは「書き込み先がいつ解放されるか」「失敗したときに何が起きるか」を検証する。
//! これらは入力の多様性ではなく呼び出し順序の問題であり、個別のシナリオで十分である。
//!
//! 終端チャンクがないと相手側はボディの終わりを待ち続けるため、
//! 次の点を保証する必要がある。
//!
//! 一方で、途中で失敗したボディを完全なボディとして送ってはならない。
//!
//! - `close()` は終端チャンクを送信してから書き込み先を解放する
//! - 終端チャンクの送信に失敗しても書き込み先は解放される
//! - `close()` を呼ばずに drop した場合は終端チャンクを送信しない
//! - 書き込み先がエラーを返した後は何も送信しない

use std::cell::RefCell;
use std::io::{self, Read, Write};
use std::rc::Rc;

use shiguredo_chunked::{
    ChunkedUpload, ChunkedWriter, DecodeError, Error, NoProgress, decode_chunked,
};

/// 書き込み先の操作履歴
#[derive(Debug, Default)]
struct SinkLog {
    data: Vec<u8>,
    flushes: usize,
    closed: bool,
    /// 書き込みを失敗させる
    fail_writes: bool,
    /// 指定回数の書き込み後に失敗させる
    fail_after: Option<usize>,
    writes: usize,
}

/// 操作を記録する書き込み先 (drop を close とみなす)
struct RecordingSink {
    log: Rc<RefCell<SinkLog>>,
}

impl RecordingSink {
    fn new() -> (Self, Rc<RefCell<SinkLog>>) {
        let log = Rc::new(RefCell::new(SinkLog::default()));
        (RecordingSink { log: log.clone() }, log)
    }
}

impl Write for RecordingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut log = self.log.borrow_mut();
        assert!(!log.closed, "write after close");
        if log.fail_writes {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        }
        if log.fail_after.is_some_and(|n| log.writes >= n) {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "timed out"));
        }
        log.writes += 1;
        log.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.log.borrow_mut().flushes += 1;
        Ok(())
    }
}

impl Drop for RecordingSink {
    fn drop(&mut self) {
        self.log.borrow_mut().closed = true;
    }
}

#[test]
fn close_sends_terminator_then_closes_sink() {
    let (sink, log) = RecordingSink::new();
    let mut writer = ChunkedWriter::new(sink);
    writer.write(b"abcde").unwrap();
    assert!(log.borrow().data.is_empty());

    writer.close().unwrap();

    let log = log.borrow();
    assert!(log.closed);
    assert_eq!(log.data, b"5\r\nabcde\r\n0\r\n\r\n");
}

/// 明示的な finish + close と暗黙の close が同じ出力になることを確認する
#[test]
fn close_matches_explicit_finish() {
    let (sink1, log1) = RecordingSink::new();
    let mut writer = ChunkedWriter::new(sink1);
    writer.write(b"payload").unwrap();
    writer.finish().unwrap();
    assert!(!log1.borrow().closed);
    writer.close().unwrap();

    let (sink2, log2) = RecordingSink::new();
    let mut writer = ChunkedWriter::new(sink2);
    writer.write(b"payload").unwrap();
    writer.close().unwrap();

    assert_eq!(log1.borrow().data, log2.borrow().data);
    assert!(log1.borrow().closed);
    assert!(log2.borrow().closed);
    assert!(log2.borrow().data.ends_with(b"0\r\n\r\n"));
}

#[test]
fn finish_keeps_sink_open() {
    let (sink, log) = RecordingSink::new();
    let mut writer = ChunkedWriter::new(sink);
    writer.finish().unwrap();

    assert!(!log.borrow().closed);
    assert_eq!(log.borrow().data, b"0\r\n\r\n");
    assert!(log.borrow().flushes >= 1);

    // 同じ書き込み先で次のメッセージを送信できる
    writer.get_mut().write_all(b"HTTP/1.1 200 OK\r\n").unwrap();
    drop(writer);
    assert!(log.borrow().closed);
    assert_eq!(log.borrow().data, b"0\r\n\r\nHTTP/1.1 200 OK\r\n");
}

#[test]
fn close_releases_sink_on_error() {
    let (sink, log) = RecordingSink::new();
    let mut writer = ChunkedWriter::new(sink);
    writer.write(b"abc").unwrap();
    log.borrow_mut().fail_writes = true;

    let result = writer.close();
    match result {
        Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
        other => panic!("unexpected: {:?}", other),
    }
    assert!(log.borrow().closed);
}

#[test]
fn drop_without_close_does_not_terminate_stream() {
    let (sink, log) = RecordingSink::new();
    {
        let mut writer = ChunkedWriter::new(sink);
        writer.write(b"abc").unwrap();
        writer.flush().unwrap();
        writer.write(b"de").unwrap();
    }
    let log = log.borrow();
    assert!(log.closed);
    assert_eq!(log.data, b"3\r\nabc\r\n");
    assert_eq!(decode_chunked(&log.data), Err(DecodeError::Incomplete));
}

#[test]
fn drop_while_panicking_sends_nothing() {
    let (sink, log) = RecordingSink::new();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
        let mut writer = ChunkedWriter::new(sink);
        writer.write(b"abc").unwrap();
        panic!("producer failed");
    }));
    assert!(result.is_err());

    let log = log.borrow();
    assert!(log.closed);
    assert!(log.data.is_empty());
}

/// 読み込み元のエラーで中断したアップロードは受信側で不完全と判定される
#[test]
fn aborted_upload_is_not_terminated() {
    struct FailAfter<'a> {
        data: &'a [u8],
    }

    impl Read for FailAfter<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::other("source failed"));
            }
            self.data.read(buf)
        }
    }

    let (sink, log) = RecordingSink::new();
    let mut writer = ChunkedWriter::new(sink);
    let result = ChunkedUpload::new(FailAfter { data: b"abc" }, "text/plain")
        .write_to(&mut writer, &mut NoProgress);
    assert!(matches!(result, Err(Error::Io(_))));
    drop(writer);

    let log = log.borrow();
    assert!(log.closed);
    assert_eq!(log.data, b"3\r\nabc\r\n");
    assert_eq!(decode_chunked(&log.data), Err(DecodeError::Incomplete));
}

/// フレームの途中で書き込み先が失敗した後に close してもフレームを書き直さない
#[test]
fn close_after_mid_frame_failure_does_not_reframe() {
    let (sink, log) = RecordingSink::new();
    log.borrow_mut().fail_after = Some(1);
    let mut writer = ChunkedWriter::new(sink);
    writer.write(b"abc").unwrap();

    match writer.flush() {
        Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::TimedOut),
        other => panic!("unexpected: {:?}", other),
    }

    // 書き込み先が復旧しても送信しない
    log.borrow_mut().fail_after = None;
    assert!(matches!(writer.close(), Err(Error::Failed)));

    let log = log.borrow();
    assert!(log.closed);
    assert_eq!(log.data, b"3\r\n");
    assert!(decode_chunked(&log.data).is_err());
}

#[test]
fn flush_flushes_sink_only_when_data_is_sent() {
    let (sink, log) = RecordingSink::new();
    let mut writer = ChunkedWriter::new(sink);

    writer.flush().unwrap();
    assert_eq!(log.borrow().flushes, 0);

    writer.write(b"x").unwrap();
    writer.flush().unwrap();
    assert_eq!(log.borrow().flushes, 1);
}

#[test]
fn rejected_operations_leave_output_unchanged() {
    let (sink, log) = RecordingSink::new();
    let mut writer = ChunkedWriter::new(sink);
    writer.write(b"abc").unwrap();
    writer.finish().unwrap();
    let before = log.borrow().data.clone();

    assert!(matches!(writer.write(b"more"), Err(Error::AlreadyFinished)));
    assert!(matches!(writer.write_byte(b'!'), Err(Error::AlreadyFinished)));
    assert!(matches!(writer.flush(), Err(Error::AlreadyFinished)));
    writer.finish().unwrap();

    assert_eq!(log.borrow().data, before);
    assert!(writer.buffered().is_empty());
}
