//! Chunked Transfer Coding 書き込み (RFC 9112 Section 7.1)
//!
//! ## 概要
//!
//! 書き込まれたデータをメモリ上にバッファし、`flush()` が呼ばれた時点で
//! バッファの内容を 1 つのチャンクとして書き込み先に送信します。
//!
//! チャンクサイズはチャンクデータより前に送る必要があるため、
//! サイズが確定する `flush()` まではデータを送信しません。
//!
//! `finish()` は残りのデータを送信してから終端チャンク (`0\r\n\r\n`) を送信します。
//! `close()` は終端チャンク送信後に書き込み先を解放します。
//! 終端チャンクがないと相手側はボディの終わりを検出できず待ち続けるため、
//! どちらかを必ず呼ぶ必要があります。
//!
//! drop では終端チャンクを送信しません。途中で失敗したボディが
//! 完全なボディとして受信されないようにするためです。
//!
//! 書き込み先がエラーを返した後は、フレームの途中まで送信されている可能性があるため
//! 何も送信しません (`Error::Failed`)。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_chunked::ChunkedWriter;
//!
//! let mut out = Vec::new();
//! let mut writer = ChunkedWriter::new(&mut out);
//! writer.write(b"abcdefghijklmnopqrstuvwxyz").unwrap();
//! writer.flush().unwrap();
//! writer.write(b"abcde").unwrap();
//! writer.flush().unwrap();
//! writer.write(b"abcdefghij").unwrap();
//! writer.close().unwrap();
//!
//! assert_eq!(
//!     out,
//!     b"1a\r\nabcdefghijklmnopqrstuvwxyz\r\n5\r\nabcde\r\na\r\nabcdefghij\r\n0\r\n\r\n"
//! );
//! ```
//!
//! ## スレッド
//!
//! 単一の書き込み元から同期的に使うことを前提としています。
//! 複数スレッドから共有する場合は呼び出し側で `Mutex` などにより排他すること。

use std::io::{self, Write};

use crate::encoder::{CRLF, LAST_CHUNK, chunk_size_line};
use crate::error::Error;
use crate::state::WriterState;

/// バッファの初期容量 (デフォルト)
pub const DEFAULT_BUFFER_CAPACITY: usize = 32;

/// Chunked Transfer Coding ライター
///
/// 書き込み先 `W` を所有し、`close()` または drop で解放します。
/// drop は書き込み先を解放するだけで、終端チャンクは送信しません。
#[derive(Debug)]
pub struct ChunkedWriter<W: Write> {
    sink: W,
    buffer: Vec<u8>,
    state: WriterState,
}

impl<W: Write> ChunkedWriter<W> {
    /// 新しいライターを作成
    pub fn new(sink: W) -> Self {
        Self::with_capacity(sink, DEFAULT_BUFFER_CAPACITY)
    }

    /// バッファの初期容量を指定してライターを作成
    pub fn with_capacity(sink: W, capacity: usize) -> Self {
        Self {
            sink,
            buffer: Vec::with_capacity(capacity),
            state: WriterState::Active,
        }
    }

    /// データをバッファに追加
    ///
    /// 書き込み先には何も送信しません。
    pub fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        self.state.ensure_active()?;
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// 1 バイトをバッファに追加
    pub fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.state.ensure_active()?;
        self.buffer.push(byte);
        Ok(())
    }

    /// バッファの内容を 1 つのチャンクとして送信
    ///
    /// バッファが空の場合は何も送信しません。
    /// サイズ 0 のチャンクは終端チャンク専用のためです。
    ///
    /// 書き込み先がエラーを返した場合は `Failed` になり、以降の操作はすべて失敗します。
    pub fn flush(&mut self) -> Result<(), Error> {
        self.state.ensure_active()?;

        if self.buffer.is_empty() {
            return Ok(());
        }

        let result = write_frame(&mut self.sink, &self.buffer);
        self.check(result)?;
        self.buffer.clear();
        Ok(())
    }

    /// 残りのデータを送信してから終端チャンクを送信
    ///
    /// 書き込み先は解放しないため、続けて別のデータを送ることができます。
    /// 2 回目以降の呼び出しは何もしません。
    /// `Failed` の場合は何も送信せずに `Error::Failed` を返します。
    pub fn finish(&mut self) -> Result<(), Error> {
        if !self.state.needs_finish()? {
            return Ok(());
        }

        self.flush()?;
        let result = write_last_chunk(&mut self.sink);
        self.check(result)?;
        self.state = WriterState::Finished;
        Ok(())
    }

    /// 終端チャンクを送信して書き込み先を解放
    ///
    /// 送信に失敗した場合や既に `Failed` の場合でも書き込み先は解放され、
    /// そのエラーを返します。
    pub fn close(mut self) -> Result<(), Error> {
        self.finish()
    }

    /// 終端チャンクを送信済みか
    pub fn is_finished(&self) -> bool {
        self.state == WriterState::Finished
    }

    /// 現在の状態
    pub fn state(&self) -> WriterState {
        self.state
    }

    /// まだ送信していないデータ
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// 書き込み先への参照
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// 書き込み先への可変参照
    ///
    /// 直接書き込むとチャンクの境界が壊れるので注意すること。
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// 書き込み先のエラーで Failed に遷移する
    fn check(&mut self, result: io::Result<()>) -> Result<(), Error> {
        result.map_err(|e| {
            self.state = WriterState::Failed;
            Error::Io(e)
        })
    }
}

impl<W: Write> Write for ChunkedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        ChunkedWriter::write(self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        ChunkedWriter::flush(self)?;
        Ok(())
    }
}

fn write_frame<W: Write>(sink: &mut W, data: &[u8]) -> io::Result<()> {
    sink.write_all(&chunk_size_line(data.len()))?;
    sink.write_all(data)?;
    sink.write_all(CRLF)?;
    sink.flush()
}

fn write_last_chunk<W: Write>(sink: &mut W) -> io::Result<()> {
    sink.write_all(LAST_CHUNK)?;
    sink.flush()
}
