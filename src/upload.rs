//! chunked アップロード
//!
//! ファイルやバッファの内容を `ChunkedWriter` に流し込みます。
//! 読み込み 1 回分が 1 チャンクになり、読み込みのたびに累計送信バイト数を通知します。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_chunked::{ChunkedUpload, ChunkedWriter};
//!
//! let mut out = Vec::new();
//! let mut writer = ChunkedWriter::new(&mut out);
//! let upload = ChunkedUpload::new(&b"hello"[..], "text/plain").with_read_buffer_size(2);
//! let mut progress = Vec::new();
//! let sent = upload
//!     .write_to(&mut writer, &mut |written: u64, _total: Option<u64>| {
//!         progress.push(written)
//!     })
//!     .unwrap();
//! writer.close().unwrap();
//!
//! assert_eq!(sent, 5);
//! assert_eq!(progress, [2, 4, 5]);
//! assert_eq!(out, b"2\r\nhe\r\n2\r\nll\r\n1\r\no\r\n0\r\n\r\n");
//! ```

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use crate::error::Error;
use crate::writer::ChunkedWriter;

/// 読み込みバッファサイズ (デフォルト)
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

/// 進捗通知
pub trait ProgressHandler {
    /// 累計送信バイト数と全体サイズ (不明な場合は `None`) を受け取る
    fn on_progress(&mut self, bytes_written: u64, total_size: Option<u64>);
}

impl<F> ProgressHandler for F
where
    F: FnMut(u64, Option<u64>),
{
    fn on_progress(&mut self, bytes_written: u64, total_size: Option<u64>) {
        self(bytes_written, total_size)
    }
}

/// 進捗を通知しない
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressHandler for NoProgress {
    fn on_progress(&mut self, _bytes_written: u64, _total_size: Option<u64>) {}
}

/// chunked で送信するアップロード
///
/// 一度しか送信できない (読み込み元を消費する)。
#[derive(Debug)]
pub struct ChunkedUpload<R> {
    reader: R,
    content_type: String,
    total_size: Option<u64>,
    read_buffer_size: usize,
}

impl ChunkedUpload<File> {
    /// ファイルを開いてアップロードを作成
    ///
    /// 全体サイズはファイルのメタデータから取得する。
    pub fn open<P: AsRef<Path>>(path: P, content_type: &str) -> Result<Self, Error> {
        let file = File::open(path)?;
        let total_size = file.metadata()?.len();
        Ok(Self::new(file, content_type).with_total_size(total_size))
    }
}

impl<R: Read> ChunkedUpload<R> {
    /// 新しいアップロードを作成
    pub fn new(reader: R, content_type: &str) -> Self {
        Self {
            reader,
            content_type: content_type.to_string(),
            total_size: None,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }

    /// 進捗通知用の全体サイズを設定
    pub fn with_total_size(mut self, total_size: u64) -> Self {
        self.total_size = Some(total_size);
        self
    }

    /// 読み込みバッファサイズを設定 (1 未満は 1 として扱う)
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }

    /// Content-Type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Content-Length
    ///
    /// chunked で送信するため常に `None`
    pub fn content_length(&self) -> Option<u64> {
        None
    }

    /// Transfer-Encoding: chunked で送信するか
    pub fn is_chunked(&self) -> bool {
        true
    }

    /// 進捗通知用の全体サイズ
    pub fn total_size(&self) -> Option<u64> {
        self.total_size
    }

    /// 読み込み元の内容をすべて送信して終端チャンクを送信
    ///
    /// 送信したバイト数を返す。
    pub fn write_to<W, P>(
        mut self,
        writer: &mut ChunkedWriter<W>,
        progress: &mut P,
    ) -> Result<u64, Error>
    where
        W: Write,
        P: ProgressHandler + ?Sized,
    {
        let mut buf = vec![0u8; self.read_buffer_size];
        let mut bytes_written = 0u64;

        loop {
            let n = match self.reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            };

            writer.write(&buf[..n])?;
            writer.flush()?;
            bytes_written += n as u64;
            progress.on_progress(bytes_written, self.total_size);
        }

        writer.finish()?;
        Ok(bytes_written)
    }
}
