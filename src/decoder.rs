//! Chunked Transfer Coding デコーダー (Sans I/O)
//!
//! ## 概要
//!
//! `ChunkedWriter` が生成したボディを受信側で復元するためのデコーダーです。
//! メッセージのヘッダーは扱わず、chunked ボディのみをデコードします。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_chunked::{ChunkedDecoder, DecodeEvent};
//!
//! let mut decoder = ChunkedDecoder::new();
//! decoder.feed(b"5\r\nabcde\r\n0\r\n\r\n").unwrap();
//!
//! let mut body = Vec::new();
//! while let Some(event) = decoder.decode().unwrap() {
//!     match event {
//!         DecodeEvent::Data(data) => body.extend_from_slice(&data),
//!         DecodeEvent::Complete { .. } => break,
//!     }
//! }
//! assert_eq!(body, b"abcde");
//! assert!(decoder.is_complete());
//! ```

use crate::encoder::CRLF;
use crate::error::DecodeError;
use crate::limits::DecoderLimits;

/// デコード状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// チャンクサイズ行待ち
    Size,
    /// チャンクデータ待ち
    Data { remaining: usize },
    /// チャンクデータ後の CRLF 待ち
    DataCrlf,
    /// トレーラー待ち
    Trailer,
    /// 完了
    Complete,
}

/// デコード結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    /// チャンクデータ (チャンクの一部の場合もある)
    Data(Vec<u8>),
    /// 終端チャンクとトレーラーを受信した
    Complete { trailers: Vec<(String, String)> },
}

/// chunked ボディのデコーダー
#[derive(Debug)]
pub struct ChunkedDecoder {
    buf: Vec<u8>,
    phase: Phase,
    limits: DecoderLimits,
    body_size: usize,
    trailers: Vec<(String, String)>,
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkedDecoder {
    /// 新しいデコーダーを作成
    pub fn new() -> Self {
        Self::with_limits(DecoderLimits::default())
    }

    /// 制限を指定してデコーダーを作成
    pub fn with_limits(limits: DecoderLimits) -> Self {
        Self {
            buf: Vec::new(),
            phase: Phase::Size,
            limits,
            body_size: 0,
            trailers: Vec::new(),
        }
    }

    /// 制限設定を取得
    pub fn limits(&self) -> &DecoderLimits {
        &self.limits
    }

    /// 受信データを追加
    pub fn feed(&mut self, data: &[u8]) -> Result<(), DecodeError> {
        let limit = self.limits.max_buffer_size;
        let new_size = self
            .buf
            .len()
            .checked_add(data.len())
            .ok_or(DecodeError::BufferOverflow {
                size: usize::MAX,
                limit,
            })?;
        if new_size > limit {
            return Err(DecodeError::BufferOverflow {
                size: new_size,
                limit,
            });
        }
        self.buf.extend_from_slice(data);
        Ok(())
    }

    /// デコードを進める
    ///
    /// データが足りない場合は `Ok(None)` を返す。
    /// 完了後は常に `Ok(None)` を返す。
    pub fn decode(&mut self) -> Result<Option<DecodeEvent>, DecodeError> {
        loop {
            match self.phase {
                Phase::Size => {
                    let Some(pos) = find_line(&self.buf) else {
                        // 行が揃う前でも長さ制限は確認する
                        if self.buf.len() > self.limits.max_chunk_line_size {
                            return Err(DecodeError::ChunkLineTooLong {
                                size: self.buf.len(),
                                limit: self.limits.max_chunk_line_size,
                            });
                        }
                        return Ok(None);
                    };
                    if pos > self.limits.max_chunk_line_size {
                        return Err(DecodeError::ChunkLineTooLong {
                            size: pos,
                            limit: self.limits.max_chunk_line_size,
                        });
                    }

                    let chunk_size = parse_chunk_size(&self.buf[..pos])?;
                    self.buf.drain(..pos + 2);

                    if chunk_size == 0 {
                        self.phase = Phase::Trailer;
                        continue;
                    }

                    let new_size =
                        self.body_size
                            .checked_add(chunk_size)
                            .ok_or(DecodeError::BodyTooLarge {
                                size: usize::MAX,
                                limit: self.limits.max_body_size,
                            })?;
                    if new_size > self.limits.max_body_size {
                        return Err(DecodeError::BodyTooLarge {
                            size: new_size,
                            limit: self.limits.max_body_size,
                        });
                    }
                    self.body_size = new_size;
                    self.phase = Phase::Data {
                        remaining: chunk_size,
                    };
                }
                Phase::Data { remaining } => {
                    if self.buf.is_empty() {
                        return Ok(None);
                    }
                    let len = remaining.min(self.buf.len());
                    let data: Vec<u8> = self.buf.drain(..len).collect();
                    self.phase = if len == remaining {
                        Phase::DataCrlf
                    } else {
                        Phase::Data {
                            remaining: remaining - len,
                        }
                    };
                    return Ok(Some(DecodeEvent::Data(data)));
                }
                Phase::DataCrlf => {
                    if self.buf.len() < 2 {
                        return Ok(None);
                    }
                    if self.buf[..2] != *CRLF {
                        return Err(DecodeError::InvalidData(
                            "invalid chunked encoding: expected CRLF after chunk data".to_string(),
                        ));
                    }
                    self.buf.drain(..2);
                    self.phase = Phase::Size;
                }
                Phase::Trailer => {
                    let Some(pos) = find_line(&self.buf) else {
                        if self.buf.len() > self.limits.max_trailer_line_size {
                            return Err(DecodeError::TrailerLineTooLong {
                                size: self.buf.len(),
                                limit: self.limits.max_trailer_line_size,
                            });
                        }
                        return Ok(None);
                    };

                    if pos == 0 {
                        self.buf.drain(..2);
                        self.phase = Phase::Complete;
                        return Ok(Some(DecodeEvent::Complete {
                            trailers: std::mem::take(&mut self.trailers),
                        }));
                    }

                    if pos > self.limits.max_trailer_line_size {
                        return Err(DecodeError::TrailerLineTooLong {
                            size: pos,
                            limit: self.limits.max_trailer_line_size,
                        });
                    }
                    if self.trailers.len() >= self.limits.max_trailers_count {
                        return Err(DecodeError::TooManyTrailers {
                            count: self.trailers.len() + 1,
                            limit: self.limits.max_trailers_count,
                        });
                    }

                    let field = parse_trailer_line(&self.buf[..pos])?;
                    self.buf.drain(..pos + 2);
                    self.trailers.push(field);
                }
                Phase::Complete => return Ok(None),
            }
        }
    }

    /// 終端チャンクまで受信したか
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// デコード済みのボディサイズ (受信済みチャンクサイズの合計)
    pub fn body_size(&self) -> usize {
        self.body_size
    }

    /// 未処理のデータ
    ///
    /// 完了後は終端チャンクより後ろに受信したデータ (次のメッセージなど) を返す。
    pub fn remaining(&self) -> &[u8] {
        &self.buf
    }

    /// リセット
    pub fn reset(&mut self) {
        self.buf.clear();
        self.phase = Phase::Size;
        self.body_size = 0;
        self.trailers.clear();
    }
}

/// chunked ボディ全体をデコード
///
/// 制限なしでデコードする。終端チャンクがない場合は `DecodeError::Incomplete`、
/// 終端チャンクの後ろにデータがある場合は `DecodeError::InvalidData` を返す。
pub fn decode_chunked(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut decoder = ChunkedDecoder::with_limits(DecoderLimits::unlimited());
    decoder.feed(input)?;

    let mut body = Vec::new();
    loop {
        match decoder.decode()? {
            Some(DecodeEvent::Data(data)) => body.extend_from_slice(&data),
            Some(DecodeEvent::Complete { .. }) => break,
            None => return Err(DecodeError::Incomplete),
        }
    }

    if !decoder.remaining().is_empty() {
        return Err(DecodeError::InvalidData(
            "trailing data after last chunk".to_string(),
        ));
    }
    Ok(body)
}

/// CRLF で終わる行を探す
fn find_line(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF)
}

/// チャンクサイズ行をパース (拡張は無視)
fn parse_chunk_size(line: &[u8]) -> Result<usize, DecodeError> {
    let line = std::str::from_utf8(line)
        .map_err(|e| DecodeError::InvalidData(format!("invalid UTF-8: {e}")))?;
    let size_str = line.split(';').next().unwrap_or(line).trim();

    // from_str_radix は先頭の '+' を受け付けるため事前に確認する
    if size_str.is_empty() || !size_str.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DecodeError::InvalidData(format!(
            "invalid chunk size: {}",
            size_str
        )));
    }
    usize::from_str_radix(size_str, 16)
        .map_err(|_| DecodeError::InvalidData(format!("invalid chunk size: {}", size_str)))
}

/// トレーラー行をパース
fn parse_trailer_line(line: &[u8]) -> Result<(String, String), DecodeError> {
    let line = std::str::from_utf8(line)
        .map_err(|e| DecodeError::InvalidData(format!("invalid UTF-8: {e}")))?;

    // obs-fold は受け付けない
    if line.starts_with(' ') || line.starts_with('\t') {
        return Err(DecodeError::InvalidData(
            "obsolete line folding in trailer".to_string(),
        ));
    }

    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| DecodeError::InvalidData(format!("invalid trailer line: {}", line)))?;
    if name.is_empty() || !name.bytes().all(is_token_char) {
        return Err(DecodeError::InvalidData(format!(
            "invalid trailer name: {}",
            name
        )));
    }

    Ok((name.to_string(), value.trim().to_string()))
}

fn is_token_char(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'0'..=b'9' | b'A'..=b'Z' | b'^' | b'_' | b'`' | b'a'..=b'z' | b'|' | b'~'
    )
}
