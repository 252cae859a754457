//! # shiguredo_chunked
//!
//! 依存なしの HTTP/1.1 Chunked Transfer Coding ライブラリ
//!
//! ## 特徴
//!
//! - **依存なし**: 標準ライブラリのみ使用
//! - **ストリーム**: `std::io::Write` を実装した書き込み先にそのまま書き込める
//! - **Sans I/O デコーダー**: 受信側の検証用に I/O を分離したデコーダーを提供
//!
//! ## フレーム形式 (RFC 9112 Section 7.1)
//!
//! ```text
//! <chunk-size (16進数)>\r\n
//! <chunk-data>\r\n          ; 空でない flush ごと
//! 0\r\n\r\n                 ; 終端チャンク (1 回だけ)
//! ```
//!
//! ## 使い方
//!
//! ### 送信
//!
//! ```rust
//! use shiguredo_chunked::ChunkedWriter;
//!
//! let mut out = Vec::new();
//! let mut writer = ChunkedWriter::new(&mut out);
//! writer.write(b"Hello, ").unwrap();
//! writer.write(b"World!").unwrap();
//! // flush でバッファの内容が 1 チャンクになる
//! writer.flush().unwrap();
//! // 終端チャンクを送信して書き込み先を解放
//! writer.close().unwrap();
//!
//! assert_eq!(out, b"d\r\nHello, World!\r\n0\r\n\r\n");
//! ```
//!
//! ### 受信
//!
//! ```rust
//! use shiguredo_chunked::decode_chunked;
//!
//! let body = decode_chunked(b"d\r\nHello, World!\r\n0\r\n\r\n").unwrap();
//! assert_eq!(body, b"Hello, World!");
//! ```

mod decoder;
mod encoder;
mod error;
mod limits;
mod state;
pub mod upload;
mod writer;

pub use decoder::{ChunkedDecoder, DecodeEvent, decode_chunked};
pub use encoder::{CRLF, LAST_CHUNK, chunk_size_line, encode_chunk, encode_chunks};
pub use error::{DecodeError, Error};
pub use limits::DecoderLimits;
pub use state::WriterState;
pub use upload::{ChunkedUpload, NoProgress, ProgressHandler};
pub use writer::{ChunkedWriter, DEFAULT_BUFFER_CAPACITY};
