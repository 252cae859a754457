//! tokio_chunked - Tokio integration for shiguredo_chunked
//!
//! tokio の `AsyncWrite` に chunked 形式で書き込む非同期ライター。
//!
//! ## 特徴
//!
//! - **shiguredo_chunked ベース**: フレーム形式とエラー型は shiguredo_chunked と共通
//! - **非同期 I/O**: flush / finish / close は書き込み先の完了を待つ
//!
//! ## 使い方
//!
//! ```ignore
//! use tokio_chunked::AsyncChunkedWriter;
//!
//! let stream = TcpStream::connect("127.0.0.1:8080").await?;
//! let mut writer = AsyncChunkedWriter::new(stream);
//! writer.write(b"Hello")?;
//! writer.flush().await?;
//! writer.close().await?;
//! ```
//!
//! ## 注意
//!
//! `shiguredo_chunked::ChunkedWriter` と同様に、drop 時に終端チャンクは送信されない。
//! 必ず `finish()` か `close()` を呼ぶこと。

mod copy;
mod writer;

pub use copy::copy_chunked;
pub use writer::AsyncChunkedWriter;

// shiguredo_chunked の型を re-export
pub use shiguredo_chunked::{Error, NoProgress, ProgressHandler};

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
