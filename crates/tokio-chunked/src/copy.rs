//! 非同期 chunked アップロード

use shiguredo_chunked::ProgressHandler;
use shiguredo_chunked::upload::DEFAULT_READ_BUFFER_SIZE;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

use crate::Result;
use crate::writer::AsyncChunkedWriter;

/// 読み込み元の内容をすべて chunked で送信して終端チャンクを送信
///
/// 読み込み 1 回分が 1 チャンクになり、読み込みのたびに累計送信バイト数を通知する。
/// 送信したバイト数を返す。
pub async fn copy_chunked<R, W, P>(
    reader: &mut R,
    writer: &mut AsyncChunkedWriter<W>,
    progress: &mut P,
    total_size: Option<u64>,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    P: ProgressHandler + ?Sized,
{
    let mut buf = vec![0u8; DEFAULT_READ_BUFFER_SIZE];
    let mut bytes_written = 0u64;

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        writer.write(&buf[..n])?;
        writer.flush().await?;
        bytes_written += n as u64;
        progress.on_progress(bytes_written, total_size);
    }

    writer.finish().await?;
    Ok(bytes_written)
}
