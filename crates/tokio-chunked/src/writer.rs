//! 非同期 chunked ライター

use shiguredo_chunked::{
    CRLF, DEFAULT_BUFFER_CAPACITY, Error, LAST_CHUNK, WriterState, chunk_size_line,
};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::Result;

/// 非同期 Chunked Transfer Coding ライター
///
/// フレーム形式と状態遷移は `shiguredo_chunked::ChunkedWriter` と同じ。
/// 書き込み先がエラーを返した後は `WriterState::Failed` になり、何も送信しない。
#[derive(Debug)]
pub struct AsyncChunkedWriter<W> {
    sink: W,
    buffer: Vec<u8>,
    state: WriterState,
}

impl<W: AsyncWrite + Unpin> AsyncChunkedWriter<W> {
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
    /// 書き込み先には触れないため待つ必要はない。
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.state.ensure_active()?;
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// 1 バイトをバッファに追加
    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.state.ensure_active()?;
        self.buffer.push(byte);
        Ok(())
    }

    /// バッファの内容を 1 つのチャンクとして送信
    pub async fn flush(&mut self) -> Result<()> {
        self.state.ensure_active()?;

        if self.buffer.is_empty() {
            return Ok(());
        }

        let result = write_frame(&mut self.sink, &self.buffer).await;
        self.check(result)?;
        self.buffer.clear();
        Ok(())
    }

    /// 残りのデータを送信してから終端チャンクを送信
    ///
    /// 2 回目以降の呼び出しは何もしない。
    pub async fn finish(&mut self) -> Result<()> {
        if !self.state.needs_finish()? {
            return Ok(());
        }

        self.flush().await?;
        let result = write_last_chunk(&mut self.sink).await;
        self.check(result)?;
        self.state = WriterState::Finished;
        Ok(())
    }

    /// 終端チャンクを送信して書き込み先を shutdown する
    ///
    /// 終端チャンクの送信に失敗しても shutdown は行い、最初のエラーを返す。
    /// 既に `Failed` の場合は何も送信せずに shutdown だけ行う。
    pub async fn close(mut self) -> Result<()> {
        let finished = self.finish().await;
        let shutdown = self.sink.shutdown().await;
        finished?;
        shutdown?;
        Ok(())
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
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// 書き込み先を取り出す
    ///
    /// 未送信のデータは捨てられる。
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn check(&mut self, result: std::io::Result<()>) -> Result<()> {
        result.map_err(|e| {
            self.state = WriterState::Failed;
            Error::Io(e)
        })
    }
}

async fn write_frame<W: AsyncWrite + Unpin>(sink: &mut W, data: &[u8]) -> std::io::Result<()> {
    sink.write_all(&chunk_size_line(data.len())).await?;
    sink.write_all(data).await?;
    sink.write_all(CRLF).await?;
    sink.flush().await
}

async fn write_last_chunk<W: AsyncWrite + Unpin>(sink: &mut W) -> std::io::Result<()> {
    sink.write_all(LAST_CHUNK).await?;
    sink.flush().await
}
