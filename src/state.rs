//! ライターの状態

use crate::error::Error;

/// ライターの状態
///
/// `ChunkedWriter` と tokio_chunked の `AsyncChunkedWriter` で共有する。
///
/// ```text
/// Active --finish--> Finished
///   |
///   +--- 書き込み先のエラー ---> Failed
/// ```
///
/// `Finished` と `Failed` からは遷移しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// データを受け付ける
    Active,
    /// 終端チャンク送信済み
    Finished,
    /// 書き込み先がエラーを返した
    ///
    /// フレームの途中まで送信されている可能性があるため、以降は何も送信しない。
    Failed,
}

impl WriterState {
    /// データを受け付けられるか確認
    pub fn ensure_active(self) -> Result<(), Error> {
        match self {
            WriterState::Active => Ok(()),
            WriterState::Finished => Err(Error::AlreadyFinished),
            WriterState::Failed => Err(Error::Failed),
        }
    }

    /// finish を実行する必要があるか確認
    ///
    /// 送信済みなら `Ok(false)`、失敗済みなら `Err(Error::Failed)` を返す。
    pub fn needs_finish(self) -> Result<bool, Error> {
        match self {
            WriterState::Active => Ok(true),
            WriterState::Finished => Ok(false),
            WriterState::Failed => Err(Error::Failed),
        }
    }
}
