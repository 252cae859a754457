use std::fmt;

/// チャンク書き込みエラー
#[derive(Debug)]
pub enum Error {
    /// 終端チャンク送信後の書き込み
    AlreadyFinished,
    /// 以前の書き込みで書き込み先がエラーを返した
    ///
    /// ストリームは途中までしか書き込まれていない可能性があるため、
    /// それ以降は何も書き込まない。
    Failed,
    /// 書き込み先の I/O エラー
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AlreadyFinished => write!(f, "the termination chunk was sent"),
            Error::Failed => write!(f, "a previous write to the sink failed"),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::AlreadyFinished | Error::Failed => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<Error> for std::io::Error {
    fn from(e: Error) -> Self {
        match e {
            // I/O エラーはそのまま返す
            Error::Io(e) => e,
            e @ (Error::AlreadyFinished | Error::Failed) => std::io::Error::other(e),
        }
    }
}

/// チャンクデコードエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// 不正なデータ
    InvalidData(String),
    /// バッファサイズ超過
    BufferOverflow { size: usize, limit: usize },
    /// チャンクサイズ行が長すぎる
    ChunkLineTooLong { size: usize, limit: usize },
    /// ボディサイズ超過
    BodyTooLarge { size: usize, limit: usize },
    /// トレーラー数超過
    TooManyTrailers { count: usize, limit: usize },
    /// トレーラー行が長すぎる
    TrailerLineTooLong { size: usize, limit: usize },
    /// 終端チャンクを受信する前に入力が終わった
    Incomplete,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidData(msg) => write!(f, "invalid data: {}", msg),
            DecodeError::BufferOverflow { size, limit } => {
                write!(f, "buffer overflow: {} > {}", size, limit)
            }
            DecodeError::ChunkLineTooLong { size, limit } => {
                write!(f, "chunk line too long: {} > {}", size, limit)
            }
            DecodeError::BodyTooLarge { size, limit } => {
                write!(f, "body too large: {} > {}", size, limit)
            }
            DecodeError::TooManyTrailers { count, limit } => {
                write!(f, "too many trailers: {} > {}", count, limit)
            }
            DecodeError::TrailerLineTooLong { size, limit } => {
                write!(f, "trailer line too long: {} > {}", size, limit)
            }
            DecodeError::Incomplete => write!(f, "incomplete chunked body"),
        }
    }
}

impl std::error::Error for DecodeError {}
