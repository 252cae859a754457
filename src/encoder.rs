//! Chunked Transfer Coding のフレーム定義

/// 行終端
pub const CRLF: &[u8] = b"\r\n";

/// 終端チャンク (last-chunk + 空トレーラー)
pub const LAST_CHUNK: &[u8] = b"0\r\n\r\n";

/// チャンクサイズ行 (16進数小文字 + CRLF)
///
/// サイズ 0 は終端チャンク専用のため、データチャンクでは使わないこと。
pub fn chunk_size_line(len: usize) -> Vec<u8> {
    format!("{:x}\r\n", len).into_bytes()
}

/// Chunked Transfer Encoding 用のチャンクをエンコード
///
/// データを HTTP chunked 形式にエンコードします。
/// 空のデータを渡すと終端チャンク (0\r\n\r\n) を生成します。
pub fn encode_chunk(data: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();

    if data.is_empty() {
        // 終端チャンク
        buf.extend_from_slice(LAST_CHUNK);
    } else {
        buf.extend_from_slice(&chunk_size_line(data.len()));
        buf.extend_from_slice(data);
        buf.extend_from_slice(CRLF);
    }

    buf
}

/// 複数のデータを chunked 形式でエンコード
///
/// すべてのチャンクを結合し、終端チャンクも追加します。
/// 空のデータは途中で終端チャンクになってしまうため読み飛ばします。
pub fn encode_chunks(chunks: &[&[u8]]) -> Vec<u8> {
    let mut buf = Vec::new();

    for chunk in chunks.iter().filter(|chunk| !chunk.is_empty()) {
        buf.extend_from_slice(&encode_chunk(chunk));
    }

    buf.extend_from_slice(LAST_CHUNK);

    buf
}
