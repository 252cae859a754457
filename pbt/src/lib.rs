//! PBT テスト共通ユーティリティ

use proptest::prelude::*;

// ========================================
// 書き込み操作の生成
// ========================================

/// ライターに対する操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// スライスを書き込む
    Write(Vec<u8>),
    /// 1 バイトを書き込む
    WriteByte(u8),
    /// チャンクとして送信する
    Flush,
}

/// 任意のバイト列 (空を含む)
pub fn bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..=max_len)
}

/// 単一の操作
pub fn write_op() -> impl Strategy<Value = WriteOp> {
    prop_oneof![
        4 => bytes(64).prop_map(WriteOp::Write),
        1 => any::<u8>().prop_map(WriteOp::WriteByte),
        2 => Just(WriteOp::Flush),
    ]
}

/// 操作列
pub fn write_ops() -> impl Strategy<Value = Vec<WriteOp>> {
    proptest::collection::vec(write_op(), 0..32)
}

// ========================================
// 期待値の計算
// ========================================

/// 書き込まれたバイト列をすべて連結する
pub fn concat_written(ops: &[WriteOp]) -> Vec<u8> {
    let mut body = Vec::new();
    for op in ops {
        match op {
            WriteOp::Write(data) => body.extend_from_slice(data),
            WriteOp::WriteByte(b) => body.push(*b),
            WriteOp::Flush => {}
        }
    }
    body
}

/// flush で区切られたチャンク (空のチャンクは含まない)
///
/// 最後の flush 以降のデータも 1 つのチャンクとして含める。
pub fn expected_chunks(ops: &[WriteOp]) -> Vec<Vec<u8>> {
    let mut chunks = Vec::new();
    let mut pending = Vec::new();
    for op in ops {
        match op {
            WriteOp::Write(data) => pending.extend_from_slice(data),
            WriteOp::WriteByte(b) => pending.push(*b),
            WriteOp::Flush => {
                if !pending.is_empty() {
                    chunks.push(std::mem::take(&mut pending));
                }
            }
        }
    }
    if !pending.is_empty() {
        chunks.push(pending);
    }
    chunks
}

/// 期待されるフレーム列 (終端チャンクを含む)
pub fn expected_frames(ops: &[WriteOp]) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in expected_chunks(ops) {
        out.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
        out.extend_from_slice(&chunk);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"0\r\n\r\n");
    out
}
