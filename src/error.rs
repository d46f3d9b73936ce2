//! # 错误类型
//!
//! 核心库的所有失败都归入 [`StegError`]。每一次运行中的错误都是致命的，
//! 不做重试；流式读写失败带有各自的数字代码，便于定位失败位置。

use std::fmt;
use std::io;

use thiserror::Error;

/// 头部校验所处的模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encode,
    Decode,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Encode => f.write_str("encode"),
            Mode::Decode => f.write_str("decode"),
        }
    }
}

/// 隐写编码/解码过程中可能出现的错误。
#[derive(Debug, Error)]
pub enum StegError {
    #[error("big-endian hosts are not supported")]
    UnsupportedHost,

    #[error("bitmap is too small to hold any payload: {size} bytes, need at least {minimum}")]
    BitmapTooSmall { size: u64, minimum: u64 },

    #[error("payload is empty")]
    PayloadEmpty,

    #[error("payload is too large: {size} bytes, at most {maximum} can be embedded")]
    PayloadTooLarge { size: u64, maximum: u64 },

    #[error("unable to read bitmap headers")]
    HeaderRead(#[source] io::Error),

    #[error("unable to write bitmap headers")]
    HeaderWrite(#[source] io::Error),

    #[error("bitmap header check failed for {mode} ({flags:08X})")]
    HeaderRejected { mode: Mode, flags: u32 },

    #[error("short read from source bitmap (code {code})")]
    SourceRead {
        code: i32,
        #[source]
        source: io::Error,
    },

    #[error("short write to output (code {code})")]
    OutputWrite {
        code: i32,
        #[source]
        source: io::Error,
    },

    #[error("bitmap ran out of pixels for the length header (code {code})")]
    PixelsExhausted { code: i32 },

    #[error("unable to read payload")]
    PayloadRead(#[source] io::Error),

    #[error("payload ended early: expected {expected} bytes, read {actual}")]
    PayloadTruncated { expected: u16, actual: u16 },

    #[error("embedded length {claimed} exceeds bitmap capacity {capacity}; no hidden data or corrupted image")]
    CapacityExceeded { claimed: u16, capacity: u64 },
}

impl StegError {
    /// 失败位置对应的数字代码。
    ///
    /// 流式失败使用与编码器/解码器内部位置一一对应的负数代码，
    /// 数据流读取失败为 `-10`，其余错误统一返回 `-1`。
    pub fn code(&self) -> i32 {
        match self {
            StegError::SourceRead { code, .. }
            | StegError::OutputWrite { code, .. }
            | StegError::PixelsExhausted { code } => *code,
            StegError::CapacityExceeded { .. } => crate::decoder::code::CAPACITY,
            StegError::PayloadRead(_) | StegError::PayloadTruncated { .. } => {
                crate::encoder::code::PAYLOAD_READ
            }
            _ => -1,
        }
    }
}
