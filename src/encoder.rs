//! # 编码器
//!
//! 逐行读取源图像的像素数据：前两个像素写入 16 位数据长度 (先低字节后高字节)，
//! 之后每个像素写入一个数据字节，数据用尽后按填充模式处理剩余像素。
//! 每一行的最后一个像素处理完毕后立即写出该行，再读入下一行。

use std::io::{Read, Write};

use rand::RngCore;

use crate::codec::pack;
use crate::constants::{BMP_HEADER_SIZE, MAX_PAYLOAD_SIZE, MIN_PIXEL_DATA};
use crate::error::StegError;
use crate::fill::FillMode;
use crate::header::{validate_for_encode, Geometry};
use crate::host::host_is_little_endian;
use crate::scanline::ScanLine;

/// 编码各失败位置的代码。
pub mod code {
    pub const FIRST_ROW_READ: i32 = -1;
    pub const LENGTH_HIGH_EXHAUSTED: i32 = -2;
    pub const LENGTH_HIGH_WRITE: i32 = -3;
    pub const LENGTH_HIGH_READ: i32 = -4;
    pub const PAYLOAD_START_EXHAUSTED: i32 = -5;
    pub const PAYLOAD_START_WRITE: i32 = -6;
    pub const PAYLOAD_START_READ: i32 = -7;
    pub const ROW_WRITE: i32 = -8;
    pub const ROW_READ: i32 = -9;
    pub const PAYLOAD_READ: i32 = -10;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    WritingLengthLow,
    WritingLengthHigh,
    WritingPayload,
    Filling,
    Done,
}

/// 换行时使用的失败代码。`exhausted` 为 `None` 表示行用尽属于正常结束。
struct Sites {
    exhausted: Option<i32>,
    write: i32,
    read: i32,
}

const LENGTH_HIGH: Sites = Sites {
    exhausted: Some(code::LENGTH_HIGH_EXHAUSTED),
    write: code::LENGTH_HIGH_WRITE,
    read: code::LENGTH_HIGH_READ,
};

const PAYLOAD_START: Sites = Sites {
    exhausted: Some(code::PAYLOAD_START_EXHAUSTED),
    write: code::PAYLOAD_START_WRITE,
    read: code::PAYLOAD_START_READ,
};

const ROWS: Sites = Sites {
    exhausted: None,
    write: code::ROW_WRITE,
    read: code::ROW_READ,
};

/// 把游标移到下一个像素，必要时写出当前行并读入下一行。
///
/// 返回 `false` 表示最后一行已写出、图像已处理完。
fn advance<R: Read, W: Write>(
    line: &mut ScanLine,
    src: &mut R,
    out: &mut W,
    sites: &Sites,
) -> Result<bool, StegError> {
    if line.step() {
        return Ok(true);
    }

    let more = line.retire_row();
    if !more {
        if let Some(code) = sites.exhausted {
            return Err(StegError::PixelsExhausted { code });
        }
    }

    line.store(out).map_err(|source| StegError::OutputWrite {
        code: sites.write,
        source,
    })?;

    if !more {
        return Ok(false);
    }

    line.load(src).map_err(|source| StegError::SourceRead {
        code: sites.read,
        source,
    })?;

    Ok(true)
}

/// 像素数据编码器。
///
/// 填充用的随机源由调用方注入，测试中可使用固定种子。
pub struct Encoder<G> {
    geometry: Geometry,
    fill: FillMode,
    rng: G,
}

impl<G: RngCore> Encoder<G> {
    pub fn new(geometry: Geometry, fill: FillMode, rng: G) -> Self {
        Self {
            geometry,
            fill,
            rng,
        }
    }

    /// 从 `src` 读取像素数据，嵌入 `payload` 的前 `payload_len` 个字节后写入 `out`。
    ///
    /// `src` 和 `out` 都应位于像素数据的起始处 (头部之后)。
    ///
    /// # Errors
    ///
    /// * 数据长度超出图像容量。
    /// * 源图像读取不足、输出写入失败，或图像像素不足以容纳长度头。
    /// * 数据流在读满 `payload_len` 字节之前结束或读取出错。
    pub fn encode<R: Read, P: Read, W: Write>(
        &mut self,
        mut src: R,
        payload: P,
        payload_len: u16,
        mut out: W,
    ) -> Result<(), StegError> {
        let capacity = self.geometry.capacity();
        if u64::from(payload_len) > capacity {
            return Err(StegError::PayloadTooLarge {
                size: u64::from(payload_len),
                maximum: capacity,
            });
        }

        let [length_low, length_high] = payload_len.to_le_bytes();
        let mut payload = payload.bytes();
        let mut remaining = payload_len;
        let mut line = ScanLine::new(&self.geometry);
        let mut state = State::WritingLengthLow;

        while state != State::Done {
            state = match state {
                State::WritingLengthLow => {
                    line.load(&mut src).map_err(|source| StegError::SourceRead {
                        code: code::FIRST_ROW_READ,
                        source,
                    })?;
                    line.set_pixel(pack(length_low, line.pixel()));
                    advance(&mut line, &mut src, &mut out, &LENGTH_HIGH)?;
                    State::WritingLengthHigh
                }
                State::WritingLengthHigh => {
                    line.set_pixel(pack(length_high, line.pixel()));
                    advance(&mut line, &mut src, &mut out, &PAYLOAD_START)?;
                    if remaining > 0 {
                        State::WritingPayload
                    } else {
                        State::Filling
                    }
                }
                State::WritingPayload => {
                    let byte = match payload.next() {
                        Some(Ok(byte)) => byte,
                        Some(Err(e)) => return Err(StegError::PayloadRead(e)),
                        None => {
                            return Err(StegError::PayloadTruncated {
                                expected: payload_len,
                                actual: payload_len - remaining,
                            });
                        }
                    };
                    line.set_pixel(pack(byte, line.pixel()));
                    remaining -= 1;

                    if !advance(&mut line, &mut src, &mut out, &ROWS)? {
                        State::Done
                    } else if remaining == 0 {
                        State::Filling
                    } else {
                        State::WritingPayload
                    }
                }
                State::Filling => {
                    if let Some(byte) = self.fill.fill_byte(&mut self.rng) {
                        line.set_pixel(pack(byte, line.pixel()));
                    }

                    if advance(&mut line, &mut src, &mut out, &ROWS)? {
                        State::Filling
                    } else {
                        State::Done
                    }
                }
                State::Done => State::Done,
            };
        }

        out.flush().map_err(|source| StegError::OutputWrite {
            code: code::ROW_WRITE,
            source,
        })
    }
}

/// 对整个 BMP 文件执行编码：读取并校验头部，原样写出头部，再编码像素数据。
///
/// * `bmp_size` - 源 BMP 文件的总字节数。
/// * `payload_len` - 数据的总字节数，必须在 1..=65535 之间。
///
/// 成功时返回图像的几何信息。
pub fn embed<R: Read, P: Read, W: Write, G: RngCore>(
    mut bmp: R,
    bmp_size: u64,
    payload: P,
    payload_len: u64,
    mut out: W,
    fill: FillMode,
    rng: G,
) -> Result<Geometry, StegError> {
    check_sizes(bmp_size, payload_len)?;

    let mut headers = [0u8; BMP_HEADER_SIZE];
    bmp.read_exact(&mut headers).map_err(StegError::HeaderRead)?;

    let geometry = validate_for_encode(&headers, bmp_size, payload_len).into_geometry()?;

    out.write_all(&headers).map_err(StegError::HeaderWrite)?;

    let payload_len = u16::try_from(payload_len).map_err(|_| StegError::PayloadTooLarge {
        size: payload_len,
        maximum: MAX_PAYLOAD_SIZE as u64,
    })?;

    Encoder::new(geometry, fill, rng).encode(bmp, payload, payload_len, out)?;

    Ok(geometry)
}

fn check_sizes(bmp_size: u64, payload_len: u64) -> Result<(), StegError> {
    if !host_is_little_endian() {
        return Err(StegError::UnsupportedHost);
    }
    check_bitmap_size(bmp_size)?;
    if payload_len == 0 {
        return Err(StegError::PayloadEmpty);
    }
    if payload_len > MAX_PAYLOAD_SIZE as u64 {
        return Err(StegError::PayloadTooLarge {
            size: payload_len,
            maximum: MAX_PAYLOAD_SIZE as u64,
        });
    }
    Ok(())
}

/// BMP 文件至少要能放下头部和一个数据字节。
pub(crate) fn check_bitmap_size(bmp_size: u64) -> Result<(), StegError> {
    let minimum = (BMP_HEADER_SIZE + MIN_PIXEL_DATA) as u64;
    if bmp_size < minimum {
        return Err(StegError::BitmapTooSmall {
            size: bmp_size,
            minimum,
        });
    }
    Ok(())
}
