//! # 解码器
//!
//! 与编码器按相同的行序和像素顺序遍历：先从前两个像素读出 16 位长度，
//! 核对图像容量后，逐个像素还原数据字节并立即写出，读满长度后立刻停止，
//! 不再读取剩余像素。

use std::io::{Read, Write};

use crate::codec::unpack;
use crate::constants::BMP_HEADER_SIZE;
use crate::encoder::check_bitmap_size;
use crate::error::StegError;
use crate::header::{validate_for_decode, Geometry};
use crate::host::host_is_little_endian;
use crate::scanline::ScanLine;

/// 解码各失败位置的代码。
pub mod code {
    pub const FIRST_ROW_READ: i32 = -1;
    pub const LENGTH_HIGH_EXHAUSTED: i32 = -2;
    pub const LENGTH_HIGH_READ: i32 = -3;
    pub const CAPACITY: i32 = -4;
    pub const PAYLOAD_EXHAUSTED: i32 = -5;
    pub const PAYLOAD_READ: i32 = -6;
    pub const OUTPUT_WRITE: i32 = -7;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadingLengthLow,
    ReadingLengthHigh,
    ReadingPayload,
    Done,
}

fn advance<R: Read>(
    line: &mut ScanLine,
    src: &mut R,
    exhausted: i32,
    read: i32,
) -> Result<(), StegError> {
    if line.step() {
        return Ok(());
    }
    if !line.retire_row() {
        return Err(StegError::PixelsExhausted { code: exhausted });
    }
    line.load(src)
        .map_err(|source| StegError::SourceRead { code: read, source })
}

/// 像素数据解码器。
#[derive(Debug, Clone)]
pub struct Decoder {
    geometry: Geometry,
}

impl Decoder {
    pub fn new(geometry: Geometry) -> Self {
        Self { geometry }
    }

    /// 从 `src` (像素数据起始处) 还原嵌入的数据并写入 `out`。
    ///
    /// 返回还原出的字节数。嵌入的长度为 0 时不写出任何内容。
    ///
    /// # Errors
    ///
    /// * 读出的长度超过图像容量，说明图像中没有隐藏数据或已损坏。
    /// * 源图像读取不足或输出写入失败。
    pub fn decode<R: Read, W: Write>(&self, mut src: R, mut out: W) -> Result<u16, StegError> {
        let mut line = ScanLine::new(&self.geometry);
        let mut state = State::ReadingLengthLow;
        let mut length_low = 0;
        let mut length = 0;
        let mut remaining = 0;

        while state != State::Done {
            state = match state {
                State::ReadingLengthLow => {
                    line.load(&mut src).map_err(|source| StegError::SourceRead {
                        code: code::FIRST_ROW_READ,
                        source,
                    })?;
                    length_low = unpack(line.pixel());
                    advance(
                        &mut line,
                        &mut src,
                        code::LENGTH_HIGH_EXHAUSTED,
                        code::LENGTH_HIGH_READ,
                    )?;
                    State::ReadingLengthHigh
                }
                State::ReadingLengthHigh => {
                    length = u16::from_le_bytes([length_low, unpack(line.pixel())]);

                    let capacity = self.geometry.capacity();
                    if capacity < u64::from(length) {
                        return Err(StegError::CapacityExceeded {
                            claimed: length,
                            capacity,
                        });
                    }

                    remaining = length;
                    if remaining == 0 {
                        State::Done
                    } else {
                        State::ReadingPayload
                    }
                }
                State::ReadingPayload => {
                    advance(
                        &mut line,
                        &mut src,
                        code::PAYLOAD_EXHAUSTED,
                        code::PAYLOAD_READ,
                    )?;
                    out.write_all(&[unpack(line.pixel())])
                        .map_err(|source| StegError::OutputWrite {
                            code: code::OUTPUT_WRITE,
                            source,
                        })?;

                    remaining -= 1;
                    if remaining == 0 {
                        State::Done
                    } else {
                        State::ReadingPayload
                    }
                }
                State::Done => State::Done,
            };
        }

        out.flush().map_err(|source| StegError::OutputWrite {
            code: code::OUTPUT_WRITE,
            source,
        })?;

        Ok(length)
    }
}

/// 对整个 BMP 文件执行解码：读取并校验头部，再从像素数据中还原嵌入的数据。
///
/// * `bmp_size` - BMP 文件的总字节数。
pub fn extract<R: Read, W: Write>(mut bmp: R, bmp_size: u64, out: W) -> Result<u16, StegError> {
    if !host_is_little_endian() {
        return Err(StegError::UnsupportedHost);
    }
    check_bitmap_size(bmp_size)?;

    let mut headers = [0u8; BMP_HEADER_SIZE];
    bmp.read_exact(&mut headers).map_err(StegError::HeaderRead)?;

    let geometry = validate_for_decode(&headers, bmp_size).into_geometry()?;

    Decoder::new(geometry).decode(bmp, out)
}
