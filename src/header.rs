//! # BMP 头部校验
//!
//! 解析固定布局的 BITMAPFILEHEADER 与 BITMAPINFOHEADER，逐项打分，
//! 并推导出图像几何信息 (宽、高、行跨度、行填充)。
//!
//! 每一项检查相互独立，只有当前模式下定义的全部检查都通过时才接受该图像，
//! 不存在"部分有效"的状态。

use crate::constants::{
    BMP_HEADER_SIZE, BYTES_PER_PIXEL, DECODE_CHECKS, ENCODE_CHECKS, FILE_HEADER_SIZE,
    INFO_HEADER_SIZE, LENGTH_PIXELS, SCANLINE_CAPACITY,
};
use crate::error::{Mode, StegError};

/// 未压缩 RGB (BI_RGB)。
const BI_RGB: u32 = 0;

fn le_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn le_i32(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// BITMAPFILEHEADER
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpFileHeader {
    pub signature: [u8; 2],
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    pub data_offset: u32,
}

impl BmpFileHeader {
    pub fn parse(bytes: &[u8; FILE_HEADER_SIZE]) -> Self {
        Self {
            signature: [bytes[0], bytes[1]],
            file_size: le_u32(bytes, 2),
            reserved1: le_u16(bytes, 6),
            reserved2: le_u16(bytes, 8),
            data_offset: le_u32(bytes, 10),
        }
    }
}

/// BITMAPINFOHEADER
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpInfoHeader {
    pub header_size: u32,
    pub width: i32,
    /// 符号表示行序 (正数自下而上)，校验只使用绝对值。
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pels_per_meter: i32,
    pub y_pels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

impl BmpInfoHeader {
    pub fn parse(bytes: &[u8; INFO_HEADER_SIZE]) -> Self {
        Self {
            header_size: le_u32(bytes, 0),
            width: le_i32(bytes, 4),
            height: le_i32(bytes, 8),
            planes: le_u16(bytes, 12),
            bit_count: le_u16(bytes, 14),
            compression: le_u32(bytes, 16),
            image_size: le_u32(bytes, 20),
            x_pels_per_meter: le_i32(bytes, 24),
            y_pels_per_meter: le_i32(bytes, 28),
            colors_used: le_u32(bytes, 32),
            colors_important: le_u32(bytes, 36),
        }
    }
}

/// 两个头部合在一起，即文件开头的 54 字节。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpHeaders {
    pub file: BmpFileHeader,
    pub info: BmpInfoHeader,
}

impl BmpHeaders {
    pub fn parse(bytes: &[u8; BMP_HEADER_SIZE]) -> Self {
        let (file, info) = bytes.split_at(FILE_HEADER_SIZE);
        let mut file_bytes = [0u8; FILE_HEADER_SIZE];
        let mut info_bytes = [0u8; INFO_HEADER_SIZE];
        file_bytes.copy_from_slice(file);
        info_bytes.copy_from_slice(info);

        Self {
            file: BmpFileHeader::parse(&file_bytes),
            info: BmpInfoHeader::parse(&info_bytes),
        }
    }
}

/// 单项头部检查。顺序即位掩码中的位序 (第 n 项对应 `1 << n`)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    SignatureB,
    SignatureM,
    Reserved,
    DataOffset,
    InfoHeaderSize,
    Dimensions,
    Planes,
    BitDepth,
    Compression,
    ImageSize,
    ColorsUsed,
    ColorsImportant,
    Stride,
    Padding,
    DataLength,
    Capacity,
}

impl Check {
    pub const ALL: [Check; ENCODE_CHECKS] = [
        Check::SignatureB,
        Check::SignatureM,
        Check::Reserved,
        Check::DataOffset,
        Check::InfoHeaderSize,
        Check::Dimensions,
        Check::Planes,
        Check::BitDepth,
        Check::Compression,
        Check::ImageSize,
        Check::ColorsUsed,
        Check::ColorsImportant,
        Check::Stride,
        Check::Padding,
        Check::DataLength,
        Check::Capacity,
    ];

    /// 该检查在诊断位掩码中对应的位。
    pub fn bit(self) -> u32 {
        1 << (self as u32)
    }

    pub fn description(self) -> &'static str {
        match self {
            Check::SignatureB => "signature byte 0 is 'B'",
            Check::SignatureM => "signature byte 1 is 'M'",
            Check::Reserved => "first reserved field is zero",
            Check::DataOffset => "pixel data offset follows the headers",
            Check::InfoHeaderSize => "info header size is 40",
            Check::Dimensions => "image has enough pixels",
            Check::Planes => "planes is 1",
            Check::BitDepth => "24 bits per pixel",
            Check::Compression => "uncompressed RGB",
            Check::ImageSize => "image data size is 0 or exact",
            Check::ColorsUsed => "no colors used",
            Check::ColorsImportant => "no important colors",
            Check::Stride => "row stride is 4-aligned and fits the scan-line buffer",
            Check::Padding => "row padding is non-negative",
            Check::DataLength => "pixel data length matches height * stride",
            Check::Capacity => "payload fits in the available pixels",
        }
    }
}

/// 通过校验后的图像几何信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// 每行像素数。
    pub width: usize,
    /// 行数 (高度的绝对值)。
    pub height: usize,
    /// 每行字节数，含填充，总是 4 的倍数。
    pub stride: usize,
    /// 每行末尾的填充字节数。
    pub padding: usize,
    /// 像素数据总长度 (`height * stride`)。
    pub data_len: u64,
}

impl Geometry {
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// 扣除长度头之后可用于数据的像素数，即最多可嵌入的字节数。
    pub fn capacity(&self) -> u64 {
        self.pixel_count().saturating_sub(LENGTH_PIXELS)
    }
}

/// 一次头部校验的完整结果：推导出的几何量与每项检查的结论。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    mode: Mode,
    width: i64,
    height: i64,
    stride: i64,
    padding: i64,
    data_len: i64,
    outcomes: Vec<(Check, bool)>,
}

impl Validation {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// 按检查顺序排列的全部结论。
    pub fn outcomes(&self) -> &[(Check, bool)] {
        &self.outcomes
    }

    /// 某项检查的结论；当前模式不包含该检查时返回 `None`。
    pub fn outcome(&self, check: Check) -> Option<bool> {
        self.outcomes
            .iter()
            .find(|(c, _)| *c == check)
            .map(|&(_, ok)| ok)
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|(_, ok)| *ok).count()
    }

    /// 当前模式要求通过的检查数。
    pub fn required(&self) -> usize {
        match self.mode {
            Mode::Encode => ENCODE_CHECKS,
            Mode::Decode => DECODE_CHECKS,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.passed() == self.required()
    }

    /// 已通过检查的位掩码，用于诊断输出。
    pub fn flags(&self) -> u32 {
        self.outcomes
            .iter()
            .filter(|(_, ok)| *ok)
            .fold(0, |flags, (check, _)| flags | check.bit())
    }

    pub fn failed(&self) -> impl Iterator<Item = Check> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, ok)| !*ok)
            .map(|&(check, _)| check)
    }

    /// 有效时返回几何信息。
    pub fn geometry(&self) -> Option<Geometry> {
        if !self.is_valid() {
            return None;
        }

        Some(Geometry {
            width: usize::try_from(self.width).ok()?,
            height: usize::try_from(self.height).ok()?,
            stride: usize::try_from(self.stride).ok()?,
            padding: usize::try_from(self.padding).ok()?,
            data_len: u64::try_from(self.data_len).ok()?,
        })
    }

    /// 将校验结果转为几何信息，未全部通过时返回带位掩码的错误。
    pub fn into_geometry(self) -> Result<Geometry, StegError> {
        self.geometry().ok_or(StegError::HeaderRejected {
            mode: self.mode,
            flags: self.flags(),
        })
    }
}

/// 对编码输入的头部打分 (16 项)。
///
/// * `file_size` - 整个 BMP 文件的字节数。
/// * `payload_len` - 待嵌入数据的字节数。
pub fn validate_for_encode(
    headers: &[u8; BMP_HEADER_SIZE],
    file_size: u64,
    payload_len: u64,
) -> Validation {
    score(headers, file_size, Some(payload_len))
}

/// 对解码输入的头部打分 (15 项)。
///
/// 此时还不知道嵌入数据的长度，容量检查推迟到解码器读出长度头之后。
pub fn validate_for_decode(headers: &[u8; BMP_HEADER_SIZE], file_size: u64) -> Validation {
    score(headers, file_size, None)
}

fn score(headers: &[u8; BMP_HEADER_SIZE], file_size: u64, payload_len: Option<u64>) -> Validation {
    let BmpHeaders { file, info } = BmpHeaders::parse(headers);
    let mode = if payload_len.is_some() {
        Mode::Encode
    } else {
        Mode::Decode
    };

    let width = i64::from(info.width);
    let height = i64::from(info.height).abs();
    let data_len = i64::try_from(file_size)
        .unwrap_or(i64::MAX)
        .saturating_sub(BMP_HEADER_SIZE as i64);
    let stride = width
        .checked_mul(i64::from(info.bit_count))
        .and_then(|bits| bits.checked_add(31))
        .map(|bits| (bits & !31) >> 3);
    let padding = stride.and_then(|stride| {
        width
            .checked_mul(BYTES_PER_PIXEL as i64)
            .and_then(|row| stride.checked_sub(row))
    });
    let pixels = width.checked_mul(height);
    let expected_len = stride.and_then(|stride| height.checked_mul(stride));

    let dimensions = match mode {
        Mode::Encode => width > 0 && height > 0,
        Mode::Decode => pixels.is_some_and(|pixels| pixels > LENGTH_PIXELS as i64),
    };

    let mut outcomes = vec![
        (Check::SignatureB, file.signature[0] == b'B'),
        (Check::SignatureM, file.signature[1] == b'M'),
        (Check::Reserved, file.reserved1 == 0),
        (Check::DataOffset, file.data_offset == BMP_HEADER_SIZE as u32),
        (Check::InfoHeaderSize, info.header_size == INFO_HEADER_SIZE as u32),
        (Check::Dimensions, dimensions),
        (Check::Planes, info.planes == 1),
        (Check::BitDepth, info.bit_count == crate::constants::BITS_PER_PIXEL),
        (Check::Compression, info.compression == BI_RGB),
        (
            Check::ImageSize,
            info.image_size == 0 || i64::from(info.image_size) == data_len,
        ),
        (Check::ColorsUsed, info.colors_used == 0),
        (Check::ColorsImportant, info.colors_important == 0),
        (
            Check::Stride,
            stride.is_some_and(|stride| stride % 4 == 0 && stride < SCANLINE_CAPACITY as i64),
        ),
        (Check::Padding, padding.is_some_and(|padding| padding >= 0)),
        (Check::DataLength, expected_len == Some(data_len)),
    ];

    if let Some(payload_len) = payload_len {
        let fits = pixels
            .and_then(|pixels| pixels.checked_sub(LENGTH_PIXELS as i64))
            .is_some_and(|capacity| i64::try_from(payload_len).is_ok_and(|len| capacity >= len));
        outcomes.push((Check::Capacity, fits));
    }

    // 溢出的几何量记为 -1，对应的检查已失败，不会产生几何信息。
    let stride = stride.unwrap_or(-1);
    let padding = padding.unwrap_or(-1);

    Validation {
        mode,
        width,
        height,
        stride,
        padding,
        data_len,
        outcomes,
    }
}
