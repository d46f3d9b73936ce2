//! # 位打包编解码
//!
//! 每个数据字节拆成 3+2+3 位，写入一个像素蓝、绿、红三个通道的低位。
//! 人眼对绿色亮度变化更敏感，因此绿色通道只占用 2 位。

/// 蓝色通道保留高 5 位。
const BLUE_KEEP: u8 = 0xF8;
/// 绿色通道保留高 6 位。
const GREEN_KEEP: u8 = 0xFC;
/// 红色通道保留高 5 位。
const RED_KEEP: u8 = 0xF8;

/// 一个 24 位像素，按 BMP 的存储顺序 (蓝、绿、红) 排列。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bgr {
    pub blue: u8,
    pub green: u8,
    pub red: u8,
}

impl Bgr {
    pub fn new(blue: u8, green: u8, red: u8) -> Self {
        Self { blue, green, red }
    }

    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [self.blue, self.green, self.red]
    }
}

/// 将 `byte` 写入像素的低位，其余位保持不变。
pub fn pack(byte: u8, pixel: Bgr) -> Bgr {
    Bgr {
        blue: (pixel.blue & BLUE_KEEP) | (byte & 0x07),
        green: (pixel.green & GREEN_KEEP) | ((byte >> 3) & 0x03),
        red: (pixel.red & RED_KEEP) | ((byte >> 5) & 0x07),
    }
}

/// 从像素的低位还原出一个字节，是 [`pack`] 的逆运算。
pub fn unpack(pixel: Bgr) -> u8 {
    (pixel.blue & 0x07) | ((pixel.green & 0x03) << 3) | ((pixel.red & 0x07) << 5)
}
