/// BMP 文件头 (BITMAPFILEHEADER) 的大小 (字节)。
pub const FILE_HEADER_SIZE: usize = 14;

/// BMP 信息头 (BITMAPINFOHEADER) 的大小 (字节)。
pub const INFO_HEADER_SIZE: usize = 40;

/// 两个头部合计的大小，像素数据紧随其后。
pub const BMP_HEADER_SIZE: usize = FILE_HEADER_SIZE + INFO_HEADER_SIZE;

/// 扫描行缓冲区容量 (字节)，约可容纳 2700 像素宽的一行。
/// 行跨度必须严格小于该值。
pub const SCANLINE_CAPACITY: usize = 8192;

/// 至少能嵌入 1 个字节所需的像素数据量：
/// 长度头 2 个像素 + 1 个数据像素 = 9 字节，补齐到 4 的倍数为 12 字节。
pub const MIN_PIXEL_DATA: usize = 12;

/// 可嵌入数据的最大字节数 (长度头为 16 位)。
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

/// 用于存放数据长度的保留像素数。
pub const LENGTH_PIXELS: u64 = 2;

/// 编码模式下必须全部通过的头部检查项数。
pub const ENCODE_CHECKS: usize = 16;

/// 解码模式下必须全部通过的头部检查项数。
pub const DECODE_CHECKS: usize = 15;

/// 偏置填充掩码，按 B_G_R 排列为 001_01_001。
pub const FILL_MASK: u8 = 0x29;

/// 24 位 BMP 的每像素位数。
pub const BITS_PER_PIXEL: u16 = 24;

/// 每像素字节数 (蓝、绿、红)。
pub const BYTES_PER_PIXEL: usize = 3;
