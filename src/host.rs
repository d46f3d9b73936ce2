//! # 主机字节序检查
//!
//! 长度头按小端顺序拆成低字节与高字节，嵌入格式只在小端主机上定义。

/// 当前主机是否以小端顺序存储多字节整数。
pub fn host_is_little_endian() -> bool {
    u16::from_ne_bytes([0x00, 0x01]) == 0x0100
}
