//! # bmpsteg 库
//!
//! 在未压缩的 24 位 BMP 图像中隐藏任意二进制数据，并能从修改后的图像中还原。
//! 每个数据字节按 3+2+3 位写入一个像素蓝、绿、红通道的低位。

// 声明库包含的所有模块。

pub mod cli;
pub mod codec;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod fill;
pub mod handler;
pub mod header;
pub mod host;
pub mod scanline;

pub use codec::{pack, unpack, Bgr};
pub use decoder::{extract, Decoder};
pub use encoder::{embed, Encoder};
pub use error::{Mode, StegError};
pub use fill::FillMode;
pub use header::{validate_for_decode, validate_for_encode, Check, Geometry, Validation};
pub use host::host_is_little_endian;
