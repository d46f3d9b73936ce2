//! # 填充模式
//!
//! 数据写完之后，剩余像素可以写入随机位来掩盖嵌入区域与未修改区域之间的分界。

use std::fmt;

use clap::ValueEnum;
use rand::RngCore;

use crate::constants::FILL_MASK;

/// 数据用尽后对剩余像素的处理方式。每次编码只选择一次。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FillMode {
    /// 不修改剩余像素。
    #[default]
    #[value(name = "n", alias = "none")]
    None,

    /// 写入均匀随机的字节。
    #[value(name = "r", alias = "random")]
    Random,

    /// 写入偏暗的随机字节 (掩码外的位全部为 0)。
    #[value(name = "d", alias = "dark")]
    Dark,

    /// 写入偏亮的随机字节 (掩码外的位全部为 1)。
    #[value(name = "l", alias = "light")]
    Light,
}

impl FillMode {
    /// 为一个剩余像素生成填充字节；`None` 模式返回 `None`，像素保持原样。
    pub fn fill_byte<G: RngCore + ?Sized>(self, rng: &mut G) -> Option<u8> {
        let byte = match self {
            FillMode::None => return None,
            FillMode::Random => random_byte(rng),
            FillMode::Dark => random_byte(rng) & FILL_MASK,
            FillMode::Light => random_byte(rng) | !FILL_MASK,
        };
        Some(byte)
    }
}

impl fmt::Display for FillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FillMode::None => "none",
            FillMode::Random => "random",
            FillMode::Dark => "dark bias",
            FillMode::Light => "light bias",
        };
        f.write_str(name)
    }
}

fn random_byte<G: RngCore + ?Sized>(rng: &mut G) -> u8 {
    rng.next_u32().to_le_bytes()[0]
}
