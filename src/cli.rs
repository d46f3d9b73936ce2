//! # 命令行接口模块
//!
//! `encode` 接收 `<BMP_IN> <DATA_IN> <BMP_OUT> <FILL>`，`decode` 接收 `<BMP_IN> <DATA_OUT>`，
//! 两者都可用 `--force` 覆盖已存在的输出文件。

use clap::Parser;
use std::path::PathBuf;

use crate::fill::FillMode;

/// 将任意文件隐藏到未压缩的 24 位 RGB BMP 图像中，或从中还原。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "将任意文件隐藏到未压缩的 24 位 RGB BMP 图像中，或从中还原。\n\
                  <bmp in> 必须是不含色彩空间信息的 24 位未压缩 RGB 位图，数据文件最大 65535 字节。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：encode (嵌入) 和 decode (还原)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 把数据文件嵌入 BMP 图像，结果保存为新的 BMP。
    #[command(visible_alias = "e")]
    Encode(EncodeArgs),

    /// 从经过嵌入的 BMP 图像中还原数据文件。
    #[command(visible_alias = "d")]
    Decode(DecodeArgs),
}

/// 'encode' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// 作为载体的 24 位 BMP 图像。
    #[arg(value_name = "BMP_IN")]
    pub image: PathBuf,

    /// 要嵌入的数据文件 (1 到 65535 字节)。
    #[arg(value_name = "DATA_IN")]
    pub data: PathBuf,

    /// 嵌入完成后的输出图像路径。
    #[arg(value_name = "BMP_OUT")]
    pub dest: PathBuf,

    /// 剩余像素的填充方式：r 随机，d 偏暗随机，l 偏亮随机，n 不填充。
    /// 输出图像出现明显条带时可以换一种方式试试。
    #[arg(value_name = "FILL", value_enum)]
    pub fill: FillMode,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'decode' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// 含有嵌入数据的 BMP 图像。
    #[arg(value_name = "BMP_IN")]
    pub image: PathBuf,

    /// 还原出的数据的保存路径。
    #[arg(value_name = "DATA_OUT")]
    pub data: PathBuf,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}
