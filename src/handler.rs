//! # 命令处理逻辑模块
//!
//! 包含处理 `encode` 和 `decode` 子命令的高级业务逻辑。
//! 本模块负责输入检查、打开文件、调用核心编码/解码流程以及向用户报告结果。
//! 核心流程失败时，已写出一部分的输出文件会被删除。

use crate::cli::{DecodeArgs, EncodeArgs};
use crate::constants::{BMP_HEADER_SIZE, MAX_PAYLOAD_SIZE, MIN_PIXEL_DATA};
use crate::decoder::extract;
use crate::encoder::embed;
use crate::error::StegError;
use crate::host::host_is_little_endian;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// 确认主机为小端字节序，否则拒绝运行。
fn ensure_supported_host() -> Result<()> {
    if !host_is_little_endian() {
        return Err(StegError::UnsupportedHost.into());
    }
    Ok(())
}

/// 输出文件已存在且未指定 `--force` 时报错。
fn ensure_writable(dest: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !dest.exists(),
        "Output file already exists: {} \nUse --force to overwrite it.",
        dest.to_string_lossy().red().bold()
    );
    Ok(())
}

fn file_size(path: &Path, what: &str) -> Result<u64> {
    let size = fs::metadata(path)
        .with_context(|| {
            format!(
                "Could not get size of {}: {}",
                what,
                path.to_string_lossy().red().bold()
            )
        })?
        .len();
    Ok(size)
}

/// 删除写了一半的输出文件，然后把原错误交还给调用方。
fn discard_output<T>(dest: &Path, result: Result<T, StegError>) -> Result<T> {
    result.or_else(|err| {
        fs::remove_file(dest).ok();
        Err(err.into())
    })
}

/// 处理 'Encode' 命令的执行逻辑。
///
/// 负责检查路径与文件大小、校验 BMP 头部、把数据嵌入像素数据，
/// 最后将结果写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与填充方式的 `EncodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 主机为大端字节序。
/// * 三个路径中有重复，或目标文件已存在且未指定 `--force`。
/// * BMP 文件过小、数据文件为空或超过 65535 字节。
/// * BMP 头部校验失败，或图像容量不足以容纳数据。
/// * 读写过程中出现短读或短写，此时目标文件会被删除。
pub fn handle_encode(args: EncodeArgs) -> Result<()> {
    ensure_supported_host()?;

    anyhow::ensure!(
        args.image != args.data && args.image != args.dest && args.data != args.dest,
        "Overlapping file names: input, data and output must all be different files."
    );
    ensure_writable(&args.dest, args.force)?;

    let bmp_size = file_size(&args.image, "<bmp in>")?;
    let data_size = file_size(&args.data, "<data in>")?;

    let minimum = (BMP_HEADER_SIZE + MIN_PIXEL_DATA) as u64;
    anyhow::ensure!(
        bmp_size >= minimum,
        "Bad file size: the image is too small to embed even one byte. \nRequired: {}, Actual: {}",
        minimum.to_string().green().bold(),
        bmp_size.to_string().red().bold()
    );
    anyhow::ensure!(
        data_size > 0 && data_size <= MAX_PAYLOAD_SIZE as u64,
        "Bad file size: the data file must hold between 1 and {} bytes. \nActual: {}",
        MAX_PAYLOAD_SIZE.to_string().green().bold(),
        data_size.to_string().red().bold()
    );

    let image = File::open(&args.image).with_context(|| {
        format!(
            "Unable to open image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    let data = File::open(&args.data).with_context(|| {
        format!(
            "Unable to open data file: {}",
            args.data.to_string_lossy().red().bold()
        )
    })?;
    let dest = File::create(&args.dest).with_context(|| {
        format!(
            "Unable to create target image file: {}",
            args.dest.to_string_lossy().red().bold()
        )
    })?;

    let result = embed(
        BufReader::new(image),
        bmp_size,
        BufReader::new(data),
        data_size,
        BufWriter::new(dest),
        args.fill,
        rand::rng(),
    );
    let geometry = discard_output(&args.dest, result).with_context(|| {
        format!(
            "Unable to encode {}. \nThe image must be an uncompressed 24-bit RGB bitmap large enough for the data.",
            args.dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "Embedded {} bytes into a {}x{} image (fill: {}) and saved: {}",
        data_size.to_string().green().bold(),
        geometry.width,
        geometry.height,
        args.fill,
        args.dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Decode' 命令的执行逻辑。
///
/// 负责校验 BMP 头部、从像素数据中读出长度头并还原数据，
/// 最后将还原出的内容写入目标文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `DecodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 主机为大端字节序。
/// * 输入与输出路径相同，或目标文件已存在且未指定 `--force`。
/// * BMP 文件过小或头部校验失败。
/// * 嵌入的长度超出图像容量 (图像中没有隐藏数据或已损坏)。
/// * 读写过程中出现短读或短写，此时目标文件会被删除。
pub fn handle_decode(args: DecodeArgs) -> Result<()> {
    ensure_supported_host()?;

    anyhow::ensure!(
        args.image != args.data,
        "Overlapping file names: input and output must be different files."
    );
    ensure_writable(&args.data, args.force)?;

    let bmp_size = file_size(&args.image, "<bmp in>")?;
    let minimum = (BMP_HEADER_SIZE + MIN_PIXEL_DATA) as u64;
    anyhow::ensure!(
        bmp_size >= minimum,
        "Bad file size: the image is too small to hold any data. \nRequired: {}, Actual: {}",
        minimum.to_string().green().bold(),
        bmp_size.to_string().red().bold()
    );

    let image = File::open(&args.image).with_context(|| {
        format!(
            "Unable to open image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    let dest = File::create(&args.data).with_context(|| {
        format!(
            "Unable to create target data file: {}",
            args.data.to_string_lossy().red().bold()
        )
    })?;

    let result = extract(BufReader::new(image), bmp_size, BufWriter::new(dest));
    let length = discard_output(&args.data, result).with_context(|| {
        format!(
            "Unable to decode data from '{}'. \nThe image may not contain hidden data or is corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "Recovered {} bytes and saved: {}",
        length.to_string().green().bold(),
        args.data.to_string_lossy().green().bold()
    );

    Ok(())
}
