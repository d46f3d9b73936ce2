//! # 扫描行缓冲
//!
//! 同一时刻只保留一行像素数据。游标指向当前像素，
//! 行内剩余像素数与剩余行数共同决定何时换行、何时结束。

use std::io::{self, Read, Write};

use crate::codec::Bgr;
use crate::constants::BYTES_PER_PIXEL;
use crate::header::Geometry;

#[derive(Debug)]
pub struct ScanLine {
    buf: Vec<u8>,
    width: usize,
    cursor: usize,
    rows_left: usize,
}

impl ScanLine {
    /// 按行跨度分配缓冲区；尚未载入任何行。
    pub fn new(geometry: &Geometry) -> Self {
        Self {
            buf: vec![0; geometry.stride],
            width: geometry.width,
            cursor: 0,
            rows_left: geometry.height,
        }
    }

    /// 读入下一行并把游标移回行首。
    pub fn load<R: Read>(&mut self, src: &mut R) -> io::Result<()> {
        src.read_exact(&mut self.buf)?;
        self.cursor = 0;
        Ok(())
    }

    /// 把当前行 (含填充字节) 原样写出。
    pub fn store<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.buf)
    }

    pub fn pixel(&self) -> Bgr {
        let at = self.cursor * BYTES_PER_PIXEL;
        Bgr::new(self.buf[at], self.buf[at + 1], self.buf[at + 2])
    }

    pub fn set_pixel(&mut self, pixel: Bgr) {
        let at = self.cursor * BYTES_PER_PIXEL;
        self.buf[at..at + BYTES_PER_PIXEL].copy_from_slice(&pixel.to_bytes());
    }

    /// 当前行中尚未处理的像素数 (含当前像素)。
    pub fn pixels_left(&self) -> usize {
        self.width - self.cursor
    }

    /// 游标前移一个像素；已在行尾时返回 `false` 且游标不动。
    pub fn step(&mut self) -> bool {
        if self.pixels_left() > 1 {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// 标记当前行处理完毕，返回是否还有后续行。
    pub fn retire_row(&mut self) -> bool {
        self.rows_left = self.rows_left.saturating_sub(1);
        self.rows_left > 0
    }
}
