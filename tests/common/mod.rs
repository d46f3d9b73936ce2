#![allow(dead_code)]

use bmpsteg::Bgr;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

pub const HEADER_SIZE: usize = 54;

/// 24 位图像一行的字节数 (补齐到 4 的倍数)。
pub fn stride(width: usize) -> usize {
    (width * 3 + 3) & !3
}

/// 构造一份合法的 54 字节 BMP 头部。
pub fn headers(width: i32, height: i32, data_len: u32) -> [u8; HEADER_SIZE] {
    let mut h = [0u8; HEADER_SIZE];
    h[0..2].copy_from_slice(b"BM");
    h[2..6].copy_from_slice(&(HEADER_SIZE as u32 + data_len).to_le_bytes());
    h[10..14].copy_from_slice(&(HEADER_SIZE as u32).to_le_bytes());
    h[14..18].copy_from_slice(&40u32.to_le_bytes());
    h[18..22].copy_from_slice(&width.to_le_bytes());
    h[22..26].copy_from_slice(&height.to_le_bytes());
    h[26..28].copy_from_slice(&1u16.to_le_bytes());
    h[28..30].copy_from_slice(&24u16.to_le_bytes());
    h[34..38].copy_from_slice(&data_len.to_le_bytes());
    h[38..42].copy_from_slice(&2835i32.to_le_bytes());
    h[42..46].copy_from_slice(&2835i32.to_le_bytes());
    h
}

/// 生成一个像素随机、填充字节为 0 的 BMP 文件。
pub fn random_bmp(width: usize, height: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    bmp_with(width, height, |_| {
        let mut px = [0u8; 3];
        rng.fill_bytes(&mut px);
        px
    })
}

/// 生成一个所有像素相同的 BMP 文件。
pub fn solid_bmp(width: usize, height: usize, pixel: [u8; 3]) -> Vec<u8> {
    bmp_with(width, height, |_| pixel)
}

fn bmp_with(width: usize, height: usize, mut pixel: impl FnMut(usize) -> [u8; 3]) -> Vec<u8> {
    let row = stride(width);
    let data_len = row * height;
    let mut bmp = headers(width as i32, height as i32, data_len as u32).to_vec();
    for y in 0..height {
        for x in 0..width {
            bmp.extend_from_slice(&pixel(y * width + x));
        }
        bmp.resize(HEADER_SIZE + (y + 1) * row, 0);
    }
    bmp
}

/// 按文件中的存储顺序取第 `index` 个像素。
pub fn pixel_at(bmp: &[u8], width: usize, index: usize) -> Bgr {
    let at = HEADER_SIZE + (index / width) * stride(width) + (index % width) * 3;
    Bgr::new(bmp[at], bmp[at + 1], bmp[at + 2])
}

pub fn random_payload(len: usize, seed: u64) -> Vec<u8> {
    let mut payload = vec![0u8; len];
    StdRng::seed_from_u64(seed).fill_bytes(&mut payload);
    payload
}

/// 每次都返回同一个值的随机源，用于验证填充位。
pub struct ConstRng(pub u32);

impl RngCore for ConstRng {
    fn next_u32(&mut self) -> u32 {
        self.0
    }

    fn next_u64(&mut self) -> u64 {
        u64::from(self.0)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        dst.fill(self.0.to_le_bytes()[0]);
    }
}
