mod common;

use std::io::{self, Write};

use bmpsteg::decoder::Decoder;
use bmpsteg::encoder::Encoder;
use bmpsteg::{embed, extract, pack, unpack, FillMode, Geometry, StegError};
use common::{pixel_at, random_bmp, random_payload, solid_bmp, ConstRng, HEADER_SIZE};
use rand::rngs::StdRng;
use rand::SeedableRng;

const FILL_MODES: [FillMode; 4] = [
    FillMode::None,
    FillMode::Random,
    FillMode::Dark,
    FillMode::Light,
];

fn encode_with<G: rand::RngCore>(
    bmp: &[u8],
    payload: &[u8],
    fill: FillMode,
    rng: G,
) -> Result<Vec<u8>, StegError> {
    let mut out = Vec::new();
    embed(
        bmp,
        bmp.len() as u64,
        payload,
        payload.len() as u64,
        &mut out,
        fill,
        rng,
    )?;
    Ok(out)
}

fn encode(bmp: &[u8], payload: &[u8], fill: FillMode) -> Result<Vec<u8>, StegError> {
    encode_with(bmp, payload, fill, StdRng::seed_from_u64(7))
}

fn decode(bmp: &[u8]) -> Result<Vec<u8>, StegError> {
    let mut out = Vec::new();
    extract(bmp, bmp.len() as u64, &mut out)?;
    Ok(out)
}

fn geometry(width: usize, height: usize) -> Geometry {
    let stride = common::stride(width);
    Geometry {
        width,
        height,
        stride,
        padding: stride - width * 3,
        data_len: (stride * height) as u64,
    }
}

/// 总是写入失败的输出
struct BrokenSink;

impl Write for BrokenSink {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// 4x4 图像嵌入单字节 0x41，不填充
#[test]
fn test_four_by_four_single_byte_scenario() -> anyhow::Result<()> {
    let bmp = random_bmp(4, 4, 1);
    let out = encode(&bmp, &[0x41], FillMode::None)?;

    assert_eq!(unpack(pixel_at(&out, 4, 0)), 0x01);
    assert_eq!(unpack(pixel_at(&out, 4, 1)), 0x00);
    assert_eq!(unpack(pixel_at(&out, 4, 2)), 0x41);
    for index in 3..16 {
        assert_eq!(pixel_at(&out, 4, index), pixel_at(&bmp, 4, index));
    }

    assert_eq!(decode(&out)?, vec![0x41]);
    Ok(())
}

/// 所有填充模式下都能完整还原，且头部字节不变
#[test]
fn test_round_trip_for_every_fill_mode() -> anyhow::Result<()> {
    let bmp = random_bmp(37, 23, 2);
    let payload = random_payload(500, 3);

    for fill in FILL_MODES {
        let out = encode(&bmp, &payload, fill)?;

        assert_eq!(out.len(), bmp.len());
        assert_eq!(&out[..HEADER_SIZE], &bmp[..HEADER_SIZE]);
        assert_eq!(decode(&out)?, payload, "fill mode {fill}");
    }
    Ok(())
}

/// 数据恰好占满全部可用像素
#[test]
fn test_payload_fills_entire_capacity() -> anyhow::Result<()> {
    let bmp = random_bmp(5, 3, 4);
    let payload = random_payload(13, 5);

    let out = encode(&bmp, &payload, FillMode::Random)?;
    assert_eq!(decode(&out)?, payload);
    Ok(())
}

/// 行尾填充字节原样保留
#[test]
fn test_row_padding_is_preserved() -> anyhow::Result<()> {
    let mut bmp = random_bmp(5, 4, 6);
    let stride = common::stride(5);
    for row in 0..4 {
        bmp[HEADER_SIZE + row * stride + 15] = 0xAB;
    }

    let out = encode(&bmp, b"padding", FillMode::Light)?;
    for row in 0..4 {
        assert_eq!(out[HEADER_SIZE + row * stride + 15], 0xAB);
    }
    assert_eq!(decode(&out)?, b"padding");
    Ok(())
}

/// 宽度为 1 时长度头跨越两行
#[test]
fn test_width_one_splits_length_across_rows() -> anyhow::Result<()> {
    let bmp = random_bmp(1, 5, 7);
    let out = encode(&bmp, &[0xDE, 0xAD, 0xBE], FillMode::None)?;

    assert_eq!(unpack(pixel_at(&out, 1, 0)), 0x03);
    assert_eq!(unpack(pixel_at(&out, 1, 1)), 0x00);
    assert_eq!(unpack(pixel_at(&out, 1, 2)), 0xDE);
    assert_eq!(unpack(pixel_at(&out, 1, 4)), 0xBE);
    assert_eq!(decode(&out)?, vec![0xDE, 0xAD, 0xBE]);
    Ok(())
}

/// 宽度为 2 时长度头占满第一行，数据从第二行开始
#[test]
fn test_width_two_starts_payload_on_next_row() -> anyhow::Result<()> {
    let bmp = random_bmp(2, 3, 8);
    let out = encode(&bmp, b"abcd", FillMode::Dark)?;

    assert_eq!(unpack(pixel_at(&out, 2, 0)), 0x04);
    assert_eq!(unpack(pixel_at(&out, 2, 1)), 0x00);
    assert_eq!(unpack(pixel_at(&out, 2, 2)), b'a');
    assert_eq!(decode(&out)?, b"abcd");
    Ok(())
}

/// 1x1 图像连长度头都放不下
#[test]
fn test_one_by_one_image_fails() {
    let mut out = Vec::new();
    let err = Encoder::new(geometry(1, 1), FillMode::None, ConstRng(0))
        .encode(&[0u8; 4][..], &b""[..], 0, &mut out)
        .expect_err("1x1 image cannot hold the length header");
    assert!(matches!(err, StegError::PixelsExhausted { code: -2 }));
    assert_eq!(err.code(), -2);

    let err = Decoder::new(geometry(1, 1))
        .decode(&[0u8; 4][..], Vec::new())
        .expect_err("1x1 image cannot hold the length header");
    assert!(matches!(err, StegError::PixelsExhausted { code: -2 }));

    let bmp = solid_bmp(1, 1, [0, 0, 0]);
    let err = encode(&bmp, b"x", FillMode::None).expect_err("file is too small");
    assert!(matches!(err, StegError::BitmapTooSmall { .. }));
}

/// 2x1 图像写完长度头后没有像素可用
#[test]
fn test_two_pixel_image_has_no_room_after_length() {
    let mut out = Vec::new();
    let err = Encoder::new(geometry(2, 1), FillMode::None, ConstRng(0))
        .encode(&[0u8; 8][..], &b""[..], 0, &mut out)
        .expect_err("no pixel left after the length header");
    assert_eq!(err.code(), -5);
}

#[test]
fn test_capacity_rejection() {
    let bmp = random_bmp(4, 4, 9);

    let err = encode(&bmp, &[0u8; 15], FillMode::None).expect_err("15 bytes exceed capacity 14");
    match err {
        StegError::HeaderRejected { flags, .. } => assert_eq!(flags, 0x7FFF),
        other => panic!("unexpected error: {other}"),
    }

    let mut out = Vec::new();
    let err = Encoder::new(geometry(4, 4), FillMode::None, ConstRng(0))
        .encode(&bmp[HEADER_SIZE..], &[0u8; 15][..], 15, &mut out)
        .expect_err("15 bytes exceed capacity 14");
    assert!(matches!(err, StegError::PayloadTooLarge { size: 15, maximum: 14 }));
}

#[test]
fn test_empty_and_oversized_payloads_are_rejected() {
    let bmp = random_bmp(300, 300, 10);

    let err = encode(&bmp, &[], FillMode::None).expect_err("empty payload");
    assert!(matches!(err, StegError::PayloadEmpty));

    let err = encode(&bmp, &vec![0u8; 65_536], FillMode::None).expect_err("payload too large");
    assert!(matches!(err, StegError::PayloadTooLarge { size: 65_536, .. }));
}

#[test]
fn test_max_payload_round_trip() -> anyhow::Result<()> {
    let bmp = random_bmp(300, 300, 11);
    let payload = random_payload(65_535, 12);

    let out = encode(&bmp, &payload, FillMode::Random)?;
    assert_eq!(decode(&out)?, payload);
    Ok(())
}

/// 不填充时，数据之后的像素保持原值
#[test]
fn test_fill_none_leaves_pixels_untouched() -> anyhow::Result<()> {
    let bmp = random_bmp(8, 8, 13);
    let out = encode(&bmp, b"hi", FillMode::None)?;

    for index in 4..64 {
        assert_eq!(pixel_at(&out, 8, index), pixel_at(&bmp, 8, index));
    }
    Ok(())
}

/// 偏暗填充时掩码外的位全部为 0，偏亮填充时全部为 1
#[test]
fn test_fill_bias_bits() -> anyhow::Result<()> {
    let bmp = random_bmp(16, 16, 14);

    let dark = encode(&bmp, b"x", FillMode::Dark)?;
    let light = encode(&bmp, b"x", FillMode::Light)?;

    for index in 3..256 {
        assert_eq!(unpack(pixel_at(&dark, 16, index)) & !0x29, 0);
        assert_eq!(unpack(pixel_at(&light, 16, index)) & !0x29, !0x29);
    }
    Ok(())
}

/// 注入固定随机源后，填充结果可预测
#[test]
fn test_fill_uses_injected_source() -> anyhow::Result<()> {
    let bmp = random_bmp(4, 4, 15);

    let random = encode_with(&bmp, b"x", FillMode::Random, ConstRng(0x5A5A_5A5A))?;
    let dark = encode_with(&bmp, b"x", FillMode::Dark, ConstRng(0xFF))?;
    let light = encode_with(&bmp, b"x", FillMode::Light, ConstRng(0x00))?;

    for index in 3..16 {
        assert_eq!(unpack(pixel_at(&random, 4, index)), 0x5A);
        assert_eq!(unpack(pixel_at(&dark, 4, index)), 0x29);
        assert_eq!(unpack(pixel_at(&light, 4, index)), 0xD6);
    }
    Ok(())
}

/// 数据流比声明的长度短
#[test]
fn test_truncated_payload_stream() {
    let bmp = random_bmp(4, 4, 16);
    let mut out = Vec::new();

    let err = Encoder::new(geometry(4, 4), FillMode::None, ConstRng(0))
        .encode(&bmp[HEADER_SIZE..], &b"abc"[..], 5, &mut out)
        .expect_err("payload stream ends early");
    assert!(matches!(err, StegError::PayloadTruncated { expected: 5, actual: 3 }));
    assert_eq!(err.code(), -10);
}

/// 读取数据流出错时使用独立的失败代码
#[test]
fn test_payload_read_error_has_own_code() {
    struct BrokenPayload;

    impl io::Read for BrokenPayload {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("payload unavailable"))
        }
    }

    let bmp = random_bmp(4, 4, 22);
    let mut out = Vec::new();

    let err = Encoder::new(geometry(4, 4), FillMode::None, ConstRng(0))
        .encode(&bmp[HEADER_SIZE..], BrokenPayload, 2, &mut out)
        .expect_err("payload stream fails");
    assert!(matches!(err, StegError::PayloadRead(_)));
    assert_eq!(err.code(), -10);
}

/// 只读取声明长度内的数据字节
#[test]
fn test_payload_beyond_length_is_ignored() -> anyhow::Result<()> {
    let bmp = random_bmp(4, 4, 17);
    let mut out = bmp[..HEADER_SIZE].to_vec();

    Encoder::new(geometry(4, 4), FillMode::None, ConstRng(0)).encode(
        &bmp[HEADER_SIZE..],
        &b"abcdefgh"[..],
        4,
        &mut out,
    )?;
    assert_eq!(decode(&out)?, b"abcd");
    Ok(())
}

#[test]
fn test_short_source_read_reports_row_code() {
    let bmp = random_bmp(4, 4, 18);

    let mut out = Vec::new();
    let err = embed(
        &bmp[..HEADER_SIZE + 24],
        bmp.len() as u64,
        &b"x"[..],
        1,
        &mut out,
        FillMode::None,
        ConstRng(0),
    )
    .expect_err("source ends after two rows");
    assert!(matches!(err, StegError::SourceRead { code: -9, .. }));

    let mut out = Vec::new();
    let err = Encoder::new(geometry(1, 3), FillMode::None, ConstRng(0))
        .encode(&[0u8; 4][..], &b"x"[..], 1, &mut out)
        .expect_err("second row is missing");
    assert!(matches!(err, StegError::SourceRead { code: -4, .. }));

    let err = Encoder::new(geometry(4, 4), FillMode::None, ConstRng(0))
        .encode(io::empty(), &b"x"[..], 1, &mut out)
        .expect_err("no pixel data at all");
    assert_eq!(err.code(), -1);
}

#[test]
fn test_short_write_reports_row_code() {
    let bmp = random_bmp(4, 4, 19);

    let err = Encoder::new(geometry(4, 4), FillMode::None, ConstRng(0))
        .encode(&bmp[HEADER_SIZE..], &b"x"[..], 1, BrokenSink)
        .expect_err("output rejects every write");
    assert!(matches!(err, StegError::OutputWrite { code: -8, .. }));

    let out = encode(&bmp, b"x", FillMode::None).expect("encode succeeds");
    let err = extract(&out[..], out.len() as u64, BrokenSink)
        .expect_err("output rejects every write");
    assert_eq!(err.code(), -7);
}

/// 非隐写图像中读出的长度超过容量
#[test]
fn test_decode_rejects_length_beyond_capacity() {
    let mut bmp = solid_bmp(4, 4, [0x80, 0x80, 0x80]);
    for index in 0..2 {
        let at = HEADER_SIZE + index * 3;
        let packed = pack(0xFF, pixel_at(&bmp, 4, index));
        bmp[at..at + 3].copy_from_slice(&packed.to_bytes());
    }

    let err = decode(&bmp).expect_err("length 65535 cannot fit");
    assert!(matches!(
        err,
        StegError::CapacityExceeded {
            claimed: 65_535,
            capacity: 14
        }
    ));
    assert_eq!(err.code(), -4);
}

/// 读满长度后立即停止，不再读取后续行
#[test]
fn test_decode_stops_after_payload() -> anyhow::Result<()> {
    let bmp = random_bmp(4, 4, 20);
    let out = encode(&bmp, b"z", FillMode::Random)?;

    let mut recovered = Vec::new();
    let length = extract(&out[..HEADER_SIZE + 12], out.len() as u64, &mut recovered)?;
    assert_eq!(length, 1);
    assert_eq!(recovered, b"z");
    Ok(())
}

/// 嵌入长度为 0 时输出为空
#[test]
fn test_zero_length_decodes_to_nothing() -> anyhow::Result<()> {
    let bmp = solid_bmp(4, 4, [0x00, 0x00, 0x00]);
    assert_eq!(decode(&bmp)?, Vec::<u8>::new());
    Ok(())
}

/// 自上而下存储的图像同样可以往返
#[test]
fn test_top_down_bitmap_round_trip() -> anyhow::Result<()> {
    let mut bmp = random_bmp(6, 6, 21);
    bmp[22..26].copy_from_slice(&(-6i32).to_le_bytes());

    let out = encode(&bmp, b"top-down", FillMode::Random)?;
    assert_eq!(&out[..HEADER_SIZE], &bmp[..HEADER_SIZE]);
    assert_eq!(decode(&out)?, b"top-down");
    Ok(())
}
