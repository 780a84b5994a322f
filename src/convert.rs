// 该文件是 Shijing （视镜） 项目的一部分。
// src/convert.rs - 位图与矩阵互转
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use thiserror::Error;
use tracing::{debug, error};

use crate::{
  frame::{Matrix, PixelLayout},
  platform::{Bitmap, BitmapFormat, BitmapInfo, PlatformError},
};

#[derive(Error, Debug)]
pub enum ConvertError {
  #[error("不支持的位图格式: {0}")]
  UnsupportedFormat(BitmapFormat),
  #[error("尺寸不匹配: 位图 {bitmap_width}x{bitmap_height}, 矩阵 {matrix_width}x{matrix_height}")]
  DimensionMismatch {
    bitmap_width: u32,
    bitmap_height: u32,
    matrix_width: usize,
    matrix_height: usize,
  },
  #[error("位图内存不足: 需要 {required} 字节, 实际 {actual} 字节")]
  BufferTooSmall { required: usize, actual: usize },
  #[error("平台调用失败: {0}")]
  Platform(PlatformError),
}

impl ConvertError {
  fn platform<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
    ConvertError::Platform(Box::new(err))
  }
}

/// 打包为 RGB565，红色位于高 5 位
pub fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
  ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

/// 解包 RGB565，低位补零
pub fn unpack_rgb565(value: u16) -> [u8; 3] {
  let value = value as u32;
  [
    ((value >> 8) & 0xF8) as u8,
    ((value >> 3) & 0xFC) as u8,
    ((value << 3) & 0xF8) as u8,
  ]
}

fn check_format(info: &BitmapInfo) -> Result<(), ConvertError> {
  match info.format {
    BitmapFormat::Rgba8888 | BitmapFormat::Rgb565 => Ok(()),
    other => {
      error!("仅支持 RGBA_8888 与 RGB_565 位图, 实际格式 {}", other);
      Err(ConvertError::UnsupportedFormat(other))
    }
  }
}

fn check_buffer(info: &BitmapInfo, actual: usize) -> Result<(), ConvertError> {
  let row = info.width as usize * info.format.bytes_per_pixel();
  let required = match info.height as usize {
    0 => 0,
    h => (h - 1) * info.stride as usize + row,
  };
  if actual < required {
    return Err(ConvertError::BufferTooSmall { required, actual });
  }
  Ok(())
}

/// 读取位图内容
///
/// RGBA_8888 原样复制为 RGBA 矩阵；RGB_565 解码后交换为 BGR 顺序，
/// 与下游推理所需的通道顺序一致。
pub fn bitmap_to_matrix<B: Bitmap>(bitmap: &mut B) -> Result<Matrix, ConvertError> {
  let info = bitmap.info().map_err(ConvertError::platform)?;
  check_format(&info)?;

  let rows = info.height as usize;
  let cols = info.width as usize;
  let stride = info.stride as usize;

  let matrix = bitmap
    .with_locked_pixels(|pixels| -> Result<Matrix, ConvertError> {
      check_buffer(&info, pixels.len())?;

      if info.format == BitmapFormat::Rgba8888 {
        let mut matrix = Matrix::with_shape(rows, cols, PixelLayout::Rgba);
        let row_len = cols * 4;
        for (y, dst) in matrix.as_mut().chunks_exact_mut(row_len.max(1)).enumerate() {
          dst.copy_from_slice(&pixels[y * stride..y * stride + row_len]);
        }
        Ok(matrix)
      } else {
        let mut matrix = Matrix::with_shape(rows, cols, PixelLayout::Bgr);
        let row_len = cols * 3;
        for (y, dst) in matrix.as_mut().chunks_exact_mut(row_len.max(1)).enumerate() {
          let src = &pixels[y * stride..y * stride + cols * 2];
          for (out, px) in dst.chunks_exact_mut(3).zip(src.chunks_exact(2)) {
            let [r, g, b] = unpack_rgb565(u16::from_le_bytes([px[0], px[1]]));
            out.copy_from_slice(&[b, g, r]);
          }
        }
        Ok(matrix)
      }
    })
    .map_err(ConvertError::platform)??;

  debug!(
    "位图 {}x{} ({}) 已转换为 {:?} 矩阵",
    info.width, info.height, info.format, matrix.layout()
  );
  Ok(matrix)
}

/// 把矩阵写回位图
///
/// 所有校验都在锁定像素之前完成，失败时位图内容不变。
pub fn matrix_to_bitmap<B: Bitmap>(matrix: &Matrix, bitmap: &mut B) -> Result<(), ConvertError> {
  let info = bitmap.info().map_err(ConvertError::platform)?;
  check_format(&info)?;

  if info.width as usize != matrix.cols() || info.height as usize != matrix.rows() {
    error!(
      "矩阵尺寸 {}x{} 与位图尺寸 {}x{} 不一致",
      matrix.cols(),
      matrix.rows(),
      info.width,
      info.height
    );
    return Err(ConvertError::DimensionMismatch {
      bitmap_width: info.width,
      bitmap_height: info.height,
      matrix_width: matrix.cols(),
      matrix_height: matrix.rows(),
    });
  }

  let stride = info.stride as usize;
  let layout = matrix.layout();
  let channels = matrix.channels();

  bitmap
    .with_locked_pixels(|pixels| -> Result<(), ConvertError> {
      check_buffer(&info, pixels.len())?;

      for y in 0..matrix.rows() {
        let src = matrix.row(y);
        let dst = &mut pixels[y * stride..];
        for (x, px) in src.chunks_exact(channels).enumerate() {
          let [r, g, b, a] = match layout {
            PixelLayout::Gray => [px[0], px[0], px[0], 255],
            PixelLayout::Rgb => [px[0], px[1], px[2], 255],
            PixelLayout::Bgr => [px[2], px[1], px[0], 255],
            PixelLayout::Rgba => [px[0], px[1], px[2], px[3]],
          };
          if info.format == BitmapFormat::Rgba8888 {
            dst[x * 4..x * 4 + 4].copy_from_slice(&[r, g, b, a]);
          } else {
            dst[x * 2..x * 2 + 2].copy_from_slice(&pack_rgb565(r, g, b).to_le_bytes());
          }
        }
      }
      Ok(())
    })
    .map_err(ConvertError::platform)??;

  debug!(
    "{:?} 矩阵已写入位图 {}x{} ({})",
    layout, info.width, info.height, info.format
  );
  Ok(())
}
