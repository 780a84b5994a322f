// 该文件是 Shijing （视镜） 项目的一部分。
// src/platform/memory.rs - 内存宿主实现
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

use std::sync::{Arc, Mutex, MutexGuard};

use image::{Rgba, RgbaImage, RgbImage};
use thiserror::Error;
use tracing::debug;

use crate::convert::{pack_rgb565, unpack_rgb565};
use crate::platform::{Bitmap, BitmapFormat, BitmapInfo, BufferFormat, NativeWindow, WindowBuffer};

// 行跨度按 16 像素对齐，模拟硬件缓冲区的填充
const STRIDE_ALIGN: u32 = 16;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MemoryHostError {
  #[error("表面状态锁已损坏")]
  Poisoned,
  #[error("像素内存锁定失败")]
  LockFailed,
  #[error("像素内存已被锁定")]
  AlreadyLocked,
}

#[derive(Debug)]
struct Surface {
  width: u32,
  height: u32,
  geometry: Option<(u32, u32, BufferFormat)>,
  forced_format: Option<BufferFormat>,
  buffer: Vec<u8>,
  buffer_width: u32,
  buffer_height: u32,
  stride: u32,
  format: BufferFormat,
  posted: usize,
}

/// 内存中的显示表面
///
/// 所有克隆共享同一块表面，引用计数即 `Arc` 的强引用数。
#[derive(Debug, Clone)]
pub struct MemoryWindow {
  surface: Arc<Mutex<Surface>>,
}

impl MemoryWindow {
  pub fn new(width: u32, height: u32) -> Self {
    let surface = Surface {
      width,
      height,
      geometry: None,
      forced_format: None,
      buffer: Vec::new(),
      buffer_width: 0,
      buffer_height: 0,
      stride: 0,
      format: BufferFormat::R8G8B8A8,
      posted: 0,
    };
    Self {
      surface: Arc::new(Mutex::new(surface)),
    }
  }

  /// 不论请求的几何格式如何，锁定时都返回指定格式
  pub fn with_forced_format(self, format: BufferFormat) -> Self {
    if let Ok(mut surface) = self.surface.lock() {
      surface.forced_format = Some(format);
    }
    self
  }

  fn surface(&self) -> Result<MutexGuard<'_, Surface>, MemoryHostError> {
    self.surface.lock().map_err(|_| MemoryHostError::Poisoned)
  }

  /// 当前持有该表面的句柄数量
  pub fn references(&self) -> usize {
    Arc::strong_count(&self.surface)
  }

  /// 已提交显示的帧数
  pub fn posted_frames(&self) -> Result<usize, MemoryHostError> {
    Ok(self.surface()?.posted)
  }

  pub fn buffers_geometry(&self) -> Result<Option<(u32, u32, BufferFormat)>, MemoryHostError> {
    Ok(self.surface()?.geometry)
  }

  /// 模拟宿主改变表面尺寸
  pub fn resize(&self, width: u32, height: u32) -> Result<(), MemoryHostError> {
    let mut surface = self.surface()?;
    surface.width = width;
    surface.height = height;
    Ok(())
  }

  /// 读出最近一次提交的四通道内容，去掉行填充
  pub fn snapshot(&self) -> Result<Option<RgbaImage>, MemoryHostError> {
    let surface = self.surface()?;
    if surface.posted == 0 || surface.format.bytes_per_pixel() != Some(4) {
      return Ok(None);
    }

    let stride = surface.stride as usize * 4;
    let buffer = &surface.buffer;
    Ok(Some(RgbaImage::from_fn(
      surface.buffer_width,
      surface.buffer_height,
      |x, y| {
        let idx = y as usize * stride + x as usize * 4;
        Rgba([
          buffer[idx],
          buffer[idx + 1],
          buffer[idx + 2],
          buffer[idx + 3],
        ])
      },
    )))
  }
}

impl NativeWindow for MemoryWindow {
  type Error = MemoryHostError;

  fn width(&self) -> u32 {
    self.surface().map(|s| s.width).unwrap_or(0)
  }

  fn height(&self) -> u32 {
    self.surface().map(|s| s.height).unwrap_or(0)
  }

  fn set_buffers_geometry(
    &self,
    width: u32,
    height: u32,
    format: BufferFormat,
  ) -> Result<(), Self::Error> {
    let mut surface = self.surface()?;
    // 宽高为 0 表示恢复为表面自身尺寸
    surface.geometry = if width == 0 || height == 0 {
      None
    } else {
      Some((width, height, format))
    };
    Ok(())
  }

  fn lock_and_post<R>(&self, f: impl FnOnce(WindowBuffer<'_>) -> R) -> Result<R, Self::Error> {
    let mut guard = self.surface()?;
    let surface = &mut *guard;

    let (width, height, format) = surface
      .geometry
      .unwrap_or((surface.width, surface.height, BufferFormat::R8G8B8A8));
    let format = surface.forced_format.unwrap_or(format);
    let bpp = format.bytes_per_pixel().unwrap_or(4);
    let stride = width.div_ceil(STRIDE_ALIGN) * STRIDE_ALIGN;

    let len = stride as usize * height as usize * bpp;
    if surface.buffer.len() != len {
      debug!("重新分配表面缓冲区: {}x{} 跨度 {}", width, height, stride);
      surface.buffer = vec![0u8; len];
    }
    surface.buffer_width = width;
    surface.buffer_height = height;
    surface.stride = stride;
    surface.format = format;

    let result = f(WindowBuffer {
      width,
      height,
      stride,
      format,
      bits: &mut surface.buffer,
    });
    surface.posted += 1;

    Ok(result)
  }
}

/// 内存中的位图
#[derive(Debug, Clone)]
pub struct MemoryBitmap {
  info: BitmapInfo,
  pixels: Vec<u8>,
  fail_lock: bool,
  locked: bool,
}

impl MemoryBitmap {
  pub fn new(width: u32, height: u32, format: BitmapFormat) -> Self {
    let stride = width * format.bytes_per_pixel() as u32;
    Self::with_stride(width, height, stride, format)
  }

  /// 指定行跨度（字节），跨度小于一行像素时按紧密排列处理
  pub fn with_stride(width: u32, height: u32, stride: u32, format: BitmapFormat) -> Self {
    let stride = stride.max(width * format.bytes_per_pixel() as u32);
    Self {
      info: BitmapInfo {
        width,
        height,
        stride,
        format,
      },
      pixels: vec![0u8; stride as usize * height as usize],
      fail_lock: false,
      locked: false,
    }
  }

  /// 之后的每次锁定都会失败，用于模拟宿主异常
  pub fn with_lock_failure(mut self) -> Self {
    self.fail_lock = true;
    self
  }

  pub fn from_rgba_image(image: &RgbaImage) -> Self {
    let (width, height) = image.dimensions();
    let mut bitmap = Self::new(width, height, BitmapFormat::Rgba8888);
    bitmap.pixels.copy_from_slice(image.as_raw());
    bitmap
  }

  pub fn from_rgb_image_565(image: &RgbImage) -> Self {
    let (width, height) = image.dimensions();
    let mut bitmap = Self::new(width, height, BitmapFormat::Rgb565);
    for (dst, src) in bitmap.pixels.chunks_exact_mut(2).zip(image.pixels()) {
      dst.copy_from_slice(&pack_rgb565(src[0], src[1], src[2]).to_le_bytes());
    }
    bitmap
  }

  /// 以 RGBA 形式读出位图内容，不支持的格式返回 `None`
  pub fn to_rgba_image(&self) -> Option<RgbaImage> {
    let BitmapInfo {
      width,
      height,
      stride,
      format,
    } = self.info;
    let stride = stride as usize;
    let pixels = &self.pixels;

    match format {
      BitmapFormat::Rgba8888 => Some(RgbaImage::from_fn(width, height, |x, y| {
        let idx = y as usize * stride + x as usize * 4;
        Rgba([
          pixels[idx],
          pixels[idx + 1],
          pixels[idx + 2],
          pixels[idx + 3],
        ])
      })),
      BitmapFormat::Rgb565 => Some(RgbaImage::from_fn(width, height, |x, y| {
        let idx = y as usize * stride + x as usize * 2;
        let [r, g, b] = unpack_rgb565(u16::from_le_bytes([pixels[idx], pixels[idx + 1]]));
        Rgba([r, g, b, 255])
      })),
      _ => None,
    }
  }

  pub fn pixels(&self) -> &[u8] {
    &self.pixels
  }

  pub fn is_locked(&self) -> bool {
    self.locked
  }
}

impl Bitmap for MemoryBitmap {
  type Error = MemoryHostError;

  fn info(&self) -> Result<BitmapInfo, Self::Error> {
    Ok(self.info)
  }

  fn with_locked_pixels<R>(&mut self, f: impl FnOnce(&mut [u8]) -> R) -> Result<R, Self::Error> {
    if self.fail_lock {
      return Err(MemoryHostError::LockFailed);
    }
    if self.locked {
      return Err(MemoryHostError::AlreadyLocked);
    }

    self.locked = true;
    let result = f(&mut self.pixels);
    self.locked = false;
    Ok(result)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clones_share_surface_and_count_references() {
    let window = MemoryWindow::new(4, 4);
    let other = window.clone();
    assert_eq!(window.references(), 2);
    drop(other);
    assert_eq!(window.references(), 1);
  }

  #[test]
  fn lock_uses_requested_geometry_with_aligned_stride() {
    let window = MemoryWindow::new(100, 100);
    window
      .set_buffers_geometry(20, 10, BufferFormat::R8G8B8A8)
      .unwrap();
    let (w, h, stride, len) = window
      .lock_and_post(|buf| (buf.width, buf.height, buf.stride, buf.bits.len()))
      .unwrap();
    assert_eq!((w, h), (20, 10));
    assert_eq!(stride, 32);
    assert_eq!(len, 32 * 10 * 4);
    assert_eq!(window.posted_frames().unwrap(), 1);
  }

  #[test]
  fn failing_bitmap_lock_reports_error() {
    let mut bitmap = MemoryBitmap::new(2, 2, BitmapFormat::Rgba8888).with_lock_failure();
    let err = bitmap.with_locked_pixels(|_| ()).unwrap_err();
    assert_eq!(err, MemoryHostError::LockFailed);
    assert!(!bitmap.is_locked());
  }

  #[test]
  fn rgb565_bitmap_reads_back_quantized_colors() {
    let image = RgbImage::from_pixel(1, 1, image::Rgb([255, 128, 8]));
    let bitmap = MemoryBitmap::from_rgb_image_565(&image);
    let rgba = bitmap.to_rgba_image().unwrap();
    assert_eq!(rgba.get_pixel(0, 0), &Rgba([248, 128, 8, 255]));
  }
}
