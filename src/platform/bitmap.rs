// 该文件是 Shijing （视镜） 项目的一部分。
// src/platform/bitmap.rs - 位图接口
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

use std::fmt;

/// 位图像素格式，对应 `ANDROID_BITMAP_FORMAT_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitmapFormat {
  None,
  Rgba8888,
  Rgb565,
  Rgba4444,
  A8,
  RgbaF16,
  Other(i32),
}

impl BitmapFormat {
  pub fn bytes_per_pixel(&self) -> usize {
    match self {
      BitmapFormat::Rgba8888 => 4,
      BitmapFormat::Rgb565 | BitmapFormat::Rgba4444 => 2,
      BitmapFormat::A8 => 1,
      BitmapFormat::RgbaF16 => 8,
      BitmapFormat::None | BitmapFormat::Other(_) => 0,
    }
  }
}

impl fmt::Display for BitmapFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BitmapFormat::None => write!(f, "NONE"),
      BitmapFormat::Rgba8888 => write!(f, "RGBA_8888"),
      BitmapFormat::Rgb565 => write!(f, "RGB_565"),
      BitmapFormat::Rgba4444 => write!(f, "RGBA_4444"),
      BitmapFormat::A8 => write!(f, "A_8"),
      BitmapFormat::RgbaF16 => write!(f, "RGBA_F16"),
      BitmapFormat::Other(raw) => write!(f, "UNKNOWN({})", raw),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapInfo {
  pub width: u32,
  pub height: u32,
  /// 行跨度，单位为字节
  pub stride: u32,
  pub format: BitmapFormat,
}

/// 宿主管理的位图资源
pub trait Bitmap {
  type Error: std::error::Error + Send + Sync + 'static;

  fn info(&self) -> Result<BitmapInfo, Self::Error>;

  /// 锁定像素内存，闭包返回后无条件解锁
  fn with_locked_pixels<R>(&mut self, f: impl FnOnce(&mut [u8]) -> R) -> Result<R, Self::Error>;
}
