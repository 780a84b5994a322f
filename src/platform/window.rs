// 该文件是 Shijing （视镜） 项目的一部分。
// src/platform/window.rs - 显示表面接口
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

/// 硬件缓冲区像素格式，对应 `AHARDWAREBUFFER_FORMAT_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferFormat {
  R8G8B8A8,
  R8G8B8X8,
  R8G8B8,
  R5G6B5,
  Other(i32),
}

impl BufferFormat {
  /// 每像素字节数，未知格式返回 `None`
  pub fn bytes_per_pixel(&self) -> Option<usize> {
    match self {
      BufferFormat::R8G8B8A8 | BufferFormat::R8G8B8X8 => Some(4),
      BufferFormat::R8G8B8 => Some(3),
      BufferFormat::R5G6B5 => Some(2),
      BufferFormat::Other(_) => None,
    }
  }
}

/// 锁定后的后台缓冲区
#[derive(Debug)]
pub struct WindowBuffer<'a> {
  pub width: u32,
  pub height: u32,
  /// 行跨度，单位为像素
  pub stride: u32,
  pub format: BufferFormat,
  pub bits: &'a mut [u8],
}

/// 显示表面
///
/// 句柄的克隆对应一次引用获取，析构对应一次释放。
pub trait NativeWindow {
  type Error: std::error::Error + Send + Sync + 'static;

  fn width(&self) -> u32;
  fn height(&self) -> u32;

  fn set_buffers_geometry(
    &self,
    width: u32,
    height: u32,
    format: BufferFormat,
  ) -> Result<(), Self::Error>;

  /// 锁定后台缓冲区，闭包返回后解锁并提交显示
  fn lock_and_post<R>(&self, f: impl FnOnce(WindowBuffer<'_>) -> R) -> Result<R, Self::Error>;
}
