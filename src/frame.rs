// 该文件是 Shijing （视镜） 项目的一部分。
// src/frame.rs - 像素矩阵定义
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

use image::{ImageBuffer, Rgb, RgbImage};
use thiserror::Error;

/// 矩阵的通道排列，元素均为 8 位无符号数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
  Gray,
  Rgb,
  Bgr,
  Rgba,
}

impl PixelLayout {
  pub fn channels(&self) -> usize {
    match self {
      PixelLayout::Gray => 1,
      PixelLayout::Rgb | PixelLayout::Bgr => 3,
      PixelLayout::Rgba => 4,
    }
  }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MatrixError {
  #[error("不支持的通道数: {0}（仅支持 1、3、4）")]
  UnsupportedChannels(usize),
  #[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
  LengthMismatch { expected: usize, actual: usize },
}

/// 行优先、紧密排列的像素矩阵
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
  rows: usize,
  cols: usize,
  layout: PixelLayout,
  data: Box<[u8]>,
}

impl Matrix {
  pub fn with_shape(rows: usize, cols: usize, layout: PixelLayout) -> Self {
    let data = vec![0u8; rows * cols * layout.channels()].into_boxed_slice();
    Self {
      rows,
      cols,
      layout,
      data,
    }
  }

  pub fn from_raw(
    rows: usize,
    cols: usize,
    layout: PixelLayout,
    data: Vec<u8>,
  ) -> Result<Self, MatrixError> {
    let expected = rows * cols * layout.channels();
    if data.len() != expected {
      return Err(MatrixError::LengthMismatch {
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      rows,
      cols,
      layout,
      data: data.into_boxed_slice(),
    })
  }

  /// 按通道数构造矩阵，三通道视为 RGB 顺序
  pub fn from_channels(
    rows: usize,
    cols: usize,
    channels: usize,
    data: Vec<u8>,
  ) -> Result<Self, MatrixError> {
    let layout = match channels {
      1 => PixelLayout::Gray,
      3 => PixelLayout::Rgb,
      4 => PixelLayout::Rgba,
      other => return Err(MatrixError::UnsupportedChannels(other)),
    };
    Self::from_raw(rows, cols, layout, data)
  }

  pub fn rows(&self) -> usize {
    self.rows
  }

  pub fn cols(&self) -> usize {
    self.cols
  }

  pub fn layout(&self) -> PixelLayout {
    self.layout
  }

  pub fn channels(&self) -> usize {
    self.layout.channels()
  }

  pub fn row(&self, y: usize) -> &[u8] {
    let len = self.cols * self.channels();
    &self.data[y * len..(y + 1) * len]
  }
}

impl AsRef<[u8]> for Matrix {
  fn as_ref(&self) -> &[u8] {
    &self.data
  }
}

impl AsMut<[u8]> for Matrix {
  fn as_mut(&mut self) -> &mut [u8] {
    &mut self.data
  }
}

pub trait ToRgbImage {
  fn to_rgb_image(&self) -> RgbImage;
}

impl ToRgbImage for Matrix {
  fn to_rgb_image(&self) -> RgbImage {
    let channels = self.channels();
    let cols = self.cols;
    let data = &self.data;
    let layout = self.layout;

    ImageBuffer::from_fn(self.cols as u32, self.rows as u32, |x, y| {
      let idx = (y as usize * cols + x as usize) * channels;
      match layout {
        PixelLayout::Gray => Rgb([data[idx], data[idx], data[idx]]),
        PixelLayout::Rgb | PixelLayout::Rgba => Rgb([data[idx], data[idx + 1], data[idx + 2]]),
        PixelLayout::Bgr => Rgb([data[idx + 2], data[idx + 1], data[idx]]),
      }
    })
  }
}

impl From<RgbImage> for Matrix {
  fn from(image: RgbImage) -> Self {
    let (width, height) = image.dimensions();
    Self {
      rows: height as usize,
      cols: width as usize,
      layout: PixelLayout::Rgb,
      data: image.into_raw().into_boxed_slice(),
    }
  }
}
