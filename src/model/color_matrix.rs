// 该文件是 Shijing （视镜） 项目的一部分。
// src/model/color_matrix.rs - 颜色矩阵风格模型
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

//! # 颜色矩阵风格
//!
//! 每个风格是一个 3x4 矩阵，对每个像素计算
//! `out[c] = m[c][0]*r + m[c][1]*g + m[c][2]*b + m[c][3]`，结果截断到 0..=255。
//!
//! 资源文件 `<风格名>.cmat` 包含 12 个以空白分隔的数，`#` 开头的行为注释：
//!
//! ```text
//! # sepia
//! 0.393 0.769 0.189 0
//! 0.349 0.686 0.168 0
//! 0.272 0.534 0.131 0
//! ```

use std::convert::Infallible;

use image::{Rgb, RgbImage};
use imageproc::map::map_pixels;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
  assets::{AssetError, AssetSource},
  model::Model,
};

/// 风格编号 0..=4 对应的名称
pub const STYLE_NAMES: [&str; 5] = ["candy", "mosaic", "pointilism", "rain_princess", "udnie"];

const STYLE_EXTENSION: &str = "cmat";

#[derive(Error, Debug)]
pub enum StyleModelError {
  #[error("风格 {name} 资源读取失败: {source}")]
  Asset { name: String, source: AssetError },
  #[error("风格 {name} 不是 UTF-8 文本")]
  NotText { name: String },
  #[error("风格 {name} 第 {index} 个系数无法解析: {token}")]
  InvalidNumber {
    name: String,
    index: usize,
    token: String,
  },
  #[error("风格 {name} 应包含 12 个系数, 实际 {count} 个")]
  WrongCount { name: String, count: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorMatrixStyle {
  name: String,
  matrix: [[f32; 4]; 3],
}

impl ColorMatrixStyle {
  pub fn new(name: impl Into<String>, matrix: [[f32; 4]; 3]) -> Self {
    Self {
      name: name.into(),
      matrix,
    }
  }

  pub fn parse(name: &str, text: &str) -> Result<Self, StyleModelError> {
    let values = text
      .lines()
      .filter(|line| !line.trim_start().starts_with('#'))
      .flat_map(str::split_whitespace)
      .enumerate()
      .map(|(index, token)| {
        token
          .parse::<f32>()
          .map_err(|_| StyleModelError::InvalidNumber {
            name: name.to_string(),
            index,
            token: token.to_string(),
          })
      })
      .collect::<Result<Vec<_>, _>>()?;

    if values.len() != 12 {
      return Err(StyleModelError::WrongCount {
        name: name.to_string(),
        count: values.len(),
      });
    }

    let mut matrix = [[0.0; 4]; 3];
    for (row, chunk) in matrix.iter_mut().zip(values.chunks_exact(4)) {
      row.copy_from_slice(chunk);
    }
    Ok(Self::new(name, matrix))
  }

  pub fn load<A: AssetSource + ?Sized>(assets: &A, name: &str) -> Result<Self, StyleModelError> {
    let file = format!("{}.{}", name, STYLE_EXTENSION);
    let data = assets
      .read_non_empty(&file)
      .map_err(|source| StyleModelError::Asset {
        name: name.to_string(),
        source,
      })?;
    let text = String::from_utf8(data).map_err(|_| StyleModelError::NotText {
      name: name.to_string(),
    })?;
    Self::parse(name, &text)
  }

  pub fn name(&self) -> &str {
    &self.name
  }
}

impl Model for ColorMatrixStyle {
  type Input = RgbImage;
  type Output = RgbImage;
  type Error = Infallible;

  fn infer(&self, input: &RgbImage) -> Result<RgbImage, Infallible> {
    let m = &self.matrix;
    Ok(map_pixels(input, |Rgb([r, g, b])| {
      let (r, g, b) = (r as f32, g as f32, b as f32);
      let apply = |row: &[f32; 4]| {
        (row[0] * r + row[1] * g + row[2] * b + row[3])
          .round()
          .clamp(0.0, 255.0) as u8
      };
      Rgb([apply(&m[0]), apply(&m[1]), apply(&m[2])])
    }))
  }
}

/// 按编号索引的风格集合
#[derive(Debug, Clone, Default)]
pub struct StyleBank {
  styles: Vec<ColorMatrixStyle>,
}

impl StyleBank {
  /// 依次加载 [`STYLE_NAMES`] 中的全部风格
  pub fn load<A: AssetSource + ?Sized>(assets: &A) -> Result<Self, StyleModelError> {
    let styles = STYLE_NAMES
      .iter()
      .map(|name| {
        let style = ColorMatrixStyle::load(assets, name)?;
        debug!("风格 {} 已加载", name);
        Ok(style)
      })
      .collect::<Result<Vec<_>, StyleModelError>>()?;
    info!("已加载 {} 个风格", styles.len());
    Ok(Self { styles })
  }

  pub fn from_styles(styles: Vec<ColorMatrixStyle>) -> Self {
    Self { styles }
  }

  pub fn get(&self, id: i32) -> Option<&ColorMatrixStyle> {
    usize::try_from(id).ok().and_then(|id| self.styles.get(id))
  }

  pub fn len(&self) -> usize {
    self.styles.len()
  }

  pub fn is_empty(&self) -> bool {
    self.styles.is_empty()
  }
}
