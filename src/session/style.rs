// 该文件是 Shijing （视镜） 项目的一部分。
// src/session/style.rs - 风格迁移演示会话
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

use std::time::Instant;

use thiserror::Error;
use tracing::{info, warn};

use crate::{
  assets::AssetSource,
  convert::{ConvertError, bitmap_to_matrix, matrix_to_bitmap},
  frame::{Matrix, ToRgbImage},
  model::{Model, StyleBank, StyleModelError},
  platform::{Bitmap, BitmapFormat, PlatformError},
};

#[derive(Error, Debug)]
pub enum StyleError {
  #[error("会话尚未初始化")]
  NotInitialized,
  #[error("未知的风格编号: {0}")]
  UnknownStyle(i32),
  #[error("风格迁移只支持 RGBA_8888 位图, 实际格式 {0}")]
  UnsupportedFormat(BitmapFormat),
  #[error("平台调用失败: {0}")]
  Platform(PlatformError),
  #[error(transparent)]
  Convert(#[from] ConvertError),
  #[error(transparent)]
  Model(#[from] StyleModelError),
}

/// 图库风格迁移演示的会话状态
#[derive(Debug, Default)]
pub struct StyleSession {
  styles: Option<StyleBank>,
}

impl StyleSession {
  pub fn new() -> Self {
    Self::default()
  }

  /// 从资源中加载全部风格模型
  pub fn init<A: AssetSource + ?Sized>(&mut self, assets: &A) -> Result<(), StyleError> {
    self.styles = Some(StyleBank::load(assets)?);
    Ok(())
  }

  pub fn styles(&self) -> Option<&StyleBank> {
    self.styles.as_ref()
  }

  /// 对位图原地做风格迁移
  ///
  /// 输出来自三通道模型结果，alpha 统一写为 255。没有可用的加速后端，
  /// `use_gpu` 为真时记录警告并走 CPU 路径。
  pub fn style_transfer<B: Bitmap>(
    &self,
    bitmap: &mut B,
    style_id: i32,
    use_gpu: bool,
  ) -> Result<(), StyleError> {
    let styles = self.styles.as_ref().ok_or(StyleError::NotInitialized)?;

    let info = bitmap
      .info()
      .map_err(|e| StyleError::Platform(Box::new(e)))?;
    if info.format != BitmapFormat::Rgba8888 {
      return Err(StyleError::UnsupportedFormat(info.format));
    }

    let style = styles
      .get(style_id)
      .ok_or(StyleError::UnknownStyle(style_id))?;

    if use_gpu {
      warn!("未启用加速后端, 使用 CPU 推理");
    }

    info!(
      "风格迁移开始: {}x{} 风格 {} ({})",
      info.width,
      info.height,
      style_id,
      style.name()
    );
    let now = Instant::now();

    let input = bitmap_to_matrix(bitmap)?.to_rgb_image();
    let output = match style.infer(&input) {
      Ok(output) => output,
      Err(never) => match never {},
    };
    matrix_to_bitmap(&Matrix::from(output), bitmap)?;

    info!("风格迁移完成，耗时: {:.2?}", now.elapsed());
    Ok(())
  }
}
