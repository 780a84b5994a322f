// 该文件是 Shijing （视镜） 项目的一部分。
// src/input/core.rs - 相机输入特征定义
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

use image::RgbImage;
use thiserror::Error;

/// 相机朝向，数值与宿主约定一致：0 为前置，1 为后置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraFacing {
  Front,
  Back,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("无效的相机朝向: {0}（仅支持 0 或 1）")]
pub struct InvalidFacing(pub i32);

impl TryFrom<i32> for CameraFacing {
  type Error = InvalidFacing;

  fn try_from(value: i32) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(CameraFacing::Front),
      1 => Ok(CameraFacing::Back),
      other => Err(InvalidFacing(other)),
    }
  }
}

impl fmt::Display for CameraFacing {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CameraFacing::Front => write!(f, "前置"),
      CameraFacing::Back => write!(f, "后置"),
    }
  }
}

/// 相机帧来源
pub trait CameraSource {
  type Error: std::error::Error + Send + Sync + 'static;

  fn open(&mut self, facing: CameraFacing) -> Result<(), Self::Error>;

  fn close(&mut self) -> Result<(), Self::Error>;

  /// 取一帧 RGB 图像，相机未打开时返回 `None`
  fn capture(&mut self) -> Result<Option<RgbImage>, Self::Error>;
}
