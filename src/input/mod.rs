// 该文件是 Shijing （视镜） 项目的一部分。
// src/input/mod.rs - 相机输入模块
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

mod core;
mod image_file;
#[cfg(feature = "v4l_input")]
mod v4l_input;

pub use self::core::{CameraFacing, CameraSource, InvalidFacing};
pub use self::image_file::{ImageFileCamera, ImageFileCameraError};
#[cfg(feature = "v4l_input")]
pub use self::v4l_input::{V4lCamera, V4lCameraError};

use thiserror::Error;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme};

#[derive(Error, Debug)]
pub enum InputError {
  #[error("不支持的输入方案: {0}")]
  UnsupportedScheme(String),
  #[error(transparent)]
  ImageFile(#[from] ImageFileCameraError),
  #[cfg(feature = "v4l_input")]
  #[error(transparent)]
  V4l(#[from] V4lCameraError),
}

/// 按 URL 方案选择的相机
pub enum CameraWrapper {
  ImageFile(ImageFileCamera),
  #[cfg(feature = "v4l_input")]
  V4l(V4lCamera),
}

impl FromUrl for CameraWrapper {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      scheme if scheme == ImageFileCamera::SCHEME => {
        Ok(CameraWrapper::ImageFile(ImageFileCamera::from_url(url)?))
      }
      #[cfg(feature = "v4l_input")]
      scheme if scheme == V4lCamera::SCHEME => Ok(CameraWrapper::V4l(V4lCamera::from_url(url)?)),
      other => Err(InputError::UnsupportedScheme(other.to_string())),
    }
  }
}

impl CameraSource for CameraWrapper {
  type Error = InputError;

  fn open(&mut self, facing: CameraFacing) -> Result<(), Self::Error> {
    match self {
      CameraWrapper::ImageFile(camera) => Ok(camera.open(facing)?),
      #[cfg(feature = "v4l_input")]
      CameraWrapper::V4l(camera) => Ok(camera.open(facing)?),
    }
  }

  fn close(&mut self) -> Result<(), Self::Error> {
    match self {
      CameraWrapper::ImageFile(camera) => Ok(camera.close()?),
      #[cfg(feature = "v4l_input")]
      CameraWrapper::V4l(camera) => Ok(camera.close()?),
    }
  }

  fn capture(&mut self) -> Result<Option<image::RgbImage>, Self::Error> {
    match self {
      CameraWrapper::ImageFile(camera) => Ok(camera.capture()?),
      #[cfg(feature = "v4l_input")]
      CameraWrapper::V4l(camera) => Ok(camera.capture()?),
    }
  }
}
