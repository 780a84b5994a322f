// 该文件是 Shijing （视镜） 项目的一部分。
// src/input/image_file.rs - 图像文件模拟相机
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

use image::{ImageReader, RgbImage, imageops};
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  input::{CameraFacing, CameraSource},
};

#[derive(Error, Debug)]
pub enum ImageFileCameraError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(#[from] image::ImageError),
}

/// 反复输出同一张静态图像的相机，前置朝向时水平镜像
pub struct ImageFileCamera {
  image: RgbImage,
  facing: Option<CameraFacing>,
}

impl FromUrlWithScheme for ImageFileCamera {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileCamera {
  type Error = ImageFileCameraError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileCameraError::SchemaMismatch);
    }

    let image = ImageReader::open(url.path())?.decode()?.to_rgb8();
    Ok(Self::from_image(image))
  }
}

impl ImageFileCamera {
  pub fn from_image(image: RgbImage) -> Self {
    Self {
      image,
      facing: None,
    }
  }

  pub fn facing(&self) -> Option<CameraFacing> {
    self.facing
  }
}

impl CameraSource for ImageFileCamera {
  type Error = ImageFileCameraError;

  fn open(&mut self, facing: CameraFacing) -> Result<(), Self::Error> {
    info!(
      "打开图像相机 ({}): {}x{}",
      facing,
      self.image.width(),
      self.image.height()
    );
    self.facing = Some(facing);
    Ok(())
  }

  fn close(&mut self) -> Result<(), Self::Error> {
    if self.facing.take().is_some() {
      info!("关闭图像相机");
    }
    Ok(())
  }

  fn capture(&mut self) -> Result<Option<RgbImage>, Self::Error> {
    Ok(match self.facing {
      Some(CameraFacing::Front) => Some(imageops::flip_horizontal(&self.image)),
      Some(CameraFacing::Back) => Some(self.image.clone()),
      None => None,
    })
  }
}
