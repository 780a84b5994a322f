// 该文件是 Shijing （视镜） 项目的一部分。
// src/input/v4l_input.rs - V4L 相机输入
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

use image::RgbImage;
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;
use v4l::{FourCC, io::traits::CaptureStream, video::Capture};

use crate::{
  FromUrl, FromUrlWithScheme,
  input::{CameraFacing, CameraSource},
};

const DEFAULT_BACK_DEVICE: &str = "/dev/video0";
const DEFAULT_FRONT_DEVICE: &str = "/dev/video1";
const CAPTURE_BUFFERS: u32 = 4;

#[derive(Error, Debug)]
pub enum V4lCameraError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Unsupported pixel format: {0}")]
  UnsupportedPixelFormat(String),
  #[error("Captured buffer size mismatch: expected {expected}, got {actual}")]
  BufferSizeMismatch { expected: usize, actual: usize },
}

struct OpenDevice {
  device: v4l::Device,
  width: u32,
  height: u32,
}

/// V4L 设备相机，前后朝向各对应一个设备节点
///
/// `v4l:///dev/video0?front=/dev/video2`：路径为后置设备，`front` 参数为前置设备。
pub struct V4lCamera {
  back_device: String,
  front_device: String,
  open: Option<OpenDevice>,
}

impl FromUrlWithScheme for V4lCamera {
  const SCHEME: &'static str = "v4l";
}

impl FromUrl for V4lCamera {
  type Error = V4lCameraError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(V4lCameraError::SchemaMismatch);
    }

    let back_device = if url.path().is_empty() || url.path() == "/" {
      DEFAULT_BACK_DEVICE.to_string()
    } else {
      url.path().to_string()
    };
    let front_device = url
      .query_pairs()
      .find(|(k, _)| k == "front")
      .map(|(_, v)| v.into_owned())
      .unwrap_or_else(|| DEFAULT_FRONT_DEVICE.to_string());

    Ok(V4lCamera {
      back_device,
      front_device,
      open: None,
    })
  }
}

impl CameraSource for V4lCamera {
  type Error = V4lCameraError;

  fn open(&mut self, facing: CameraFacing) -> Result<(), Self::Error> {
    let path = match facing {
      CameraFacing::Front => &self.front_device,
      CameraFacing::Back => &self.back_device,
    };
    info!("打开 V4L 设备 ({}): {}", facing, path);

    let device = v4l::Device::with_path(path)?;
    let mut format = device.format()?;
    format.fourcc = FourCC::new(b"RGB3");
    let format = device.set_format(&format)?;
    if format.fourcc != FourCC::new(b"RGB3") {
      error!("设备不支持 RGB3 格式, 实际格式 {}", format.fourcc);
      return Err(V4lCameraError::UnsupportedPixelFormat(
        format.fourcc.to_string(),
      ));
    }

    debug!("V4L 采集尺寸: {}x{}", format.width, format.height);
    self.open = Some(OpenDevice {
      device,
      width: format.width,
      height: format.height,
    });
    Ok(())
  }

  fn close(&mut self) -> Result<(), Self::Error> {
    if self.open.take().is_some() {
      info!("关闭 V4L 设备");
    }
    Ok(())
  }

  fn capture(&mut self) -> Result<Option<RgbImage>, Self::Error> {
    let Some(open) = self.open.as_mut() else {
      return Ok(None);
    };

    let mut stream = v4l::io::mmap::Stream::with_buffers(
      &mut open.device,
      v4l::buffer::Type::VideoCapture,
      CAPTURE_BUFFERS,
    )?;
    let (buf, _meta) = stream.next()?;

    let expected = open.width as usize * open.height as usize * 3;
    if buf.len() < expected {
      error!("Captured buffer size mismatch");
      return Err(V4lCameraError::BufferSizeMismatch {
        expected,
        actual: buf.len(),
      });
    }

    Ok(RgbImage::from_raw(
      open.width,
      open.height,
      buf[..expected].to_vec(),
    ))
  }
}
