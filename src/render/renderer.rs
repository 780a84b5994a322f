// 该文件是 Shijing （视镜） 项目的一部分。
// src/render/renderer.rs - 相机帧渲染器
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

use ab_glyph::FontArc;
use image::{RgbImage, imageops};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::platform::{BufferFormat, NativeWindow, PlatformError};
use crate::render::overlay::LABEL_FONT_SIZE;
use crate::render::{FpsMeter, FpsOverlay, crop_to_aspect, expand_rgb_to_rgba};

#[derive(Error, Debug)]
pub enum RenderError {
  #[error("尚未设置输出窗口")]
  NoWindow,
  #[error("输出窗口尺寸无效: {width}x{height}")]
  InvalidWindowSize { width: u32, height: u32 },
  #[error("裁剪结果为空: 帧 {frame_width}x{frame_height}, 窗口 {window_width}x{window_height}")]
  EmptyCrop {
    frame_width: u32,
    frame_height: u32,
    window_width: u32,
    window_height: u32,
  },
  #[error("窗口操作失败: {0}")]
  Window(PlatformError),
}

/// 单帧渲染结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
  /// 已写入并提交，尺寸为裁剪后的大小
  Presented { width: u32, height: u32 },
  /// 缓冲区格式不是四通道 8 位格式，本帧被丢弃
  Dropped(BufferFormat),
}

#[derive(Debug, Clone)]
pub struct RendererConfig {
  /// 帧率标签字体，缺省时使用内置字体
  pub font: Option<FontArc>,
  pub font_size: f32,
  pub show_fps: bool,
}

impl Default for RendererConfig {
  fn default() -> Self {
    Self {
      font: None,
      font_size: LABEL_FONT_SIZE,
      show_fps: true,
    }
  }
}

/// 把相机帧按窗口宽高比裁剪后绘制到窗口上
#[derive(Debug)]
pub struct CameraRenderer<W> {
  window: Option<W>,
  fps: FpsMeter,
  overlay: FpsOverlay,
  show_fps: bool,
}

impl<W: NativeWindow> Default for CameraRenderer<W> {
  fn default() -> Self {
    Self::new(RendererConfig::default())
  }
}

impl<W: NativeWindow> CameraRenderer<W> {
  pub fn new(config: RendererConfig) -> Self {
    Self {
      window: None,
      fps: FpsMeter::new(),
      overlay: FpsOverlay::new(config.font, config.font_size),
      show_fps: config.show_fps,
    }
  }

  /// 替换输出窗口，旧窗口的引用随之释放
  pub fn set_window(&mut self, window: W) {
    info!("设置输出窗口: {}x{}", window.width(), window.height());
    if self.window.replace(window).is_some() {
      debug!("已释放旧的输出窗口");
    }
  }

  /// 释放当前输出窗口
  pub fn clear_window(&mut self) -> Option<W> {
    self.window.take()
  }

  pub fn window(&self) -> Option<&W> {
    self.window.as_ref()
  }

  pub fn fps(&self) -> &FpsMeter {
    &self.fps
  }

  pub fn on_image(&mut self, frame: &RgbImage) -> Result<RenderOutcome, RenderError> {
    self.on_image_at(frame, Instant::now())
  }

  /// 以给定的到达时间渲染一帧
  pub fn on_image_at(
    &mut self,
    frame: &RgbImage,
    now: Instant,
  ) -> Result<RenderOutcome, RenderError> {
    let window = self.window.as_ref().ok_or(RenderError::NoWindow)?;
    let (target_width, target_height) = (window.width(), window.height());

    let rect = crop_to_aspect(frame.width(), frame.height(), target_width, target_height).ok_or(
      RenderError::InvalidWindowSize {
        width: target_width,
        height: target_height,
      },
    )?;
    if rect.is_empty() {
      return Err(RenderError::EmptyCrop {
        frame_width: frame.width(),
        frame_height: frame.height(),
        window_width: target_width,
        window_height: target_height,
      });
    }

    let mut roi = imageops::crop_imm(frame, rect.x, rect.y, rect.width, rect.height).to_image();

    let fps = self.fps.tick(now);
    if self.show_fps
      && let Some(fps) = fps
    {
      self.overlay.draw(&mut roi, fps);
    }

    window
      .set_buffers_geometry(roi.width(), roi.height(), BufferFormat::R8G8B8A8)
      .map_err(|e| RenderError::Window(Box::new(e)))?;

    let outcome = window
      .lock_and_post(|mut buf| {
        debug!(
          "on_image {}x{} -> {}x{} -> {}x{} -> {}x{} 跨度 {}",
          frame.width(),
          frame.height(),
          target_width,
          target_height,
          roi.width(),
          roi.height(),
          buf.width,
          buf.height,
          buf.stride
        );

        match buf.format {
          BufferFormat::R8G8B8A8 | BufferFormat::R8G8B8X8 => {
            expand_rgb_to_rgba(&roi, &mut buf);
            RenderOutcome::Presented {
              width: roi.width(),
              height: roi.height(),
            }
          }
          other => RenderOutcome::Dropped(other),
        }
      })
      .map_err(|e| RenderError::Window(Box::new(e)))?;

    if let RenderOutcome::Dropped(format) = outcome {
      warn!("窗口缓冲区格式 {:?} 不受支持, 丢弃本帧", format);
    }

    Ok(outcome)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::memory::MemoryWindow;
  use image::Rgb;

  #[test]
  fn rendering_without_window_fails_fast() {
    let mut renderer: CameraRenderer<MemoryWindow> = CameraRenderer::default();
    let frame = RgbImage::new(4, 4);
    assert!(matches!(renderer.on_image(&frame), Err(RenderError::NoWindow)));
  }

  #[test]
  fn zero_sized_window_is_an_error() {
    let mut renderer = CameraRenderer::default();
    renderer.set_window(MemoryWindow::new(0, 100));
    let frame = RgbImage::new(4, 4);
    assert!(matches!(
      renderer.on_image(&frame),
      Err(RenderError::InvalidWindowSize { .. })
    ));
  }

  #[test]
  fn unsupported_buffer_format_drops_the_frame() {
    let window = MemoryWindow::new(10, 10).with_forced_format(BufferFormat::R5G6B5);
    let mut renderer = CameraRenderer::default();
    renderer.set_window(window.clone());

    let frame = RgbImage::from_pixel(10, 10, Rgb([1, 2, 3]));
    let outcome = renderer.on_image(&frame).unwrap();
    assert_eq!(outcome, RenderOutcome::Dropped(BufferFormat::R5G6B5));
    assert_eq!(window.posted_frames().unwrap(), 1);
    assert!(window.snapshot().unwrap().is_none());
  }
}
