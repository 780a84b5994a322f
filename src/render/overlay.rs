// 该文件是 Shijing （视镜） 项目的一部分。
// src/render/overlay.rs - 帧率标签绘制
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

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

// 文本渲染常量
pub(crate) const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_BACKGROUND: [u8; 3] = [255, 255, 255];
const LABEL_TEXT_COLOR: [u8; 3] = [0, 0, 0];

/// 内置字体（DejaVu Sans Mono），未指定字体时使用
pub fn default_font() -> FontArc {
  let font_data: &'static [u8] = include_bytes!("../../assets/font.ttf");
  FontArc::try_from_slice(font_data).expect("无法加载嵌入的字体文件")
}

/// 标签在帧内的位置，贴右上角
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelBox {
  pub x: u32,
  pub y: u32,
  pub width: u32,
  /// 文本高度加基线
  pub height: u32,
}

pub struct FpsOverlay {
  font: FontArc,
  scale: PxScale,
}

impl std::fmt::Debug for FpsOverlay {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FpsOverlay")
      .field("scale", &self.scale)
      .finish_non_exhaustive()
  }
}

impl Default for FpsOverlay {
  fn default() -> Self {
    Self::new(None, LABEL_FONT_SIZE)
  }
}

impl FpsOverlay {
  pub fn new(font: Option<FontArc>, font_size: f32) -> Self {
    Self {
      font: font.unwrap_or_else(default_font),
      scale: PxScale::from(font_size),
    }
  }

  pub fn label_text(fps: f32) -> String {
    format!("FPS={:.2}", fps)
  }

  // 返回 (文本宽, 基线以上高度, 基线以下高度)
  fn measure(&self, text: &str) -> (u32, u32, u32) {
    let (width, _) = text_size(self.scale, &self.font, text);
    let scaled = self.font.as_scaled(self.scale);
    (
      width,
      scaled.ascent().ceil() as u32,
      scaled.descent().abs().ceil() as u32,
    )
  }

  pub fn label_box(&self, text: &str, frame_width: u32, frame_height: u32) -> LabelBox {
    let (text_width, text_height, baseline) = self.measure(text);
    let width = text_width.min(frame_width);
    LabelBox {
      x: frame_width - width,
      y: 0,
      width,
      height: (text_height + baseline).min(frame_height),
    }
  }

  /// 在帧右上角绘制白底黑字的帧率标签
  pub fn draw(&self, image: &mut RgbImage, fps: f32) -> LabelBox {
    let text = Self::label_text(fps);
    let label = self.label_box(&text, image.width(), image.height());

    if label.width > 0 && label.height > 0 {
      let rect = Rect::at(label.x as i32, label.y as i32).of_size(label.width, label.height);
      draw_filled_rect_mut(image, rect, Rgb(LABEL_BACKGROUND));
      draw_text_mut(
        image,
        Rgb(LABEL_TEXT_COLOR),
        label.x as i32,
        label.y as i32,
        self.scale,
        &self.font,
        &text,
      );
    }

    label
  }
}
