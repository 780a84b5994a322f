// 该文件是 Shijing （视镜） 项目的一部分。
// src/render/crop.rs - 按目标宽高比裁剪
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
  pub x: u32,
  pub y: u32,
  pub width: u32,
  pub height: u32,
}

impl CropRect {
  pub fn is_empty(&self) -> bool {
    self.width == 0 || self.height == 0
  }
}

/// 计算 `width`x`height` 帧内与目标宽高比一致的居中区域
///
/// 目标比帧更宽时保留整行宽度、裁掉上下；否则保留整列高度、裁掉左右。
/// 结果向下取整，目标尺寸为 0 时返回 `None`。
pub fn crop_to_aspect(
  width: u32,
  height: u32,
  target_width: u32,
  target_height: u32,
) -> Option<CropRect> {
  if target_width == 0 || target_height == 0 {
    return None;
  }

  let (w, h) = (width as u64, height as u64);
  let (tw, th) = (target_width as u64, target_height as u64);

  let rect = if tw * h > th * w {
    let roi_height = w * th / tw;
    CropRect {
      x: 0,
      y: ((h - roi_height) / 2) as u32,
      width,
      height: roi_height as u32,
    }
  } else {
    let roi_width = h * tw / th;
    CropRect {
      x: ((w - roi_width) / 2) as u32,
      y: 0,
      width: roi_width as u32,
      height,
    }
  };

  Some(rect)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn landscape_frame_into_portrait_window() {
    let rect = crop_to_aspect(640, 480, 1080, 1920).unwrap();
    assert_eq!(
      rect,
      CropRect {
        x: 185,
        y: 0,
        width: 270,
        height: 480
      }
    );
  }

  #[test]
  fn portrait_frame_into_landscape_window() {
    let rect = crop_to_aspect(480, 640, 1920, 1080).unwrap();
    assert_eq!(
      rect,
      CropRect {
        x: 0,
        y: 185,
        width: 480,
        height: 270
      }
    );
  }

  #[test]
  fn matching_aspect_keeps_whole_frame() {
    let rect = crop_to_aspect(640, 480, 1280, 960).unwrap();
    assert_eq!(
      rect,
      CropRect {
        x: 0,
        y: 0,
        width: 640,
        height: 480
      }
    );
  }

  #[test]
  fn aspect_and_centering_hold_across_sizes() {
    let frames = [(640, 480), (480, 640), (1920, 1080), (333, 777), (1, 1000)];
    let targets = [(1080, 1920), (1920, 1080), (100, 100), (7, 3), (720, 1280)];
    for &(w, h) in &frames {
      for &(tw, th) in &targets {
        let rect = crop_to_aspect(w, h, tw, th).unwrap();
        assert!(rect.x + rect.width <= w, "{:?} 超出帧宽", rect);
        assert!(rect.y + rect.height <= h, "{:?} 超出帧高", rect);

        // 取整误差不超过一个像素
        let lhs = rect.width as i64 * th as i64;
        let rhs = rect.height as i64 * tw as i64;
        assert!(
          (lhs - rhs).abs() <= tw.max(th) as i64,
          "{}x{} -> {}x{}: {:?}",
          w,
          h,
          tw,
          th,
          rect
        );

        // 居中
        let left = rect.x as i64;
        let right = (w - rect.x - rect.width) as i64;
        let top = rect.y as i64;
        let bottom = (h - rect.y - rect.height) as i64;
        assert!((left - right).abs() <= 1);
        assert!((top - bottom).abs() <= 1);
      }
    }
  }

  #[test]
  fn zero_sized_target_has_no_crop() {
    assert_eq!(crop_to_aspect(640, 480, 0, 1920), None);
  }
}
