// 该文件是 Shijing （视镜） 项目的一部分。
// src/render/blit.rs - RGB 到 RGBA 的缓冲区拷贝
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

use crate::platform::WindowBuffer;

/// 把 RGB 图像逐行展开为 RGBA 写入窗口缓冲区，alpha 固定为 255
///
/// 按缓冲区跨度定位每一行；图像超出缓冲区的部分被忽略。返回写入的行数。
pub fn expand_rgb_to_rgba(src: &RgbImage, buf: &mut WindowBuffer<'_>) -> usize {
  let cols = src.width().min(buf.width) as usize;
  let row_bytes = buf.stride as usize * 4;
  let src_row_bytes = src.width() as usize * 3;
  let raw = src.as_raw();

  let mut rows = 0;
  for y in 0..src.height().min(buf.height) as usize {
    let start = y * row_bytes;
    let Some(dst) = buf.bits.get_mut(start..start + cols * 4) else {
      break;
    };
    let row = &raw[y * src_row_bytes..y * src_row_bytes + cols * 3];
    expand_row(row, dst);
    rows += 1;
  }
  rows
}

fn expand_row(src: &[u8], dst: &mut [u8]) {
  #[cfg(target_arch = "aarch64")]
  let done = expand_row_neon(src, dst);
  #[cfg(not(target_arch = "aarch64"))]
  let done = 0;

  for (out, px) in dst[done * 4..]
    .chunks_exact_mut(4)
    .zip(src[done * 3..].chunks_exact(3))
  {
    out[0] = px[0];
    out[1] = px[1];
    out[2] = px[2];
    out[3] = 255;
  }
}

// 每次处理 8 个像素，返回已处理的像素数
#[cfg(target_arch = "aarch64")]
fn expand_row_neon(src: &[u8], dst: &mut [u8]) -> usize {
  use std::arch::aarch64::{uint8x8x4_t, vdup_n_u8, vld3_u8, vst4_u8};

  let pixels = (src.len() / 3).min(dst.len() / 4) / 8 * 8;
  for x in (0..pixels).step_by(8) {
    // SAFETY: 读取 src[x*3..x*3+24]、写入 dst[x*4..x*4+32]，均不超过 pixels 的范围
    unsafe {
      let rgb = vld3_u8(src.as_ptr().add(x * 3));
      let rgba = uint8x8x4_t(rgb.0, rgb.1, rgb.2, vdup_n_u8(255));
      vst4_u8(dst.as_mut_ptr().add(x * 4), rgba);
    }
  }
  pixels
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::BufferFormat;
  use image::Rgb;

  #[test]
  fn expands_with_opaque_alpha_and_honours_stride() {
    // 宽 11 覆盖 8 像素块与剩余像素两条路径
    let src = RgbImage::from_fn(11, 3, |x, y| Rgb([x as u8, y as u8, (x + y) as u8 * 10]));
    let stride = 16;
    let mut bits = vec![0u8; stride * 3 * 4];
    let mut buf = WindowBuffer {
      width: 11,
      height: 3,
      stride: stride as u32,
      format: BufferFormat::R8G8B8A8,
      bits: &mut bits,
    };

    assert_eq!(expand_rgb_to_rgba(&src, &mut buf), 3);

    for y in 0..3usize {
      for x in 0..11usize {
        let idx = y * stride * 4 + x * 4;
        let px = src.get_pixel(x as u32, y as u32);
        assert_eq!(&bits[idx..idx + 4], &[px[0], px[1], px[2], 255]);
      }
      // 行填充不被写入
      let pad = y * stride * 4 + 11 * 4;
      assert!(bits[pad..pad + (stride - 11) * 4].iter().all(|&b| b == 0));
    }
  }

  #[test]
  fn clips_to_smaller_buffer() {
    let src = RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]));
    let mut bits = vec![0u8; 2 * 2 * 4];
    let mut buf = WindowBuffer {
      width: 2,
      height: 2,
      stride: 2,
      format: BufferFormat::R8G8B8X8,
      bits: &mut bits,
    };
    assert_eq!(expand_rgb_to_rgba(&src, &mut buf), 2);
    assert_eq!(bits, [1, 2, 3, 255].repeat(4));
  }
}
