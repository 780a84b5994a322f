use image::{Rgb, RgbImage, Rgba, RgbaImage};
use shijing::convert::{ConvertError, bitmap_to_matrix, matrix_to_bitmap, pack_rgb565};
use shijing::frame::{Matrix, PixelLayout};
use shijing::platform::memory::MemoryBitmap;
use shijing::platform::{Bitmap, BitmapFormat};

#[cfg(test)]
mod bitmap_tests {
  use super::*;

  fn rgba_pattern(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
      Rgba([
        (x * 13 % 256) as u8,
        (y * 7 % 256) as u8,
        ((x ^ y) % 256) as u8,
        ((x + y) % 256) as u8,
      ])
    })
  }

  #[test]
  fn test_rgba_bitmap_round_trip_is_identity() {
    let image = rgba_pattern(17, 9);
    let mut bitmap = MemoryBitmap::from_rgba_image(&image);

    let matrix = bitmap_to_matrix(&mut bitmap).unwrap();
    assert_eq!(matrix.layout(), PixelLayout::Rgba);
    assert_eq!((matrix.cols(), matrix.rows()), (17, 9));

    let mut restored = MemoryBitmap::new(17, 9, BitmapFormat::Rgba8888);
    matrix_to_bitmap(&matrix, &mut restored).unwrap();
    assert_eq!(restored.to_rgba_image().unwrap(), image);
    assert!(!restored.is_locked());
  }

  #[test]
  fn test_rgb565_bitmap_round_trip_is_identity() {
    let image = RgbImage::from_fn(11, 5, |x, y| {
      Rgb([(x * 23) as u8, (y * 50) as u8, (x * y * 3) as u8])
    });
    let mut bitmap = MemoryBitmap::from_rgb_image_565(&image);
    let original = bitmap.pixels().to_vec();

    let matrix = bitmap_to_matrix(&mut bitmap).unwrap();
    assert_eq!(matrix.layout(), PixelLayout::Bgr);

    let mut restored = MemoryBitmap::new(11, 5, BitmapFormat::Rgb565);
    matrix_to_bitmap(&matrix, &mut restored).unwrap();
    assert_eq!(restored.pixels(), original.as_slice());
  }

  #[test]
  fn test_padded_stride_is_preserved() {
    let image = rgba_pattern(5, 4);
    let mut source = MemoryBitmap::with_stride(5, 4, 32, BitmapFormat::Rgba8888);
    let matrix = Matrix::from_raw(4, 5, PixelLayout::Rgba, image.as_raw().clone()).unwrap();
    matrix_to_bitmap(&matrix, &mut source).unwrap();

    let read_back = bitmap_to_matrix(&mut source).unwrap();
    assert_eq!(read_back, matrix);
    // 行尾填充不会被写入
    assert!(source.pixels()[20..32].iter().all(|&b| b == 0));
  }

  #[test]
  fn test_rgb_matrix_into_565_bitmap() {
    let matrix = Matrix::from(RgbImage::from_pixel(2, 2, Rgb([255, 128, 8])));
    let mut bitmap = MemoryBitmap::new(2, 2, BitmapFormat::Rgb565);
    matrix_to_bitmap(&matrix, &mut bitmap).unwrap();

    let expected = pack_rgb565(255, 128, 8).to_le_bytes();
    for pixel in bitmap.pixels().chunks_exact(2) {
      assert_eq!(pixel, expected);
    }
  }

  #[test]
  fn test_dimension_mismatch_is_rejected() {
    let matrix = Matrix::from(RgbImage::new(4, 4));
    let mut bitmap = MemoryBitmap::new(4, 5, BitmapFormat::Rgba8888);
    let err = matrix_to_bitmap(&matrix, &mut bitmap).unwrap_err();
    assert!(matches!(err, ConvertError::DimensionMismatch { .. }));
    assert!(bitmap.pixels().iter().all(|&b| b == 0));
  }

  #[test]
  fn test_unsupported_bitmap_formats() {
    for format in [BitmapFormat::Rgba4444, BitmapFormat::A8, BitmapFormat::RgbaF16] {
      let mut bitmap = MemoryBitmap::new(3, 3, format);
      assert!(matches!(
        bitmap_to_matrix(&mut bitmap),
        Err(ConvertError::UnsupportedFormat(f)) if f == format
      ));
      assert_eq!(bitmap.info().unwrap().format, format);
    }
  }

  #[test]
  fn test_unsupported_destination_is_left_untouched() {
    let matrix = Matrix::from(RgbImage::from_pixel(3, 2, Rgb([9, 9, 9])));
    for format in [BitmapFormat::A8, BitmapFormat::Rgba4444] {
      let mut bitmap = MemoryBitmap::new(3, 2, format);
      bitmap.with_locked_pixels(|pixels| pixels.fill(0xAB)).unwrap();
      let before = bitmap.pixels().to_vec();

      assert!(matches!(
        matrix_to_bitmap(&matrix, &mut bitmap),
        Err(ConvertError::UnsupportedFormat(f)) if f == format
      ));
      assert_eq!(bitmap.pixels(), before.as_slice());
      assert!(!bitmap.is_locked());
    }
  }

  #[test]
  fn test_gray_matrix_into_565_bitmap() {
    let matrix = Matrix::from_raw(1, 3, PixelLayout::Gray, vec![0x80, 0xFF, 0x00]).unwrap();
    let mut bitmap = MemoryBitmap::new(3, 1, BitmapFormat::Rgb565);
    matrix_to_bitmap(&matrix, &mut bitmap).unwrap();
    // 0x8410、0xFFFF、0x0000，小端存放
    assert_eq!(bitmap.pixels(), &[0x10, 0x84, 0xFF, 0xFF, 0x00, 0x00]);
  }

  #[test]
  fn test_bgr_matrix_into_rgba_bitmap() {
    let matrix = Matrix::from_raw(1, 2, PixelLayout::Bgr, vec![10, 20, 30, 0, 128, 255]).unwrap();
    let mut bitmap = MemoryBitmap::new(2, 1, BitmapFormat::Rgba8888);
    matrix_to_bitmap(&matrix, &mut bitmap).unwrap();
    assert_eq!(bitmap.pixels(), &[30, 20, 10, 255, 255, 128, 0, 255]);
  }
}
