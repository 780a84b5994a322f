use std::convert::Infallible;
use std::sync::{
  Arc,
  atomic::{AtomicBool, AtomicUsize, Ordering},
};

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use shijing::assets::{AssetError, DirectoryAssets};
use shijing::input::{CameraFacing, CameraSource, ImageFileCamera};
use shijing::model::{DEFAULT_MODEL_BIN, DEFAULT_MODEL_PARAM, STYLE_NAMES};
use shijing::platform::BitmapFormat;
use shijing::platform::memory::{MemoryBitmap, MemoryWindow};
use shijing::render::{RenderOutcome, RendererConfig};
use shijing::session::{DetectorSession, SessionError, StyleError, StyleSession};
use shijing::task::{ContinuousTask, Task};

#[cfg(test)]
mod session_tests {
  use super::*;

  /// 记录调用次数的相机
  #[derive(Default)]
  struct CountingCamera {
    opens: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    frames_left: usize,
  }

  impl CameraSource for CountingCamera {
    type Error = Infallible;

    fn open(&mut self, _facing: CameraFacing) -> Result<(), Infallible> {
      self.opens.fetch_add(1, Ordering::SeqCst);
      Ok(())
    }

    fn close(&mut self) -> Result<(), Infallible> {
      self.closes.fetch_add(1, Ordering::SeqCst);
      Ok(())
    }

    fn capture(&mut self) -> Result<Option<RgbImage>, Infallible> {
      if self.frames_left == 0 {
        return Ok(None);
      }
      self.frames_left -= 1;
      Ok(Some(RgbImage::from_pixel(64, 48, Rgb([40, 80, 120]))))
    }
  }

  fn quiet() -> RendererConfig {
    RendererConfig {
      show_fps: false,
      ..RendererConfig::default()
    }
  }

  #[test]
  fn test_invalid_facing_never_reaches_camera() {
    let camera = CountingCamera::default();
    let opens = camera.opens.clone();
    let closes = camera.closes.clone();
    let mut session: DetectorSession<MemoryWindow, _> = DetectorSession::new(camera, quiet());

    for facing in [2, -1, 100] {
      assert!(matches!(
        session.open_camera(facing),
        Err(SessionError::InvalidFacing(_))
      ));
    }
    assert_eq!(session.facing(), None);
    assert_eq!(opens.load(Ordering::SeqCst), 0);
    assert_eq!(closes.load(Ordering::SeqCst), 0);

    session.open_camera(0).unwrap();
    assert_eq!(session.facing(), Some(CameraFacing::Front));

    // 切换朝向会先关闭当前相机
    session.open_camera(1).unwrap();
    assert_eq!(session.facing(), Some(CameraFacing::Back));
    assert_eq!(opens.load(Ordering::SeqCst), 2);
    assert_eq!(closes.load(Ordering::SeqCst), 1);

    // 非法朝向不影响已打开的相机
    assert!(session.open_camera(7).is_err());
    assert_eq!(session.facing(), Some(CameraFacing::Back));
  }

  #[test]
  fn test_process_frame_without_window() {
    let mut session: DetectorSession<MemoryWindow, _> = DetectorSession::new(
      CountingCamera {
        frames_left: 1,
        ..Default::default()
      },
      quiet(),
    );
    session.open_camera(1).unwrap();
    assert!(matches!(
      session.process_frame(),
      Err(SessionError::Render(_))
    ));
  }

  #[test]
  fn test_image_camera_renders_into_window() {
    let image = RgbImage::from_fn(40, 20, |x, _| {
      if x < 20 {
        Rgb([255, 0, 0])
      } else {
        Rgb([0, 0, 255])
      }
    });
    let window = MemoryWindow::new(40, 20);
    let mut session = DetectorSession::new(ImageFileCamera::from_image(image), quiet());
    session.set_output_window(window.clone());

    // 相机未打开时没有帧
    assert_eq!(session.process_frame().unwrap(), None);

    session.open_camera(0).unwrap();
    assert_eq!(
      session.process_frame().unwrap(),
      Some(RenderOutcome::Presented {
        width: 40,
        height: 20
      })
    );
    // 前置相机做镜像
    let shown = window.snapshot().unwrap().unwrap();
    assert_eq!(shown.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
    assert_eq!(shown.get_pixel(39, 0), &Rgba([255, 0, 0, 255]));

    session.close_camera().unwrap();
    assert_eq!(session.process_frame().unwrap(), None);
  }

  #[test]
  fn test_continuous_task_stops_when_camera_runs_dry() {
    let window = MemoryWindow::new(32, 32);
    let mut session = DetectorSession::new(
      CountingCamera {
        frames_left: 5,
        ..Default::default()
      },
      quiet(),
    );
    session.set_output_window(window.clone());
    session.open_camera(1).unwrap();

    let mut seen = Vec::new();
    ContinuousTask::default()
      .with_stop_flag(Arc::new(AtomicBool::new(false)))
      .on_frame(|index, _| {
        seen.push(index);
        Ok(())
      })
      .run_task(&mut session)
      .unwrap();

    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    assert_eq!(window.posted_frames().unwrap(), 5);
  }

  #[test]
  fn test_continuous_task_honours_frame_limit_and_stop_flag() {
    let window = MemoryWindow::new(32, 32);
    let mut session = DetectorSession::new(
      CountingCamera {
        frames_left: 100,
        ..Default::default()
      },
      quiet(),
    );
    session.set_output_window(window.clone());
    session.open_camera(1).unwrap();

    ContinuousTask::default()
      .with_frame_number(Some(3))
      .with_stop_flag(Arc::new(AtomicBool::new(false)))
      .run_task(&mut session)
      .unwrap();
    assert_eq!(window.posted_frames().unwrap(), 3);

    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    ContinuousTask::default()
      .with_stop_flag(stop)
      .on_frame(move |index, _| {
        if index == 2 {
          flag.store(true, Ordering::SeqCst);
        }
        Ok(())
      })
      .run_task(&mut session)
      .unwrap();
    assert_eq!(window.posted_frames().unwrap(), 5);
  }

  fn write_styles(dir: &std::path::Path) {
    for name in STYLE_NAMES {
      std::fs::write(
        dir.join(format!("{}.cmat", name)),
        "# 交换红蓝\n0 0 1 0\n0 1 0 0\n1 0 0 0\n",
      )
      .unwrap();
    }
  }

  #[test]
  fn test_style_transfer_rewrites_rgba_bitmap() {
    let dir = tempfile::tempdir().unwrap();
    write_styles(dir.path());

    let mut session = StyleSession::new();
    session.init(&DirectoryAssets::new(dir.path())).unwrap();
    assert_eq!(session.styles().map(|s| s.len()), Some(STYLE_NAMES.len()));

    let image = RgbaImage::from_pixel(6, 4, Rgba([200, 100, 10, 77]));
    let mut bitmap = MemoryBitmap::from_rgba_image(&image);
    session.style_transfer(&mut bitmap, 3, true).unwrap();

    let result = bitmap.to_rgba_image().unwrap();
    assert!(result.pixels().all(|p| *p == Rgba([10, 100, 200, 255])));
    assert!(!bitmap.is_locked());
  }

  #[test]
  fn test_style_transfer_rejections() {
    let image = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4]));
    let mut bitmap = MemoryBitmap::from_rgba_image(&image);

    let session = StyleSession::new();
    assert!(matches!(
      session.style_transfer(&mut bitmap, 0, false),
      Err(StyleError::NotInitialized)
    ));

    let dir = tempfile::tempdir().unwrap();
    write_styles(dir.path());
    let mut session = StyleSession::new();
    session.init(&DirectoryAssets::new(dir.path())).unwrap();

    for id in [-1, 5] {
      assert!(matches!(
        session.style_transfer(&mut bitmap, id, false),
        Err(StyleError::UnknownStyle(i)) if i == id
      ));
    }
    assert_eq!(bitmap.to_rgba_image().unwrap(), image);

    let mut rgb565 = MemoryBitmap::new(2, 2, BitmapFormat::Rgb565);
    assert!(matches!(
      session.style_transfer(&mut rgb565, 0, false),
      Err(StyleError::UnsupportedFormat(BitmapFormat::Rgb565))
    ));
  }

  #[test]
  fn test_style_init_fails_on_missing_asset() {
    let dir = tempfile::tempdir().unwrap();
    write_styles(dir.path());
    std::fs::remove_file(dir.path().join("udnie.cmat")).unwrap();

    let mut session = StyleSession::new();
    assert!(matches!(
      session.init(&DirectoryAssets::new(dir.path())),
      Err(StyleError::Model(_))
    ));
    assert!(session.styles().is_none());
  }

  #[test]
  fn test_detector_model_loading() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(DEFAULT_MODEL_PARAM), b"7767517\n").unwrap();
    std::fs::write(dir.path().join(DEFAULT_MODEL_BIN), b"").unwrap();
    let assets = DirectoryAssets::new(dir.path());

    let mut session: DetectorSession<MemoryWindow, _> =
      DetectorSession::new(CountingCamera::default(), quiet());
    // 空的权重文件视为加载失败
    assert!(matches!(
      session.load_model(&assets),
      Err(SessionError::Asset(AssetError::Empty(_)))
    ));
    assert!(session.model().is_none());

    std::fs::write(dir.path().join(DEFAULT_MODEL_BIN), [1u8, 2, 3]).unwrap();
    session.load_model(&assets).unwrap();
    let model = session.model().unwrap();
    assert_eq!(model.param, b"7767517\n");
    assert_eq!(model.bin, [1, 2, 3]);
  }
}
