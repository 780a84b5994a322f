// 该文件是 Shijing （视镜） 项目的一部分。
// src/session/detector.rs - 相机检测演示会话
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

use thiserror::Error;
use tracing::{debug, info};

use crate::{
  assets::{AssetError, AssetSource},
  input::{CameraFacing, CameraSource, InvalidFacing},
  model::{DEFAULT_MODEL_BIN, DEFAULT_MODEL_PARAM, ModelAssets},
  platform::{NativeWindow, PlatformError},
  render::{CameraRenderer, RenderError, RenderOutcome, RendererConfig},
};

#[derive(Error, Debug)]
pub enum SessionError {
  #[error(transparent)]
  InvalidFacing(#[from] InvalidFacing),
  #[error("相机操作失败: {0}")]
  Camera(PlatformError),
  #[error("模型加载失败: {0}")]
  Asset(#[from] AssetError),
  #[error("渲染失败: {0}")]
  Render(#[from] RenderError),
}

impl SessionError {
  fn camera<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
    SessionError::Camera(Box::new(err))
  }
}

/// 相机实时检测演示的会话状态
pub struct DetectorSession<W, C> {
  renderer: CameraRenderer<W>,
  camera: C,
  facing: Option<CameraFacing>,
  model: Option<ModelAssets>,
}

impl<W: NativeWindow, C: CameraSource> DetectorSession<W, C> {
  pub fn new(camera: C, config: RendererConfig) -> Self {
    Self {
      renderer: CameraRenderer::new(config),
      camera,
      facing: None,
      model: None,
    }
  }

  /// 以默认文件名加载检测模型
  pub fn load_model<A: AssetSource + ?Sized>(&mut self, assets: &A) -> Result<(), SessionError> {
    self.load_model_with(assets, DEFAULT_MODEL_PARAM, DEFAULT_MODEL_BIN)
  }

  pub fn load_model_with<A: AssetSource + ?Sized>(
    &mut self,
    assets: &A,
    param_name: &str,
    bin_name: &str,
  ) -> Result<(), SessionError> {
    self.model = Some(ModelAssets::load(assets, param_name, bin_name)?);
    info!("模型加载完成");
    Ok(())
  }

  pub fn model(&self) -> Option<&ModelAssets> {
    self.model.as_ref()
  }

  /// 打开相机，`facing` 只接受 0（前置）或 1（后置）
  pub fn open_camera(&mut self, facing: i32) -> Result<(), SessionError> {
    let facing = CameraFacing::try_from(facing)?;
    debug!("openCamera {}", facing);

    if self.facing.is_some() {
      self.close_camera()?;
    }
    self.camera.open(facing).map_err(SessionError::camera)?;
    self.facing = Some(facing);
    Ok(())
  }

  pub fn close_camera(&mut self) -> Result<(), SessionError> {
    debug!("closeCamera");
    self.camera.close().map_err(SessionError::camera)?;
    self.facing = None;
    Ok(())
  }

  pub fn facing(&self) -> Option<CameraFacing> {
    self.facing
  }

  pub fn set_output_window(&mut self, window: W) {
    debug!("setOutputWindow {}x{}", window.width(), window.height());
    self.renderer.set_window(window);
  }

  pub fn renderer(&self) -> &CameraRenderer<W> {
    &self.renderer
  }

  /// 取一帧并渲染到输出窗口，相机没有帧时返回 `None`
  pub fn process_frame(&mut self) -> Result<Option<RenderOutcome>, SessionError> {
    let Some(frame) = self.camera.capture().map_err(SessionError::camera)? else {
      return Ok(None);
    };
    Ok(Some(self.renderer.on_image(&frame)?))
  }
}
