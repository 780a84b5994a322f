// 该文件是 Shijing （视镜） 项目的一部分。
// src/bin/camera_preview.rs - 相机预览演示
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::{Path, PathBuf};
use std::time::Duration;

use ab_glyph::FontArc;
use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::Parser;
use tracing::{info, warn};
use url::Url;

use shijing::{
  FromUrl,
  assets::DirectoryAssets,
  input::CameraWrapper,
  platform::memory::MemoryWindow,
  render::{RenderOutcome, RendererConfig},
  session::DetectorSession,
  task::{ContinuousTask, Task},
};

/// Shijing 相机预览参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 相机来源（image:///path/to/image.png 或 v4l:///dev/video0?front=/dev/video1）
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 相机朝向，0 为前置，1 为后置
  #[arg(long, default_value_t = 1, value_name = "FACING")]
  pub facing: i32,

  /// 输出窗口宽度
  #[arg(long, default_value_t = 1080, value_name = "WIDTH")]
  pub window_width: u32,

  /// 输出窗口高度
  #[arg(long, default_value_t = 1920, value_name = "HEIGHT")]
  pub window_height: u32,

  /// 帧率标签字体文件（TTF/OTF），缺省时使用内置字体
  #[arg(long, value_name = "FONT")]
  pub font: Option<PathBuf>,

  /// 帧率标签字号
  #[arg(long, default_value_t = 16.0, value_name = "SIZE")]
  pub font_size: f32,

  /// 不绘制帧率标签
  #[arg(long)]
  pub no_fps: bool,

  /// 模型资源目录（assets:///path/to/dir）
  #[arg(long, value_name = "ASSETS")]
  pub assets: Option<Url>,

  /// 快照输出目录，按日期分子目录保存
  #[arg(long, value_name = "OUTPUT")]
  pub output: Option<PathBuf>,

  /// 每隔多少帧保存一次快照
  #[arg(long, default_value_t = 30, value_name = "FRAMES")]
  pub snapshot_every: usize,

  /// 两帧之间的最短间隔（毫秒）
  #[arg(long, default_value_t = 33, value_name = "MILLIS")]
  pub interval_ms: u64,

  /// 最大处理帧数
  #[arg(long, value_name = "FRAME_NUMBER")]
  pub frame_number: Option<usize>,
}

fn load_font(path: &Path) -> Result<FontArc> {
  let data =
    std::fs::read(path).with_context(|| format!("无法读取字体文件: {}", path.display()))?;
  FontArc::try_from_vec(data)
    .with_context(|| format!("无法解析字体文件: {}", path.display()))
}

fn snapshot_path(directory: &Path, frame_index: usize) -> Result<PathBuf> {
  let now = Local::now();
  let directory = directory
    .join(now.year().to_string())
    .join(format!("{:02}", now.month()))
    .join(format!("{:02}", now.day()));
  std::fs::create_dir_all(&directory)
    .with_context(|| format!("无法创建快照目录: {}", directory.display()))?;

  Ok(directory.join(format!(
    "{}-{:06}.png",
    now.format("%H-%M-%S"),
    frame_index
  )))
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("相机来源: {}", args.input);
  info!("相机朝向: {}", args.facing);
  info!("输出窗口: {}x{}", args.window_width, args.window_height);

  let font = args.font.as_deref().map(load_font).transpose()?;
  let config = RendererConfig {
    font,
    font_size: args.font_size,
    show_fps: !args.no_fps,
  };

  let camera = CameraWrapper::from_url(&args.input)?;
  let mut session = DetectorSession::new(camera, config);

  if let Some(assets) = &args.assets {
    session.load_model(&DirectoryAssets::from_url(assets)?)?;
  } else {
    warn!("未指定模型资源目录, 仅做预览渲染");
  }

  let window = MemoryWindow::new(args.window_width, args.window_height);
  session.set_output_window(window.clone());
  session.open_camera(args.facing)?;

  let snapshot_every = args.snapshot_every.max(1);
  let output = args.output.clone();
  let mut dropped = 0usize;

  ContinuousTask::default()
    .with_frame_number(args.frame_number)
    .with_frame_interval(Some(Duration::from_millis(args.interval_ms)))
    .on_frame(|index, outcome| {
      if let RenderOutcome::Dropped(_) = outcome {
        dropped += 1;
        return Ok(());
      }
      if let Some(directory) = &output
        && index % snapshot_every == 0
        && let Some(image) = window.snapshot()?
      {
        let path = snapshot_path(directory, index)?;
        image.save(&path)?;
        info!("保存快照到文件: {}", path.display());
      }
      Ok(())
    })
    .run_task(&mut session)?;

  session.close_camera()?;

  info!("处理完成!");
  info!("提交帧数: {}", window.posted_frames()?);
  info!("丢弃帧数: {}", dropped);

  Ok(())
}
