// 该文件是 Shijing （视镜） 项目的一部分。
// src/bin/style_transfer.rs - 图片风格迁移演示
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use image::ImageReader;
use tracing::info;
use url::Url;

use shijing::{
  FromUrl,
  assets::DirectoryAssets,
  convert::{bitmap_to_matrix, matrix_to_bitmap},
  model::STYLE_NAMES,
  platform::{BitmapFormat, memory::MemoryBitmap},
  session::StyleSession,
};

/// Shijing 风格迁移参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入图片路径
  #[arg(long, value_name = "INPUT")]
  pub input: PathBuf,

  /// 输出图片路径
  #[arg(long, value_name = "OUTPUT")]
  pub output: PathBuf,

  /// 风格资源目录（assets:///path/to/dir）
  #[arg(long, value_name = "ASSETS")]
  pub assets: Url,

  /// 风格编号：0 candy, 1 mosaic, 2 pointilism, 3 rain_princess, 4 udnie
  #[arg(long, default_value_t = 0, value_name = "STYLE")]
  pub style: i32,

  /// 请求使用加速后端
  #[arg(long)]
  pub use_gpu: bool,

  /// 另存一份 RGB_565 位图的结果
  #[arg(long, value_name = "OUTPUT")]
  pub rgb565_output: Option<PathBuf>,
}

fn save_bitmap(bitmap: &MemoryBitmap, path: &Path) -> Result<()> {
  let image = bitmap
    .to_rgba_image()
    .ok_or_else(|| anyhow!("位图格式无法导出"))?;
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)?;
  }
  image
    .save(path)
    .with_context(|| format!("无法保存图片: {}", path.display()))?;
  info!("保存图像到文件: {}", path.display());
  Ok(())
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入图片: {}", args.input.display());
  info!("输出图片: {}", args.output.display());
  info!(
    "风格: {} ({})",
    args.style,
    usize::try_from(args.style)
      .ok()
      .and_then(|i| STYLE_NAMES.get(i))
      .unwrap_or(&"?")
  );

  let image = ImageReader::open(&args.input)
    .with_context(|| format!("无法打开图片文件: {}", args.input.display()))?
    .decode()
    .with_context(|| format!("无法解码图片文件: {}", args.input.display()))?
    .to_rgba8();

  let mut session = StyleSession::new();
  session.init(&DirectoryAssets::from_url(&args.assets)?)?;

  let mut bitmap = MemoryBitmap::from_rgba_image(&image);
  session.style_transfer(&mut bitmap, args.style, args.use_gpu)?;
  save_bitmap(&bitmap, &args.output)?;

  if let Some(path) = &args.rgb565_output {
    let matrix = bitmap_to_matrix(&mut bitmap)?;
    let mut preview = MemoryBitmap::new(image.width(), image.height(), BitmapFormat::Rgb565);
    matrix_to_bitmap(&matrix, &mut preview)?;
    save_bitmap(&preview, path)?;
  }

  info!("处理完成!");
  Ok(())
}
