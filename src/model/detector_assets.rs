// 该文件是 Shijing （视镜） 项目的一部分。
// src/model/detector_assets.rs - 检测模型资源
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

use tracing::{debug, info};

use crate::assets::{AssetError, AssetSource};

pub const DEFAULT_MODEL_PARAM: &str = "nanodet-m.param";
pub const DEFAULT_MODEL_BIN: &str = "nanodet-m.bin";

/// 检测网络的结构与权重文件内容，交给推理引擎使用
#[derive(Debug, Clone)]
pub struct ModelAssets {
  pub param: Vec<u8>,
  pub bin: Vec<u8>,
}

impl ModelAssets {
  pub fn load<A: AssetSource + ?Sized>(
    assets: &A,
    param_name: &str,
    bin_name: &str,
  ) -> Result<Self, AssetError> {
    info!("加载模型文件: {} / {}", param_name, bin_name);
    let param = assets.read_non_empty(param_name)?;
    let bin = assets.read_non_empty(bin_name)?;
    debug!(
      "模型文件大小: {:.2} KB / {:.2} MB",
      param.len() as f64 / 1024.0,
      bin.len() as f64 / (1024.0 * 1024.0)
    );
    Ok(Self { param, bin })
  }
}
