// 该文件是 Shijing （视镜） 项目的一部分。
// src/assets.rs - 模型资源读取
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

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme};

#[derive(Error, Debug)]
pub enum AssetError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("资源名称无效: {0}")]
  InvalidName(String),
  #[error("资源不存在: {0}")]
  NotFound(String),
  #[error("资源为空: {0}")]
  Empty(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 按名称读取资源，对应宿主的资源管理器
pub trait AssetSource {
  fn read(&self, name: &str) -> Result<Vec<u8>, AssetError>;

  /// 读取资源并拒绝空内容
  fn read_non_empty(&self, name: &str) -> Result<Vec<u8>, AssetError> {
    let data = self.read(name)?;
    if data.is_empty() {
      return Err(AssetError::Empty(name.to_string()));
    }
    Ok(data)
  }
}

/// 以目录为根的资源
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
  root: PathBuf,
}

impl FromUrlWithScheme for DirectoryAssets {
  const SCHEME: &'static str = "assets";
}

impl FromUrl for DirectoryAssets {
  type Error = AssetError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(AssetError::SchemeMismatch(format!(
        "期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      )));
    }
    Ok(Self::new(url.path()))
  }
}

impl DirectoryAssets {
  pub fn new(root: impl AsRef<Path>) -> Self {
    Self {
      root: root.as_ref().to_path_buf(),
    }
  }
}

impl AssetSource for DirectoryAssets {
  fn read(&self, name: &str) -> Result<Vec<u8>, AssetError> {
    // 只允许根目录之下的相对路径
    let relative = Path::new(name);
    if name.is_empty()
      || relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
      return Err(AssetError::InvalidName(name.to_string()));
    }

    let path = self.root.join(relative);
    debug!("读取资源: {}", path.display());
    match std::fs::read(&path) {
      Ok(data) => Ok(data),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        Err(AssetError::NotFound(name.to_string()))
      }
      Err(e) => Err(AssetError::IoError(e)),
    }
  }
}
