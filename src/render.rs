// 该文件是 Shijing （视镜） 项目的一部分。
// src/render.rs - 相机预览渲染
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

mod blit;
mod crop;
mod fps;
mod overlay;
mod renderer;

pub use blit::expand_rgb_to_rgba;
pub use crop::{CropRect, crop_to_aspect};
pub use fps::{FPS_HISTORY_LEN, FpsMeter};
pub use overlay::{FpsOverlay, LabelBox, default_font};
pub use renderer::{CameraRenderer, RenderError, RenderOutcome, RendererConfig};
