// 该文件是 Shijing （视镜） 项目的一部分。
// src/platform.rs - 宿主平台接口
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

//! # 宿主平台接口
//!
//! 渲染与转换逻辑只依赖这里定义的两类资源：
//! - [`NativeWindow`]：显示表面，克隆即获取引用，析构即释放引用；
//! - [`Bitmap`]：宿主管理的位图，像素内存只能在作用域锁内访问。
//!
//! [`memory`] 模块提供纯内存实现，供命令行程序与测试使用。

mod bitmap;
pub mod memory;
mod window;

pub use bitmap::{Bitmap, BitmapFormat, BitmapInfo};
pub use window::{BufferFormat, NativeWindow, WindowBuffer};

/// 平台调用返回的错误类型
pub type PlatformError = Box<dyn std::error::Error + Send + Sync + 'static>;
