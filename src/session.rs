// 该文件是 Shijing （视镜） 项目的一部分。
// src/session.rs - 宿主入口会话
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

//! 两个演示各自的会话对象。宿主的每个入口调用对应会话上的一个方法，
//! 返回 `Result`，宿主所需的布尔值即 `is_ok()`。

mod detector;
mod style;

pub use self::detector::{DetectorSession, SessionError};
pub use self::style::{StyleError, StyleSession};
