// 该文件是 Shijing （视镜） 项目的一部分。
// src/task.rs - 预览任务循环
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

use std::{
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  thread,
  time::{Duration, Instant},
};

use tracing::{info, warn};

use crate::{
  input::CameraSource,
  platform::NativeWindow,
  render::RenderOutcome,
  session::DetectorSession,
};

pub trait Task<S>: Sized {
  type Error;
  fn run_task(self, session: &mut S) -> Result<(), Self::Error>;
}

/// 每帧渲染后的回调，参数为帧序号（从 1 开始）与渲染结果
pub type FrameHook<'a> = Box<dyn FnMut(usize, &RenderOutcome) -> anyhow::Result<()> + 'a>;

/// 持续拉取相机帧并渲染，直到达到帧数、相机没有帧或收到中断信号
#[derive(Default)]
pub struct ContinuousTask<'a> {
  frame_number: Option<usize>,
  frame_interval: Option<Duration>,
  stop: Option<Arc<AtomicBool>>,
  on_frame: Option<FrameHook<'a>>,
}

impl<'a> ContinuousTask<'a> {
  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }

  /// 两帧之间的最短间隔，模拟相机的采集节奏
  pub fn with_frame_interval(mut self, frame_interval: Option<Duration>) -> Self {
    self.frame_interval = frame_interval;
    self
  }

  /// 使用外部停止标志，而不是安装 Ctrl-C 处理器
  pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
    self.stop = Some(stop);
    self
  }

  pub fn on_frame(
    mut self,
    hook: impl FnMut(usize, &RenderOutcome) -> anyhow::Result<()> + 'a,
  ) -> Self {
    self.on_frame = Some(Box::new(hook));
    self
  }
}

impl<W: NativeWindow, C: CameraSource> Task<DetectorSession<W, C>> for ContinuousTask<'_> {
  type Error = anyhow::Error;

  fn run_task(mut self, session: &mut DetectorSession<W, C>) -> Result<(), Self::Error> {
    info!("开始任务...");

    let stop = match self.stop.take() {
      Some(stop) => stop,
      None => {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        ctrlc::set_handler(move || {
          info!("收到中断信号，准备退出...");
          flag.store(true, Ordering::SeqCst);
        })?;
        stop
      }
    };

    let mut frame_index = 0;
    loop {
      let now = Instant::now();
      let Some(outcome) = session.process_frame()? else {
        info!("相机没有更多帧, 退出任务循环");
        break;
      };
      frame_index += 1;
      info!("第 {} 帧渲染完成，耗时: {:.2?}", frame_index, now.elapsed());

      if let Some(hook) = self.on_frame.as_mut() {
        hook(frame_index, &outcome)?;
      }

      if self.frame_number.map(|n| frame_index >= n).unwrap_or(false) {
        info!("达到指定帧数 {}, 退出任务循环", frame_index);
        break;
      }
      if stop.load(Ordering::SeqCst) {
        warn!("中断信号接收，退出任务循环");
        break;
      }

      if let Some(interval) = self.frame_interval
        && let Some(rest) = interval.checked_sub(now.elapsed())
      {
        thread::sleep(rest);
      }
    }

    info!("任务完成，退出");
    Ok(())
  }
}
