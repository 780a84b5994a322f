// 该文件是 Shijing （视镜） 项目的一部分。
// src/render/fps.rs - 帧率滑动平均
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

use std::time::Instant;

pub const FPS_HISTORY_LEN: usize = 10;

/// 最近 [`FPS_HISTORY_LEN`] 个瞬时帧率的环形缓冲
#[derive(Debug, Clone, Default)]
pub struct FpsMeter {
  last: Option<Instant>,
  history: [f32; FPS_HISTORY_LEN],
  cursor: usize,
  filled: usize,
}

impl FpsMeter {
  pub fn new() -> Self {
    Self::default()
  }

  /// 记录一帧到达的时间，样本攒满后返回平均帧率
  ///
  /// 第一帧只记录时间戳；与上一帧间隔为 0 的帧不计入样本。
  pub fn tick(&mut self, now: Instant) -> Option<f32> {
    let Some(last) = self.last else {
      self.last = Some(now);
      return None;
    };

    let elapsed_ms = now.saturating_duration_since(last).as_secs_f64() * 1000.0;
    if elapsed_ms > 0.0 {
      self.last = Some(now);
      self.push((1000.0 / elapsed_ms) as f32);
    }

    self.average()
  }

  fn push(&mut self, fps: f32) {
    self.history[self.cursor] = fps;
    self.cursor = (self.cursor + 1) % FPS_HISTORY_LEN;
    self.filled = (self.filled + 1).min(FPS_HISTORY_LEN);
  }

  pub fn average(&self) -> Option<f32> {
    if self.filled < FPS_HISTORY_LEN {
      return None;
    }
    Some(self.history.iter().sum::<f32>() / FPS_HISTORY_LEN as f32)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[test]
  fn silent_until_ten_samples() {
    let start = Instant::now();
    let mut meter = FpsMeter::new();
    // 第一帧没有上一帧时间戳，之后第 2..=10 帧只攒样本
    for i in 0..10 {
      let now = start + Duration::from_millis(50 * i);
      assert_eq!(meter.tick(now), None, "第 {} 帧不应有读数", i + 1);
    }
    let avg = meter.tick(start + Duration::from_millis(500)).unwrap();
    assert!((avg - 20.0).abs() < 1e-3, "平均帧率 {}", avg);
  }

  #[test]
  fn average_tracks_last_ten_intervals() {
    let mut now = Instant::now();
    let mut meter = FpsMeter::new();
    meter.tick(now);
    for _ in 0..10 {
      now += Duration::from_millis(100);
      meter.tick(now);
    }
    for _ in 0..5 {
      now += Duration::from_millis(50);
      meter.tick(now);
    }

    // 游标回绕后覆盖最旧的样本
    assert_eq!(meter.filled, FPS_HISTORY_LEN);
    assert_eq!(meter.cursor, 5);
    assert!((meter.history[4] - 20.0).abs() < 1e-3);
    assert!((meter.history[5] - 10.0).abs() < 1e-3);
    assert!((meter.average().unwrap() - 15.0).abs() < 1e-3);
  }

  #[test]
  fn zero_interval_is_not_sampled() {
    let now = Instant::now();
    let mut meter = FpsMeter::new();
    meter.tick(now);
    meter.tick(now);
    assert_eq!(meter.filled, 0);
  }
}
