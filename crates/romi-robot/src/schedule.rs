//! 模式来源
//!
//! 运行器每个周期向 [`ModeSource`] 询问当前模式；返回 `None` 时循环结束。

use std::time::Duration;

use crate::mode::RobotMode;

/// 模式来源（驱动站、比赛计划、测试脚本）
pub trait ModeSource {
    /// `now` 为注入时钟的当前时间
    fn mode(&mut self, now: Duration) -> Option<RobotMode>;
}

/// 固定模式，永不结束
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMode(pub RobotMode);

impl ModeSource for FixedMode {
    fn mode(&mut self, _now: Duration) -> Option<RobotMode> {
        Some(self.0)
    }
}

/// 按时长顺序执行的模式计划
///
/// 第一次查询时锁定起始时间，此后按累计时长选择阶段；全部阶段结束后返回 `None`。
///
/// ```
/// use std::time::Duration;
/// use romi_robot::{ModeSchedule, ModeSource, RobotMode};
///
/// let mut schedule = ModeSchedule::new()
///     .then(RobotMode::Disabled, Duration::from_secs(1))
///     .then(RobotMode::Autonomous, Duration::from_secs(2));
///
/// assert_eq!(schedule.mode(Duration::from_secs(10)), Some(RobotMode::Disabled));
/// assert_eq!(schedule.mode(Duration::from_millis(11_500)), Some(RobotMode::Autonomous));
/// assert_eq!(schedule.mode(Duration::from_secs(13)), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModeSchedule {
    phases: Vec<(RobotMode, Duration)>,
    started_at: Option<Duration>,
}

impl ModeSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个阶段（时长为零的阶段被忽略）
    pub fn then(mut self, mode: RobotMode, duration: Duration) -> Self {
        if !duration.is_zero() {
            self.phases.push((mode, duration));
        }
        self
    }

    pub fn phases(&self) -> &[(RobotMode, Duration)] {
        &self.phases
    }

    /// 所有阶段的总时长（溢出时饱和为 `Duration::MAX`）
    pub fn total(&self) -> Duration {
        self.phases
            .iter()
            .fold(Duration::ZERO, |total, (_, d)| total.saturating_add(*d))
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

impl ModeSource for ModeSchedule {
    fn mode(&mut self, now: Duration) -> Option<RobotMode> {
        let start = *self.started_at.get_or_insert(now);
        let elapsed = now.saturating_sub(start);

        let mut end = Duration::ZERO;
        for (mode, duration) in &self.phases {
            end = end.saturating_add(*duration);
            if elapsed < end {
                return Some(*mode);
            }
        }
        None
    }
}
