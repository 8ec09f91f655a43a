//! 定时自动程序与手动映射
//!
//! 自动程序是经过时间的纯函数，不依赖任何计时器对象：
//!
//! ```text
//! DRIVING (t < duration) ──> STOPPED (t >= duration)
//! ```
//!
//! 状态转移单向，只能通过重新进入自动模式（计时器清零）再次触发。

use romi_drive::DriveCommand;

/// 默认前进时长（秒）
pub const DEFAULT_DRIVE_SECONDS: f64 = 2.0;

/// 默认前进量（40% 功率）
pub const DEFAULT_FORWARD: f64 = -0.4;

/// 定时直行
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedDrive {
    /// 前进时长（秒）
    pub duration_s: f64,
    /// 前进阶段下发的指令
    pub command: DriveCommand,
}

impl Default for TimedDrive {
    fn default() -> Self {
        Self::new(DEFAULT_DRIVE_SECONDS, DEFAULT_FORWARD, 0.0)
    }
}

impl TimedDrive {
    pub const fn new(duration_s: f64, forward: f64, rotation: f64) -> Self {
        Self {
            duration_s,
            command: DriveCommand::new(forward, rotation),
        }
    }

    /// 经过 `elapsed_s` 秒时应下发的指令
    ///
    /// 边界 `elapsed_s == duration_s` 返回停车指令；NaN 视为已结束。
    pub fn command_at(&self, elapsed_s: f64) -> DriveCommand {
        if elapsed_s < self.duration_s {
            self.command
        } else {
            DriveCommand::STOP
        }
    }

    pub fn is_finished(&self, elapsed_s: f64) -> bool {
        !(elapsed_s < self.duration_s)
    }
}

/// 默认自动程序：前 2 秒以 40% 功率前进，之后停车
pub fn autonomous_command(elapsed_s: f64) -> DriveCommand {
    TimedDrive::default().command_at(elapsed_s)
}

/// 手柄映射：Y 轴为前进量，X 轴为旋转量
///
/// 无记忆，每个周期独立计算。
pub fn teleop_command(x: f64, y: f64) -> DriveCommand {
    DriveCommand::new(y, x)
}
