//! 差速底盘
//!
//! 持有左右两个电机控制器，负责把 [`DriveCommand`] 经过死区、混控、
//! 输出上限后写入电机，并维护电机安全看门狗。

use std::sync::Arc;
use std::time::Duration;

use romi_hal::{Clock, MotorController};
use tracing::{debug, warn};

use crate::command::{DriveCommand, WheelSpeeds};
use crate::error::DriveError;
use crate::mixer::{apply_deadband, arcade_drive_ik};
use crate::safety::{DEFAULT_EXPIRATION, MotorSafety};

/// Arcade 混控配置
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArcadeConfig {
    /// 输入死区
    ///
    /// 有效范围 [0.0, 1.0)
    pub deadband: f64,

    /// 输出上限（乘在混控结果上）
    ///
    /// 有效范围 (0.0, 1.0]
    pub max_output: f64,

    /// 是否对输入做保号平方
    pub square_inputs: bool,

    /// 看门狗超时
    pub safety_expiration: Duration,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            deadband: 0.02,
            max_output: 1.0,
            square_inputs: true,
            safety_expiration: DEFAULT_EXPIRATION,
        }
    }
}

impl ArcadeConfig {
    pub fn validate(&self) -> Result<(), DriveError> {
        if !(0.0..1.0).contains(&self.deadband) {
            return Err(DriveError::InvalidConfig(format!(
                "deadband must be in [0, 1), got {}",
                self.deadband
            )));
        }
        if !(self.max_output > 0.0 && self.max_output <= 1.0) {
            return Err(DriveError::InvalidConfig(format!(
                "max_output must be in (0, 1], got {}",
                self.max_output
            )));
        }
        if self.safety_expiration.is_zero() {
            return Err(DriveError::InvalidConfig(
                "safety_expiration must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// 差速底盘
pub struct DifferentialDrive {
    left: Box<dyn MotorController>,
    right: Box<dyn MotorController>,
    clock: Arc<dyn Clock>,
    config: ArcadeConfig,
    safety: MotorSafety,
    last_command: Option<DriveCommand>,
    last_speeds: WheelSpeeds,
}

impl std::fmt::Debug for DifferentialDrive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DifferentialDrive")
            .field("config", &self.config)
            .field("last_command", &self.last_command)
            .field("last_speeds", &self.last_speeds)
            .finish_non_exhaustive()
    }
}

impl DifferentialDrive {
    /// 创建差速底盘
    ///
    /// # 参数
    ///
    /// - `left` / `right`: 左右电机控制器（由调用方注入）
    /// - `clock`: 看门狗使用的时间基准
    /// - `config`: 混控配置
    pub fn new(
        left: Box<dyn MotorController>,
        right: Box<dyn MotorController>,
        clock: Arc<dyn Clock>,
        config: ArcadeConfig,
    ) -> Result<Self, DriveError> {
        config.validate()?;
        let safety = MotorSafety::new(config.safety_expiration);
        Ok(Self {
            left,
            right,
            clock,
            config,
            safety,
            last_command: None,
            last_speeds: WheelSpeeds::ZERO,
        })
    }

    pub fn config(&self) -> &ArcadeConfig {
        &self.config
    }

    /// Arcade 驱动
    ///
    /// 每个控制周期都应调用（连续指令，而不是边沿触发），否则看门狗会停机。
    pub fn arcade_drive(&mut self, command: DriveCommand) {
        let forward = apply_deadband(command.forward, self.config.deadband, 1.0);
        let rotation = apply_deadband(command.rotation, self.config.deadband, 1.0);

        let speeds =
            arcade_drive_ik(forward, rotation, self.config.square_inputs).scale(self.config.max_output);

        self.left.set(speeds.left);
        self.right.set(speeds.right);

        self.last_command = Some(command);
        self.last_speeds = speeds;
        self.safety.feed(self.clock.now());
    }

    /// 停止电机
    ///
    /// 同时喂狗，避免紧接着的安全检查重复报警。
    pub fn stop_motor(&mut self) {
        self.left.stop_motor();
        self.right.stop_motor();
        self.last_speeds = WheelSpeeds::ZERO;
        self.safety.feed(self.clock.now());
        debug!("DifferentialDrive stopped");
    }

    /// 看门狗检查
    ///
    /// 返回 true 表示输出已超时并被强制停止。
    pub fn check_safety(&mut self) -> bool {
        let now = self.clock.now();
        match self.safety.check(now) {
            None => false,
            Some(first_trip) => {
                if first_trip {
                    warn!(
                        "DifferentialDrive: output not updated often enough (expiration {:?}), stopping motors",
                        self.safety.expiration()
                    );
                }
                self.left.stop_motor();
                self.right.stop_motor();
                self.last_speeds = WheelSpeeds::ZERO;
                true
            },
        }
    }

    pub fn set_safety_enabled(&mut self, enabled: bool) {
        self.safety.set_enabled(enabled);
    }

    pub fn is_safety_enabled(&self) -> bool {
        self.safety.is_enabled()
    }

    /// 右电机反转（镜像安装时使用）
    pub fn set_right_inverted(&mut self, inverted: bool) {
        self.right.set_inverted(inverted);
    }

    /// 最近一次下发的驱动指令
    pub fn last_command(&self) -> Option<DriveCommand> {
        self.last_command
    }

    /// 最近一次写入电机的输出
    pub fn wheel_speeds(&self) -> WheelSpeeds {
        self.last_speeds
    }

    /// 电机当前输出（左，右）
    pub fn motor_outputs(&self) -> (f64, f64) {
        (self.left.get(), self.right.get())
    }
}
