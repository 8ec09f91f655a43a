//! # Romi HAL
//!
//! Romi 机器人硬件抽象层，提供统一的执行器/传感器接口抽象。
//!
//! 控制程序只依赖本模块中的 trait，具体实现由 [`HardwareProvider`] 注入：
//! - [`sim::SimRomi`]：纯软件仿真后端（测试与离线运行）
//! - 真实硬件后端（通过 HAL 仿真 WebSocket 传输连接），不在本仓库实现
//!
//! # 通道约定
//!
//! | 设备 | 通道 |
//! |------|------|
//! | 左电机 | PWM 0 |
//! | 右电机 | PWM 1 |
//! | 左编码器 | DIO 4/5 |
//! | 右编码器 | DIO 6/7 |
//! | 手柄 | Joystick 端口 1 |

use std::sync::Arc;
use thiserror::Error;

pub mod clock;
pub mod endpoint;
pub mod sim;

pub use clock::{Clock, ManualClock, SystemClock};
pub use endpoint::SimEndpoint;
pub use sim::{SimConfig, SimRomi, Wheel};

/// PWM 通道数量
pub const NUM_PWM_CHANNELS: u8 = 10;

/// DIO 通道数量
pub const NUM_DIO_CHANNELS: u8 = 10;

/// 手柄端口数量
pub const NUM_JOYSTICK_PORTS: u8 = 6;

/// HAL 层统一错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HalError {
    #[error("Invalid {kind} channel: {channel} (valid range 0..{limit})")]
    InvalidChannel {
        kind: ChannelKind,
        channel: u8,
        limit: u8,
    },
    #[error("{kind} channel {channel} already in use")]
    ChannelInUse { kind: ChannelKind, channel: u8 },
    #[error("Invalid joystick port: {0} (valid range 0..{NUM_JOYSTICK_PORTS})")]
    InvalidJoystickPort(u8),
    #[error("No onboard encoder on DIO pair ({0}, {1})")]
    EncoderChannelMismatch(u8, u8),
    #[error("Invalid sim endpoint: {0}")]
    InvalidEndpoint(String),
}

/// 通道类型（用于错误信息）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Pwm,
    Dio,
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelKind::Pwm => write!(f, "PWM"),
            ChannelKind::Dio => write!(f, "DIO"),
        }
    }
}

/// 电机控制器
///
/// 输出范围 [-1.0, 1.0]，超出范围的值会被钳位。
pub trait MotorController: Send {
    /// 设置输出（钳位到 [-1.0, 1.0]）
    fn set(&mut self, speed: f64);

    /// 读取最近一次设置的输出（反转前）
    fn get(&self) -> f64;

    /// 设置是否反转输出方向
    fn set_inverted(&mut self, inverted: bool);

    fn is_inverted(&self) -> bool;

    /// 停止电机
    fn stop_motor(&mut self) {
        self.set(0.0);
    }
}

/// 正交编码器（原始计数）
pub trait QuadratureEncoder: Send {
    /// 当前计数（反转时为负）
    fn raw_count(&self) -> i32;

    /// 将计数清零
    fn reset(&mut self);
}

/// 三轴陀螺仪（累计角度，单位：度）
pub trait Gyro: Send {
    fn angle_x(&self) -> f64;
    fn angle_y(&self) -> f64;
    fn angle_z(&self) -> f64;
    fn reset(&mut self);
}

/// 三轴加速度计（单位：g）
pub trait Accelerometer: Send {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
    fn z(&self) -> f64;
}

/// 双轴手柄输入，范围 [-1.0, 1.0]
pub trait Joystick: Send {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
}

/// 硬件提供者
///
/// 控制程序通过此 trait 获取硬件句柄（依赖注入），而不是访问全局单例。
pub trait HardwareProvider {
    fn motor(&self, channel: u8) -> Result<Box<dyn MotorController>, HalError>;

    fn encoder(
        &self,
        channel_a: u8,
        channel_b: u8,
    ) -> Result<Box<dyn QuadratureEncoder>, HalError>;

    fn gyro(&self) -> Result<Box<dyn Gyro>, HalError>;

    fn accelerometer(&self) -> Result<Box<dyn Accelerometer>, HalError>;

    fn joystick(&self, port: u8) -> Result<Box<dyn Joystick>, HalError>;

    /// 硬件时间基准
    fn clock(&self) -> Arc<dyn Clock>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hal_error_display() {
        let err = HalError::InvalidChannel {
            kind: ChannelKind::Pwm,
            channel: 12,
            limit: NUM_PWM_CHANNELS,
        };
        assert_eq!(err.to_string(), "Invalid PWM channel: 12 (valid range 0..10)");

        let err = HalError::ChannelInUse {
            kind: ChannelKind::Dio,
            channel: 4,
        };
        assert_eq!(err.to_string(), "DIO channel 4 already in use");

        let err = HalError::EncoderChannelMismatch(1, 2);
        assert!(err.to_string().contains("(1, 2)"));

        let err = HalError::InvalidJoystickPort(7);
        assert!(err.to_string().contains("7"));
    }
}
