//! 底盘驱动层
//!
//! 本模块提供 Romi 差速底盘的驱动功能，包括：
//! - Arcade 混控（死区、输入平方、去饱和、输出上限）
//! - 电机安全看门狗（输出未及时刷新时自动停机）
//! - 编码器距离换算（固定的每脉冲距离）
//!
//! # 使用场景
//!
//! 控制程序只需构造 [`DifferentialDrive`]，每个周期调用
//! [`DifferentialDrive::arcade_drive`] 即可。

mod command;
pub mod differential;
pub mod encoder;
mod error;
pub mod mixer;
pub mod safety;

pub use command::{DriveCommand, WheelSpeeds};
pub use differential::{ArcadeConfig, DifferentialDrive};
pub use encoder::{DrivetrainConstants, Encoder, distance_per_pulse};
pub use error::DriveError;
pub use mixer::{apply_deadband, arcade_drive_ik};
pub use safety::MotorSafety;
