//! 控制程序错误类型定义

use romi_drive::DriveError;
use romi_hal::HalError;
use thiserror::Error;

use crate::config::ConfigError;

/// 控制程序错误类型
#[derive(Error, Debug)]
pub enum RobotError {
    /// 硬件层错误（通道无效/被占用等）
    #[error("HAL error: {0}")]
    Hal(#[from] HalError),

    /// 驱动层错误
    #[error("Drive error: {0}")]
    Drive(#[from] DriveError),

    /// 配置错误
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// 控制循环参数无效
    #[error("Invalid loop config: {0}")]
    InvalidLoopConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_robot_error_display() {
        let err: RobotError = HalError::InvalidJoystickPort(8).into();
        assert!(err.to_string().starts_with("HAL error:"));

        let err: RobotError = DriveError::InvalidConfig("bad".to_string()).into();
        assert_eq!(err.to_string(), "Drive error: Invalid drive config: bad");

        let err: RobotError = ConfigError::Invalid("period_ms must be > 0".to_string()).into();
        assert!(err.to_string().contains("period_ms"));

        let err = RobotError::InvalidLoopConfig("period is zero".to_string());
        assert_eq!(err.to_string(), "Invalid loop config: period is zero");
    }
}
