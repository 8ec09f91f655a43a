//! 驱动层错误类型定义

use romi_hal::HalError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriveError {
    /// 硬件层错误
    #[error("HAL error: {0}")]
    Hal(#[from] HalError),

    /// 配置参数无效
    #[error("Invalid drive config: {0}")]
    InvalidConfig(String),
}
