//! 输入验证模块
//!
//! 命令行数值参数的范围检查

use anyhow::Result;
use std::time::Duration;

/// 手柄轴取值（[-1.0, 1.0]）
pub fn validate_axis(name: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        anyhow::bail!(
            "{} 无效: {}",
            name,
            if value.is_nan() { "NaN" } else { "无穷大" }
        );
    }
    if !(-1.0..=1.0).contains(&value) {
        anyhow::bail!("{} {:.3} 超出范围 [-1.0, 1.0]", name, value);
    }
    Ok(value)
}

/// 单个阶段时长上限（秒，一天）
pub const MAX_PHASE_SECONDS: f64 = 86_400.0;

/// 阶段时长（秒，[0, MAX_PHASE_SECONDS]）
pub fn validate_seconds(name: &str, seconds: f64) -> Result<Duration> {
    if !seconds.is_finite() || seconds < 0.0 {
        anyhow::bail!("{} 时长无效: {}（必须为非负有限值）", name, seconds);
    }
    if seconds > MAX_PHASE_SECONDS {
        anyhow::bail!("{} 时长 {} 秒超过上限 {} 秒", name, seconds, MAX_PHASE_SECONDS);
    }
    match Duration::try_from_secs_f64(seconds) {
        Ok(duration) => Ok(duration),
        Err(e) => anyhow::bail!("{} 时长无效: {}（{}）", name, seconds, e),
    }
}
