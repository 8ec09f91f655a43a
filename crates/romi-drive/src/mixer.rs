//! Arcade 混控（纯函数）
//!
//! 将 (前进, 旋转) 指令转换为左右轮输出：
//!
//! ```text
//! left  = forward - rotation
//! right = forward + rotation
//! ```
//!
//! 然后按 `(max + min) / max` 去饱和，保证输出落在 [-1.0, 1.0] 内，
//! 并且保持前进/旋转的比例不变。

use crate::command::WheelSpeeds;

/// 死区处理
///
/// - `|value| <= deadband` 时返回 0
/// - 否则将 `(deadband, max_magnitude]` 线性映射到 `(0, max_magnitude]`，
///   输出连续且在 `±max_magnitude` 处取到端点
pub fn apply_deadband(value: f64, deadband: f64, max_magnitude: f64) -> f64 {
    if value.abs() <= deadband {
        return 0.0;
    }

    // 死区极小时直接平移，避免除法放大误差
    if deadband <= 0.0 || max_magnitude / deadband > 1.0e12 {
        return if value > 0.0 {
            value - deadband.max(0.0)
        } else {
            value + deadband.max(0.0)
        };
    }

    if value > 0.0 {
        max_magnitude * (value - deadband) / (max_magnitude - deadband)
    } else {
        max_magnitude * (value + deadband) / (max_magnitude - deadband)
    }
}

/// Arcade 逆运动学
///
/// # 参数
///
/// - `forward`: 前进量，钳位到 [-1.0, 1.0]
/// - `rotation`: 旋转量（逆时针为正），钳位到 [-1.0, 1.0]
/// - `square_inputs`: 是否对输入做保号平方（低速更细腻）
pub fn arcade_drive_ik(forward: f64, rotation: f64, square_inputs: bool) -> WheelSpeeds {
    let mut forward = sanitize(forward);
    let mut rotation = sanitize(rotation);

    if square_inputs {
        forward = square_preserving_sign(forward);
        rotation = square_preserving_sign(rotation);
    }

    let left = forward - rotation;
    let right = forward + rotation;

    let greater = forward.abs().max(rotation.abs());
    let lesser = forward.abs().min(rotation.abs());
    if greater == 0.0 {
        return WheelSpeeds::ZERO;
    }

    let saturated = (greater + lesser) / greater;
    WheelSpeeds::new(left / saturated, right / saturated)
}

fn sanitize(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) }
}

fn square_preserving_sign(value: f64) -> f64 {
    (value * value).copysign(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_deadband_zeroes_small_inputs() {
        assert_eq!(apply_deadband(0.01, 0.02, 1.0), 0.0);
        assert_eq!(apply_deadband(-0.02, 0.02, 1.0), 0.0);
        assert_eq!(apply_deadband(0.0, 0.02, 1.0), 0.0);
    }

    #[test]
    fn test_deadband_rescales() {
        assert!((apply_deadband(1.0, 0.02, 1.0) - 1.0).abs() < EPS);
        assert!((apply_deadband(-1.0, 0.02, 1.0) + 1.0).abs() < EPS);
        assert!((apply_deadband(0.51, 0.02, 1.0) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_zero_deadband_passthrough() {
        assert_eq!(apply_deadband(0.3, 0.0, 1.0), 0.3);
        assert_eq!(apply_deadband(-0.3, 0.0, 1.0), -0.3);
    }

    #[test]
    fn test_straight_forward() {
        let speeds = arcade_drive_ik(0.5, 0.0, false);
        assert_eq!(speeds, WheelSpeeds::new(0.5, 0.5));

        let speeds = arcade_drive_ik(-0.4, 0.0, false);
        assert_eq!(speeds, WheelSpeeds::new(-0.4, -0.4));
    }

    #[test]
    fn test_squared_inputs_preserve_sign() {
        let speeds = arcade_drive_ik(-0.4, 0.0, true);
        assert!((speeds.left + 0.16).abs() < EPS);
        assert!((speeds.right + 0.16).abs() < EPS);
    }

    #[test]
    fn test_pure_rotation() {
        let speeds = arcade_drive_ik(0.0, 0.5, false);
        assert_eq!(speeds, WheelSpeeds::new(-0.5, 0.5));
    }

    #[test]
    fn test_desaturation() {
        // 全速前进 + 全速旋转：一侧满输出，另一侧停止
        let speeds = arcade_drive_ik(1.0, 1.0, false);
        assert!((speeds.left - 0.0).abs() < EPS);
        assert!((speeds.right - 1.0).abs() < EPS);

        let speeds = arcade_drive_ik(0.5, 0.5, false);
        assert!((speeds.left - 0.0).abs() < EPS);
        assert!((speeds.right - 0.5).abs() < EPS);
    }

    #[test]
    fn test_zero_and_nan() {
        assert_eq!(arcade_drive_ik(0.0, 0.0, true), WheelSpeeds::ZERO);
        assert_eq!(arcade_drive_ik(f64::NAN, f64::NAN, false), WheelSpeeds::ZERO);
    }

    #[test]
    fn test_inputs_clamped() {
        let speeds = arcade_drive_ik(3.0, 0.0, false);
        assert_eq!(speeds, WheelSpeeds::new(1.0, 1.0));
    }
}
