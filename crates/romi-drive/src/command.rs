use std::fmt;

/// 驱动指令（前进量 + 旋转量）
///
/// 两个分量的有效范围均为 [-1.0, 1.0]，旋转量逆时针为正。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriveCommand {
    pub forward: f64,
    pub rotation: f64,
}

impl DriveCommand {
    /// 停车指令
    pub const STOP: Self = Self {
        forward: 0.0,
        rotation: 0.0,
    };

    pub const fn new(forward: f64, rotation: f64) -> Self {
        Self { forward, rotation }
    }

    pub fn is_stop(&self) -> bool {
        self.forward == 0.0 && self.rotation == 0.0
    }
}

impl fmt::Display for DriveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "forward={:.3} rotation={:.3}", self.forward, self.rotation)
    }
}

/// 左右轮输出
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WheelSpeeds {
    pub left: f64,
    pub right: f64,
}

impl WheelSpeeds {
    pub const ZERO: Self = Self {
        left: 0.0,
        right: 0.0,
    };

    pub const fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// 等比缩放
    pub fn scale(self, factor: f64) -> Self {
        Self {
            left: self.left * factor,
            right: self.right * factor,
        }
    }
}
