//! 编码器距离换算
//!
//! 每脉冲距离由轮周长和每圈计数决定：
//!
//! ```text
//! distance_per_pulse = π × wheel_diameter / counts_per_revolution
//! distance           = count × distance_per_pulse
//! ```
//!
//! `distance_per_pulse` 在构造时确定，之后不再重新计算。

use std::f64::consts::PI;

use romi_hal::QuadratureEncoder;

use crate::error::DriveError;

/// 底盘几何常量（默认值为 Romi 出厂参数，单位：英寸）
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrivetrainConstants {
    pub counts_per_revolution: f64,
    pub wheel_diameter_inch: f64,
    pub track_width_inch: f64,
}

impl Default for DrivetrainConstants {
    fn default() -> Self {
        Self {
            counts_per_revolution: 1440.0,
            wheel_diameter_inch: 2.75591,
            track_width_inch: 5.551,
        }
    }
}

impl DrivetrainConstants {
    pub fn validate(&self) -> Result<(), DriveError> {
        for (name, value) in [
            ("counts_per_revolution", self.counts_per_revolution),
            ("wheel_diameter_inch", self.wheel_diameter_inch),
            ("track_width_inch", self.track_width_inch),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(DriveError::InvalidConfig(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// 每脉冲距离（英寸/计数）
    pub fn distance_per_pulse(&self) -> f64 {
        distance_per_pulse(self.wheel_diameter_inch, self.counts_per_revolution)
    }
}

/// 每脉冲距离
#[inline]
pub fn distance_per_pulse(wheel_diameter: f64, counts_per_revolution: f64) -> f64 {
    (PI * wheel_diameter) / counts_per_revolution
}

/// 带距离换算的编码器
pub struct Encoder {
    source: Box<dyn QuadratureEncoder>,
    distance_per_pulse: f64,
}

impl std::fmt::Debug for Encoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encoder")
            .field("count", &self.get())
            .field("distance_per_pulse", &self.distance_per_pulse)
            .finish()
    }
}

impl Encoder {
    pub fn new(source: Box<dyn QuadratureEncoder>, distance_per_pulse: f64) -> Self {
        Self {
            source,
            distance_per_pulse,
        }
    }

    /// 当前计数
    pub fn get(&self) -> i32 {
        self.source.raw_count()
    }

    /// 当前距离（计数 × 每脉冲距离）
    pub fn get_distance(&self) -> f64 {
        f64::from(self.get()) * self.distance_per_pulse
    }

    pub fn distance_per_pulse(&self) -> f64 {
        self.distance_per_pulse
    }

    /// 计数与距离清零
    pub fn reset(&mut self) {
        self.source.reset();
    }
}
