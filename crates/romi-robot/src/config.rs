//! # 机器人配置
//!
//! TOML 格式的控制程序配置，所有字段都有默认值（Romi 出厂参数）：
//!
//! ```toml
//! [timing]
//! period_ms = 20
//!
//! [drivetrain]
//! counts_per_revolution = 1440.0
//! wheel_diameter_inch = 2.75591
//! track_width_inch = 5.551
//! deadband = 0.02
//! max_output = 1.0
//! square_inputs = true
//! safety_expiration_ms = 100
//! invert_right_motor = false
//!
//! [channels]
//! left_motor = 0
//! right_motor = 1
//! left_encoder = [4, 5]
//! right_encoder = [6, 7]
//! joystick = 1
//!
//! [autonomous]
//! drive_seconds = 2.0
//! forward = -0.4
//! rotation = 0.0
//!
//! [sim]
//! host = "10.0.0.2"
//! port = 3300
//! max_wheel_speed_inch_per_s = 30.0
//! right_motor_mirrored = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use romi_drive::{ArcadeConfig, DrivetrainConstants};
use romi_hal::{SimConfig, SimEndpoint};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::autonomous::TimedDrive;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 控制程序配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub timing: TimingConfig,
    pub drivetrain: DrivetrainConfig,
    pub channels: ChannelConfig,
    pub autonomous: AutonomousConfig,
    pub sim: SimSection,
}

/// 控制周期上限（毫秒）
pub const MAX_PERIOD_MS: u64 = 1000;

/// 控制周期
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// 控制周期（毫秒）
    pub period_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { period_ms: 20 }
    }
}

impl TimingConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

/// 底盘参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivetrainConfig {
    pub counts_per_revolution: f64,
    pub wheel_diameter_inch: f64,
    pub track_width_inch: f64,
    pub deadband: f64,
    pub max_output: f64,
    pub square_inputs: bool,
    pub safety_expiration_ms: u64,
    /// 右电机镜像安装时设为 true
    pub invert_right_motor: bool,
}

impl Default for DrivetrainConfig {
    fn default() -> Self {
        let constants = DrivetrainConstants::default();
        let arcade = ArcadeConfig::default();
        Self {
            counts_per_revolution: constants.counts_per_revolution,
            wheel_diameter_inch: constants.wheel_diameter_inch,
            track_width_inch: constants.track_width_inch,
            deadband: arcade.deadband,
            max_output: arcade.max_output,
            square_inputs: arcade.square_inputs,
            safety_expiration_ms: arcade.safety_expiration.as_millis() as u64,
            invert_right_motor: false,
        }
    }
}

impl DrivetrainConfig {
    pub fn constants(&self) -> DrivetrainConstants {
        DrivetrainConstants {
            counts_per_revolution: self.counts_per_revolution,
            wheel_diameter_inch: self.wheel_diameter_inch,
            track_width_inch: self.track_width_inch,
        }
    }

    pub fn arcade(&self) -> ArcadeConfig {
        ArcadeConfig {
            deadband: self.deadband,
            max_output: self.max_output,
            square_inputs: self.square_inputs,
            safety_expiration: Duration::from_millis(self.safety_expiration_ms),
        }
    }
}

/// 硬件通道分配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub left_motor: u8,
    pub right_motor: u8,
    pub left_encoder: [u8; 2],
    pub right_encoder: [u8; 2],
    pub joystick: u8,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            left_motor: 0,
            right_motor: 1,
            left_encoder: [4, 5],
            right_encoder: [6, 7],
            joystick: 1,
        }
    }
}

/// 定时自动程序参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutonomousConfig {
    /// 前进持续时间（秒）
    pub drive_seconds: f64,
    pub forward: f64,
    pub rotation: f64,
}

impl Default for AutonomousConfig {
    fn default() -> Self {
        let timed = TimedDrive::default();
        Self {
            drive_seconds: timed.duration_s,
            forward: timed.command.forward,
            rotation: timed.command.rotation,
        }
    }
}

impl AutonomousConfig {
    pub fn timed_drive(&self) -> TimedDrive {
        TimedDrive::new(self.drive_seconds, self.forward, self.rotation)
    }
}

/// 仿真后端参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSection {
    /// HAL 仿真传输主机（`HALSIMWS_HOST` 优先）
    pub host: String,
    /// HAL 仿真传输端口（`HALSIMWS_PORT` 优先）
    pub port: u16,
    pub max_wheel_speed_inch_per_s: f64,
    pub right_motor_mirrored: bool,
}

impl Default for SimSection {
    fn default() -> Self {
        let endpoint = SimEndpoint::default();
        let sim = SimConfig::default();
        Self {
            host: endpoint.host,
            port: endpoint.port,
            max_wheel_speed_inch_per_s: sim.max_wheel_speed_inch_per_s,
            right_motor_mirrored: sim.right_motor_mirrored,
        }
    }
}

impl SimSection {
    /// 配置中的端点（未合并环境变量）
    pub fn endpoint(&self) -> SimEndpoint {
        SimEndpoint::new(self.host.clone(), self.port)
    }
}

impl RobotConfig {
    /// 从 TOML 文件加载并校验
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RobotConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 保存到文件
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_PERIOD_MS).contains(&self.timing.period_ms) {
            return Err(ConfigError::Invalid(format!(
                "timing.period_ms must be in [1, {MAX_PERIOD_MS}], got {}",
                self.timing.period_ms
            )));
        }

        self.drivetrain
            .constants()
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("drivetrain: {e}")))?;
        self.drivetrain
            .arcade()
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("drivetrain: {e}")))?;

        let ch = &self.channels;
        if ch.left_motor == ch.right_motor {
            return Err(ConfigError::Invalid(format!(
                "channels: left_motor and right_motor share PWM {}",
                ch.left_motor
            )));
        }
        let dio = [
            ch.left_encoder[0],
            ch.left_encoder[1],
            ch.right_encoder[0],
            ch.right_encoder[1],
        ];
        for (i, a) in dio.iter().enumerate() {
            if dio[i + 1..].contains(a) {
                return Err(ConfigError::Invalid(format!(
                    "channels: DIO {a} assigned more than once"
                )));
            }
        }

        let auto = &self.autonomous;
        if !(auto.drive_seconds.is_finite() && auto.drive_seconds >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "autonomous.drive_seconds must be >= 0, got {}",
                auto.drive_seconds
            )));
        }
        for (name, value) in [("forward", auto.forward), ("rotation", auto.rotation)] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "autonomous.{name} must be in [-1, 1], got {value}"
                )));
            }
        }

        if !(self.sim.max_wheel_speed_inch_per_s.is_finite()
            && self.sim.max_wheel_speed_inch_per_s > 0.0)
        {
            return Err(ConfigError::Invalid(
                "sim.max_wheel_speed_inch_per_s must be > 0".to_string(),
            ));
        }
        if self.sim.port == 0 {
            return Err(ConfigError::Invalid("sim.port must be non-zero".to_string()));
        }

        Ok(())
    }

    /// 仿真后端参数（与底盘/通道配置保持一致）
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            left_pwm_channel: self.channels.left_motor,
            right_pwm_channel: self.channels.right_motor,
            wheel_diameter_inch: self.drivetrain.wheel_diameter_inch,
            track_width_inch: self.drivetrain.track_width_inch,
            counts_per_revolution: self.drivetrain.counts_per_revolution,
            max_wheel_speed_inch_per_s: self.sim.max_wheel_speed_inch_per_s,
            right_motor_mirrored: self.sim.right_motor_mirrored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let config = RobotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timing.period(), Duration::from_millis(20));
        assert_eq!(config.channels.left_encoder, [4, 5]);
        assert_eq!(config.channels.right_encoder, [6, 7]);
        assert_eq!(config.channels.joystick, 1);
        assert_eq!(config.autonomous.drive_seconds, 2.0);
        assert_eq!(config.autonomous.forward, -0.4);
        assert_eq!(config.sim.endpoint(), SimEndpoint::new("10.0.0.2", 3300));
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = RobotConfig::default();
        config.timing.period_ms = 10;
        config.autonomous.drive_seconds = 3.5;
        config.sim.host = "192.168.4.1".to_string();

        let text = config.to_toml_string().unwrap();
        let parsed = RobotConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = RobotConfig::from_toml_str(
            r#"
            [autonomous]
            drive_seconds = 1.5
            "#,
        )
        .unwrap();
        assert_eq!(config.autonomous.drive_seconds, 1.5);
        assert_eq!(config.autonomous.forward, -0.4);
        assert_eq!(config.drivetrain, DrivetrainConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases = [
            "[timing]\nperiod_ms = 0",
            "[timing]\nperiod_ms = 1001",
            "[timing]\nperiod_ms = 18446744073709551615",
            "[drivetrain]\ncounts_per_revolution = 0.0",
            "[drivetrain]\ndeadband = 1.5",
            "[channels]\nleft_motor = 1\nright_motor = 1",
            "[channels]\nleft_encoder = [4, 5]\nright_encoder = [5, 6]",
            "[autonomous]\nforward = 1.5",
            "[autonomous]\ndrive_seconds = -1.0",
            "[sim]\nport = 0",
        ];
        for case in cases {
            let err = RobotConfig::from_toml_str(case).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{case}: {err}");
        }
    }

    #[test]
    fn test_parse_error() {
        let err = RobotConfig::from_toml_str("[timing\nperiod_ms = 20").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_and_save() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timing]\nperiod_ms = 50").unwrap();

        let config = RobotConfig::load(file.path()).unwrap();
        assert_eq!(config.timing.period_ms, 50);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("romi.toml");
        config.save(&path).unwrap();
        assert_eq!(RobotConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = RobotConfig::load("/nonexistent/romi.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/romi.toml"));
    }

    #[test]
    fn test_sim_config_follows_drivetrain() {
        let mut config = RobotConfig::default();
        config.drivetrain.wheel_diameter_inch = 3.0;
        config.channels.left_motor = 2;
        let sim = config.sim_config();
        assert_eq!(sim.wheel_diameter_inch, 3.0);
        assert_eq!(sim.left_pwm_channel, 2);
        assert_eq!(sim.counts_per_revolution, 1440.0);
    }

    #[test]
    fn test_derived_hal_types_serialize() {
        let mut config = RobotConfig::default();
        config.sim.right_motor_mirrored = true;

        let sim = config.sim_config();
        let text = toml::to_string(&sim).unwrap();
        assert!(text.contains("right_motor_mirrored = true"));
        assert_eq!(toml::from_str::<SimConfig>(&text).unwrap(), sim);

        let endpoint = config.sim.endpoint();
        let text = toml::to_string(&endpoint).unwrap();
        assert_eq!(toml::from_str::<SimEndpoint>(&text).unwrap(), endpoint);

        let constants = config.drivetrain.constants();
        let text = toml::to_string(&constants).unwrap();
        assert_eq!(toml::from_str::<DrivetrainConstants>(&text).unwrap(), constants);
    }
}
