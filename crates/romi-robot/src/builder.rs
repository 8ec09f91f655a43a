//! Builder 模式实现
//!
//! 从 [`HardwareProvider`] 获取全部硬件句柄并构造 [`RomiRobot`]。

use romi_drive::{DifferentialDrive, Encoder};
use romi_hal::{HardwareProvider, SimEndpoint};
use tracing::debug;

use crate::config::RobotConfig;
use crate::error::RobotError;
use crate::robot::RomiRobot;
use crate::telemetry::{Dashboard, NullDashboard};
use crate::timer::Timer;

/// RomiRobot Builder（链式构造）
///
/// # Example
///
/// ```
/// use romi_hal::SimRomi;
/// use romi_robot::{RobotConfig, RomiBuilder, SmartDashboard};
///
/// let sim = SimRomi::default();
/// let robot = RomiBuilder::new()
///     .config(RobotConfig::default())
///     .dashboard(SmartDashboard::new())
///     .build(&sim)
///     .unwrap();
/// assert_eq!(robot.left_encoder().get(), 0);
/// ```
pub struct RomiBuilder {
    config: RobotConfig,
    dashboard: Option<Box<dyn Dashboard>>,
    endpoint: Option<SimEndpoint>,
}

impl Default for RomiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RomiBuilder {
    pub fn new() -> Self {
        Self {
            config: RobotConfig::default(),
            dashboard: None,
            endpoint: None,
        }
    }

    pub fn config(mut self, config: RobotConfig) -> Self {
        self.config = config;
        self
    }

    /// 遥测输出（默认丢弃）
    pub fn dashboard(mut self, dashboard: impl Dashboard + 'static) -> Self {
        self.dashboard = Some(Box::new(dashboard));
        self
    }

    /// HAL 仿真传输端点（仅用于启动日志）
    pub fn endpoint(mut self, endpoint: SimEndpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// 构造控制程序
    ///
    /// 1. 校验配置
    /// 2. 申请电机、编码器、陀螺仪、加速度计、手柄句柄
    /// 3. 设置每脉冲距离（之后不再修改）
    /// 4. 编码器清零
    pub fn build<H: HardwareProvider + ?Sized>(self, hardware: &H) -> Result<RomiRobot, RobotError> {
        let config = self.config;
        config.validate()?;

        let ch = &config.channels;
        let clock = hardware.clock();

        let left_motor = hardware.motor(ch.left_motor)?;
        let right_motor = hardware.motor(ch.right_motor)?;
        let mut drive =
            DifferentialDrive::new(left_motor, right_motor, clock.clone(), config.drivetrain.arcade())?;
        if config.drivetrain.invert_right_motor {
            drive.set_right_inverted(true);
        }

        let distance_per_pulse = config.drivetrain.constants().distance_per_pulse();
        let left_encoder = Encoder::new(
            hardware.encoder(ch.left_encoder[0], ch.left_encoder[1])?,
            distance_per_pulse,
        );
        let right_encoder = Encoder::new(
            hardware.encoder(ch.right_encoder[0], ch.right_encoder[1])?,
            distance_per_pulse,
        );

        let gyro = hardware.gyro()?;
        let accelerometer = hardware.accelerometer()?;
        let stick = hardware.joystick(ch.joystick)?;

        debug!(
            "Romi hardware acquired: PWM {}/{}, DIO {:?}/{:?}, joystick {}",
            ch.left_motor, ch.right_motor, ch.left_encoder, ch.right_encoder, ch.joystick
        );

        let mut robot = RomiRobot {
            drive,
            left_encoder,
            right_encoder,
            gyro,
            accelerometer,
            stick,
            timer: Timer::new(clock),
            autonomous: config.autonomous.timed_drive(),
            dashboard: self.dashboard.unwrap_or_else(|| Box::new(NullDashboard)),
            endpoint: self.endpoint,
        };
        robot.reset_encoders();

        Ok(robot)
    }
}
