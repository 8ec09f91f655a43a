//! Romi 控制程序
//!
//! 持有底盘、两个编码器、陀螺仪、加速度计、手柄和模式计时器，全部由
//! [`RomiBuilder`](crate::RomiBuilder) 注入。

use romi_drive::{DifferentialDrive, DriveCommand, Encoder};
use romi_hal::{Accelerometer, Gyro, Joystick, SimEndpoint};
use tracing::{debug, info};

use crate::autonomous::{TimedDrive, teleop_command};
use crate::mode::{RobotMode, RobotProgram};
use crate::telemetry::{Dashboard, TelemetryFrame};
use crate::timer::Timer;

/// Romi 控制程序
pub struct RomiRobot {
    pub(crate) drive: DifferentialDrive,
    pub(crate) left_encoder: Encoder,
    pub(crate) right_encoder: Encoder,
    pub(crate) gyro: Box<dyn Gyro>,
    pub(crate) accelerometer: Box<dyn Accelerometer>,
    pub(crate) stick: Box<dyn Joystick>,
    pub(crate) timer: Timer,
    pub(crate) autonomous: TimedDrive,
    pub(crate) dashboard: Box<dyn Dashboard>,
    pub(crate) endpoint: Option<SimEndpoint>,
}

impl std::fmt::Debug for RomiRobot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RomiRobot")
            .field("drive", &self.drive)
            .field("left_encoder", &self.left_encoder)
            .field("right_encoder", &self.right_encoder)
            .field("timer", &self.timer)
            .field("autonomous", &self.autonomous)
            .finish_non_exhaustive()
    }
}

impl RomiRobot {
    /// 编码器计数与距离清零
    ///
    /// 可在任意时刻重复调用，效果相同。
    pub fn reset_encoders(&mut self) {
        self.left_encoder.reset();
        self.right_encoder.reset();
    }

    /// 采样当前传感器读数（只读）
    pub fn telemetry(&self) -> TelemetryFrame {
        TelemetryFrame {
            left_count: self.left_encoder.get(),
            right_count: self.right_encoder.get(),
            left_distance: self.left_encoder.get_distance(),
            right_distance: self.right_encoder.get_distance(),
            acceleration: [
                self.accelerometer.x(),
                self.accelerometer.y(),
                self.accelerometer.z(),
            ],
            gyro: [self.gyro.angle_x(), self.gyro.angle_y(), self.gyro.angle_z()],
        }
    }

    /// 最近一次下发给底盘的指令
    pub fn last_command(&self) -> Option<DriveCommand> {
        self.drive.last_command()
    }

    pub fn drive(&self) -> &DifferentialDrive {
        &self.drive
    }

    pub fn left_encoder(&self) -> &Encoder {
        &self.left_encoder
    }

    pub fn right_encoder(&self) -> &Encoder {
        &self.right_encoder
    }

    /// 自动模式计时器
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn autonomous_plan(&self) -> TimedDrive {
        self.autonomous
    }
}

impl RobotProgram for RomiRobot {
    fn robot_init(&mut self) {
        match &self.endpoint {
            Some(endpoint) => info!("Romi robot initialized (HAL sim endpoint {})", endpoint),
            None => info!("Romi robot initialized"),
        }
        info!(
            "Encoder distance per pulse: {:.6} in/count",
            self.left_encoder.distance_per_pulse()
        );
    }

    fn robot_periodic(&mut self) {
        let frame = self.telemetry();
        frame.publish(self.dashboard.as_mut());
    }

    fn disabled_init(&mut self) {
        self.drive.stop_motor();
    }

    fn autonomous_init(&mut self) {
        self.timer.reset();
        self.timer.start();
        debug!("Autonomous started: {:?}", self.autonomous);
    }

    fn autonomous_periodic(&mut self) {
        let command = self.autonomous.command_at(self.timer.get());
        self.drive.arcade_drive(command);
    }

    fn teleop_periodic(&mut self) {
        let command = teleop_command(self.stick.x(), self.stick.y());
        self.drive.arcade_drive(command);
    }

    fn cycle_end(&mut self, mode: RobotMode) {
        if mode.is_enabled() {
            self.drive.check_safety();
        }
    }
}
