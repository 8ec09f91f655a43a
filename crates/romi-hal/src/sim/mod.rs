//! Romi 仿真后端
//!
//! 纯软件实现的 [`HardwareProvider`]：电机输出经过简单的差速运动学积分，
//! 生成编码器计数、陀螺仪 Z 轴角度和前向加速度。
//!
//! # 使用示例
//!
//! ```rust
//! use romi_hal::{HardwareProvider, MotorController, QuadratureEncoder, SimRomi};
//! use std::time::Duration;
//!
//! let sim = SimRomi::default();
//! let mut left = sim.motor(0).unwrap();
//! let mut right = sim.motor(1).unwrap();
//! let encoder = sim.encoder(4, 5).unwrap();
//!
//! left.set(0.5);
//! right.set(0.5);
//! sim.step(Duration::from_millis(20));
//!
//! assert!(encoder.raw_count() > 0);
//! ```

mod handles;

use std::f64::consts::PI;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::clock::{Clock, ManualClock};
use crate::{
    Accelerometer, ChannelKind, Gyro, HalError, HardwareProvider, Joystick, MotorController,
    NUM_DIO_CHANNELS, NUM_JOYSTICK_PORTS, NUM_PWM_CHANNELS, QuadratureEncoder,
};

pub use handles::{SimAccelerometer, SimEncoder, SimGyro, SimJoystick, SimMotor};

/// 1 g 对应的加速度（in/s²）
const STANDARD_GRAVITY_IN_PER_S2: f64 = 386.088_6;

/// 左轮编码器 DIO 通道
pub const LEFT_ENCODER_CHANNELS: (u8, u8) = (4, 5);

/// 右轮编码器 DIO 通道
pub const RIGHT_ENCODER_CHANNELS: (u8, u8) = (6, 7);

/// 仿真参数
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// 左电机 PWM 通道
    pub left_pwm_channel: u8,

    /// 右电机 PWM 通道
    pub right_pwm_channel: u8,

    /// 轮径（英寸）
    pub wheel_diameter_inch: f64,

    /// 轮距（英寸）
    pub track_width_inch: f64,

    /// 每圈编码器计数
    pub counts_per_revolution: f64,

    /// 满输出时的轮速（in/s）
    pub max_wheel_speed_inch_per_s: f64,

    /// 右电机镜像安装（正输出使右轮后退）
    pub right_motor_mirrored: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            left_pwm_channel: 0,
            right_pwm_channel: 1,
            wheel_diameter_inch: 2.75591,
            track_width_inch: 5.551,
            counts_per_revolution: 1440.0,
            max_wheel_speed_inch_per_s: 30.0,
            right_motor_mirrored: false,
        }
    }
}

/// 轮子
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheel {
    Left,
    Right,
}

#[derive(Debug, Default, Clone, Copy)]
struct PwmSlot {
    claimed: bool,
    output: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct JoystickAxes {
    x: f64,
    y: f64,
}

/// 仿真物理状态（所有句柄共享）
#[derive(Debug)]
pub(crate) struct SimState {
    config: SimConfig,
    pwm: [PwmSlot; NUM_PWM_CHANNELS as usize],
    dio_claimed: [bool; NUM_DIO_CHANNELS as usize],
    joysticks: [JoystickAxes; NUM_JOYSTICK_PORTS as usize],
    left_travel_inch: f64,
    right_travel_inch: f64,
    left_velocity: f64,
    right_velocity: f64,
    heading_deg: f64,
    /// [x, y, z]，单位 g
    acceleration: [f64; 3],
}

impl SimState {
    fn new(config: SimConfig) -> Self {
        Self {
            config,
            pwm: [PwmSlot::default(); NUM_PWM_CHANNELS as usize],
            dio_claimed: [false; NUM_DIO_CHANNELS as usize],
            joysticks: [JoystickAxes::default(); NUM_JOYSTICK_PORTS as usize],
            left_travel_inch: 0.0,
            right_travel_inch: 0.0,
            left_velocity: 0.0,
            right_velocity: 0.0,
            heading_deg: 0.0,
            acceleration: [0.0, 0.0, 1.0],
        }
    }

    pub(crate) fn wheel_count(&self, wheel: Wheel) -> i32 {
        let travel = match wheel {
            Wheel::Left => self.left_travel_inch,
            Wheel::Right => self.right_travel_inch,
        };
        let circumference = PI * self.config.wheel_diameter_inch;
        // 朝零截断，与硬件计数器的整数语义一致
        (travel / circumference * self.config.counts_per_revolution) as i32
    }

    pub(crate) fn set_pwm(&mut self, channel: u8, output: f64) {
        self.pwm[channel as usize].output = output;
    }

    pub(crate) fn release_pwm(&mut self, channel: u8) {
        self.pwm[channel as usize] = PwmSlot::default();
    }

    pub(crate) fn release_dio(&mut self, channel: u8) {
        self.dio_claimed[channel as usize] = false;
    }

    pub(crate) fn heading_deg(&self) -> f64 {
        self.heading_deg
    }

    pub(crate) fn acceleration(&self) -> [f64; 3] {
        self.acceleration
    }

    pub(crate) fn joystick_axes(&self, port: u8) -> (f64, f64) {
        let axes = self.joysticks[port as usize];
        (axes.x, axes.y)
    }

    fn wheel_output(&self, channel: u8) -> f64 {
        self.pwm
            .get(channel as usize)
            .map(|slot| slot.output)
            .unwrap_or(0.0)
    }

    fn step(&mut self, dt: f64) {
        let left_out = self.wheel_output(self.config.left_pwm_channel);
        let mut right_out = self.wheel_output(self.config.right_pwm_channel);
        if self.config.right_motor_mirrored {
            right_out = -right_out;
        }

        let vl = left_out * self.config.max_wheel_speed_inch_per_s;
        let vr = right_out * self.config.max_wheel_speed_inch_per_s;
        let previous_forward = (self.left_velocity + self.right_velocity) / 2.0;

        self.left_travel_inch += vl * dt;
        self.right_travel_inch += vr * dt;
        self.left_velocity = vl;
        self.right_velocity = vr;

        let yaw_rate = (vr - vl) / self.config.track_width_inch;
        self.heading_deg += (yaw_rate * dt).to_degrees();

        let forward = (vl + vr) / 2.0;
        let forward_accel = (forward - previous_forward) / dt / STANDARD_GRAVITY_IN_PER_S2;
        self.acceleration = [forward_accel, 0.0, 1.0];
    }
}

/// Romi 仿真器
///
/// Clone 共享同一物理状态与时钟。
#[derive(Debug, Clone)]
pub struct SimRomi {
    state: Arc<Mutex<SimState>>,
    clock: ManualClock,
}

impl Default for SimRomi {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl SimRomi {
    pub fn new(config: SimConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState::new(config))),
            clock: ManualClock::new(),
        }
    }

    pub fn config(&self) -> SimConfig {
        self.state.lock().config.clone()
    }

    /// 推进仿真 `dt`，同时推进仿真时钟
    pub fn step(&self, dt: Duration) {
        if dt.is_zero() {
            return;
        }
        self.state.lock().step(dt.as_secs_f64());
        self.clock.advance(dt);
    }

    /// 仿真时钟（可注入控制程序）
    pub fn sim_clock(&self) -> ManualClock {
        self.clock.clone()
    }

    /// 注入手柄输入（钳位到 [-1.0, 1.0]）
    pub fn set_joystick(&self, port: u8, x: f64, y: f64) -> Result<(), HalError> {
        if port >= NUM_JOYSTICK_PORTS {
            return Err(HalError::InvalidJoystickPort(port));
        }
        let mut state = self.state.lock();
        state.joysticks[port as usize] = JoystickAxes {
            x: x.clamp(-1.0, 1.0),
            y: y.clamp(-1.0, 1.0),
        };
        Ok(())
    }

    /// PWM 通道当前输出（反转后）
    pub fn pwm_output(&self, channel: u8) -> f64 {
        self.state.lock().wheel_output(channel)
    }

    /// 轮子累计行程（英寸）
    pub fn wheel_travel(&self, wheel: Wheel) -> f64 {
        let state = self.state.lock();
        match wheel {
            Wheel::Left => state.left_travel_inch,
            Wheel::Right => state.right_travel_inch,
        }
    }

    /// 车体航向（度）
    pub fn heading_deg(&self) -> f64 {
        self.state.lock().heading_deg
    }

    fn claim_pwm(&self, channel: u8) -> Result<(), HalError> {
        if channel >= NUM_PWM_CHANNELS {
            return Err(HalError::InvalidChannel {
                kind: ChannelKind::Pwm,
                channel,
                limit: NUM_PWM_CHANNELS,
            });
        }
        let mut state = self.state.lock();
        let slot = &mut state.pwm[channel as usize];
        if slot.claimed {
            return Err(HalError::ChannelInUse {
                kind: ChannelKind::Pwm,
                channel,
            });
        }
        slot.claimed = true;
        slot.output = 0.0;
        Ok(())
    }

    fn claim_dio_pair(&self, channel_a: u8, channel_b: u8) -> Result<(), HalError> {
        for channel in [channel_a, channel_b] {
            if channel >= NUM_DIO_CHANNELS {
                return Err(HalError::InvalidChannel {
                    kind: ChannelKind::Dio,
                    channel,
                    limit: NUM_DIO_CHANNELS,
                });
            }
        }
        let mut state = self.state.lock();
        for channel in [channel_a, channel_b] {
            if state.dio_claimed[channel as usize] {
                return Err(HalError::ChannelInUse {
                    kind: ChannelKind::Dio,
                    channel,
                });
            }
        }
        state.dio_claimed[channel_a as usize] = true;
        state.dio_claimed[channel_b as usize] = true;
        Ok(())
    }
}

impl HardwareProvider for SimRomi {
    fn motor(&self, channel: u8) -> Result<Box<dyn MotorController>, HalError> {
        self.claim_pwm(channel)?;
        debug!("Sim PWM {} claimed", channel);
        Ok(Box::new(SimMotor::new(self.state.clone(), channel)))
    }

    fn encoder(
        &self,
        channel_a: u8,
        channel_b: u8,
    ) -> Result<Box<dyn QuadratureEncoder>, HalError> {
        let wheel = match (channel_a, channel_b) {
            LEFT_ENCODER_CHANNELS => Wheel::Left,
            RIGHT_ENCODER_CHANNELS => Wheel::Right,
            _ => return Err(HalError::EncoderChannelMismatch(channel_a, channel_b)),
        };
        self.claim_dio_pair(channel_a, channel_b)?;
        debug!("Sim encoder on DIO ({}, {}) claimed for {:?} wheel", channel_a, channel_b, wheel);
        Ok(Box::new(SimEncoder::new(
            self.state.clone(),
            wheel,
            (channel_a, channel_b),
        )))
    }

    fn gyro(&self) -> Result<Box<dyn Gyro>, HalError> {
        Ok(Box::new(SimGyro::new(self.state.clone())))
    }

    fn accelerometer(&self) -> Result<Box<dyn Accelerometer>, HalError> {
        Ok(Box::new(SimAccelerometer::new(self.state.clone())))
    }

    fn joystick(&self, port: u8) -> Result<Box<dyn Joystick>, HalError> {
        if port >= NUM_JOYSTICK_PORTS {
            return Err(HalError::InvalidJoystickPort(port));
        }
        Ok(Box::new(SimJoystick::new(self.state.clone(), port)))
    }

    fn clock(&self) -> Arc<dyn Clock> {
        Arc::new(self.clock.clone())
    }
}
