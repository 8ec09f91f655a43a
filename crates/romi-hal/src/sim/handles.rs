//! 仿真硬件句柄
//!
//! 每个句柄持有共享状态的 Arc，Drop 时释放占用的通道。

use std::sync::Arc;

use parking_lot::Mutex;

use super::{SimState, Wheel};
use crate::{Accelerometer, Gyro, Joystick, MotorController, QuadratureEncoder};

/// 仿真电机（PWM）
#[derive(Debug)]
pub struct SimMotor {
    state: Arc<Mutex<SimState>>,
    channel: u8,
    speed: f64,
    inverted: bool,
}

impl SimMotor {
    pub(crate) fn new(state: Arc<Mutex<SimState>>, channel: u8) -> Self {
        Self {
            state,
            channel,
            speed: 0.0,
            inverted: false,
        }
    }

    fn apply(&mut self) {
        let output = if self.inverted { -self.speed } else { self.speed };
        self.state.lock().set_pwm(self.channel, output);
    }
}

impl MotorController for SimMotor {
    fn set(&mut self, speed: f64) {
        // NaN 视为 0，避免污染仿真状态
        self.speed = if speed.is_nan() { 0.0 } else { speed.clamp(-1.0, 1.0) };
        self.apply();
    }

    fn get(&self) -> f64 {
        self.speed
    }

    fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
        self.apply();
    }

    fn is_inverted(&self) -> bool {
        self.inverted
    }
}

impl Drop for SimMotor {
    fn drop(&mut self) {
        self.state.lock().release_pwm(self.channel);
    }
}

/// 仿真正交编码器
#[derive(Debug)]
pub struct SimEncoder {
    state: Arc<Mutex<SimState>>,
    wheel: Wheel,
    channels: (u8, u8),
    /// reset 时记录的物理计数
    offset: i32,
}

impl SimEncoder {
    pub(crate) fn new(state: Arc<Mutex<SimState>>, wheel: Wheel, channels: (u8, u8)) -> Self {
        let offset = state.lock().wheel_count(wheel);
        Self {
            state,
            wheel,
            channels,
            offset,
        }
    }
}

impl QuadratureEncoder for SimEncoder {
    fn raw_count(&self) -> i32 {
        self.state.lock().wheel_count(self.wheel).wrapping_sub(self.offset)
    }

    fn reset(&mut self) {
        self.offset = self.state.lock().wheel_count(self.wheel);
    }
}

impl Drop for SimEncoder {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.release_dio(self.channels.0);
        state.release_dio(self.channels.1);
    }
}

/// 仿真陀螺仪
///
/// 平地行驶，X/Y 轴角度恒为 0。
#[derive(Debug)]
pub struct SimGyro {
    state: Arc<Mutex<SimState>>,
    offset_z: f64,
}

impl SimGyro {
    pub(crate) fn new(state: Arc<Mutex<SimState>>) -> Self {
        Self { state, offset_z: 0.0 }
    }
}

impl Gyro for SimGyro {
    fn angle_x(&self) -> f64 {
        0.0
    }

    fn angle_y(&self) -> f64 {
        0.0
    }

    fn angle_z(&self) -> f64 {
        self.state.lock().heading_deg() - self.offset_z
    }

    fn reset(&mut self) {
        self.offset_z = self.state.lock().heading_deg();
    }
}

/// 仿真加速度计
#[derive(Debug)]
pub struct SimAccelerometer {
    state: Arc<Mutex<SimState>>,
}

impl SimAccelerometer {
    pub(crate) fn new(state: Arc<Mutex<SimState>>) -> Self {
        Self { state }
    }
}

impl Accelerometer for SimAccelerometer {
    fn x(&self) -> f64 {
        self.state.lock().acceleration()[0]
    }

    fn y(&self) -> f64 {
        self.state.lock().acceleration()[1]
    }

    fn z(&self) -> f64 {
        self.state.lock().acceleration()[2]
    }
}

/// 仿真手柄
#[derive(Debug)]
pub struct SimJoystick {
    state: Arc<Mutex<SimState>>,
    port: u8,
}

impl SimJoystick {
    pub(crate) fn new(state: Arc<Mutex<SimState>>, port: u8) -> Self {
        Self { state, port }
    }
}

impl Joystick for SimJoystick {
    fn x(&self) -> f64 {
        self.state.lock().joystick_axes(self.port).0
    }

    fn y(&self) -> f64 {
        self.state.lock().joystick_axes(self.port).1
    }
}

#[cfg(test)]
mod tests {
    use crate::sim::SimRomi;
    use crate::{Accelerometer, Gyro, HardwareProvider, MotorController, QuadratureEncoder};
    use std::time::Duration;

    #[test]
    fn test_motor_clamps_and_inverts() {
        let sim = SimRomi::default();
        let mut motor = sim.motor(0).unwrap();

        motor.set(1.7);
        assert_eq!(motor.get(), 1.0);
        assert_eq!(sim.pwm_output(0), 1.0);

        motor.set_inverted(true);
        assert!(motor.is_inverted());
        assert_eq!(motor.get(), 1.0);
        assert_eq!(sim.pwm_output(0), -1.0);

        motor.stop_motor();
        assert_eq!(sim.pwm_output(0), 0.0);
    }

    #[test]
    fn test_encoder_reset_uses_offset() {
        let sim = SimRomi::default();
        let mut left = sim.motor(0).unwrap();
        let mut encoder = sim.encoder(4, 5).unwrap();

        left.set(1.0);
        sim.step(Duration::from_millis(200));
        assert!(encoder.raw_count() > 0);

        encoder.reset();
        assert_eq!(encoder.raw_count(), 0);

        // 物理状态不受影响，继续前进后重新计数
        sim.step(Duration::from_millis(200));
        assert!(encoder.raw_count() > 0);
    }

    #[test]
    fn test_encoder_negative_when_reversing() {
        let sim = SimRomi::default();
        let mut right = sim.motor(1).unwrap();
        let encoder = sim.encoder(6, 7).unwrap();

        right.set(-0.5);
        sim.step(Duration::from_millis(200));
        assert!(encoder.raw_count() < 0);
    }

    #[test]
    fn test_gyro_reset() {
        let sim = SimRomi::default();
        let mut left = sim.motor(0).unwrap();
        let mut gyro = sim.gyro().unwrap();

        left.set(-1.0);
        sim.step(Duration::from_millis(100));
        assert!(gyro.angle_z() > 0.0);
        assert_eq!(gyro.angle_x(), 0.0);

        gyro.reset();
        assert_eq!(gyro.angle_z(), 0.0);
    }

    #[test]
    fn test_accelerometer_reports_gravity_at_rest() {
        let sim = SimRomi::default();
        let accel = sim.accelerometer().unwrap();
        assert_eq!(accel.z(), 1.0);
        assert_eq!(accel.x(), 0.0);

        let mut left = sim.motor(0).unwrap();
        let mut right = sim.motor(1).unwrap();
        left.set(1.0);
        right.set(1.0);
        sim.step(Duration::from_millis(20));
        assert!(accel.x() > 0.0);

        // 匀速后加速度归零
        sim.step(Duration::from_millis(20));
        assert!(accel.x().abs() < 1e-12);
    }
}
