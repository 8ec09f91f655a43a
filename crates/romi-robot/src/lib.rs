//! # Romi Robot
//!
//! Romi 差速机器人的周期控制程序。
//!
//! # 架构
//!
//! - **模式分发** (`mode`): `Disabled` / `Autonomous` / `Teleop` 显式状态，
//!   每个模式有独立的进入（init）与周期（periodic）回调
//! - **控制程序** (`robot`): 读取传感器、发布遥测、下发驱动指令
//! - **定时自动** (`autonomous`): 以经过时间为输入的纯函数
//! - **遥测** (`telemetry`): 固定标签的数值仪表盘
//! - **运行器** (`runner`): 固定周期（默认 20ms）的单线程协作循环
//!
//! # 快速开始
//!
//! ```rust
//! use romi_hal::SimRomi;
//! use romi_robot::{FixedMode, LoopConfig, LoopRunner, RobotMode, RomiBuilder, SmartDashboard};
//!
//! # fn main() -> Result<(), romi_robot::RobotError> {
//! let sim = SimRomi::default();
//! let dashboard = SmartDashboard::new();
//! let mut robot = RomiBuilder::new()
//!     .dashboard(dashboard.clone())
//!     .build(&sim)?;
//!
//! let config = LoopConfig {
//!     max_iterations: Some(10),
//!     ..LoopConfig::unpaced()
//! };
//! let runner = LoopRunner::new(config, romi_hal::HardwareProvider::clock(&sim));
//! let mut modes = FixedMode(RobotMode::Autonomous);
//! runner.run(&mut robot, &mut modes, |_| sim.step(std::time::Duration::from_millis(20)))?;
//!
//! assert!(dashboard.get_number("Left Encoder Count").is_some());
//! # Ok(())
//! # }
//! ```

pub mod autonomous;
mod builder;
pub mod config;
mod error;
pub mod mode;
mod robot;
pub mod runner;
pub mod schedule;
pub mod telemetry;
pub mod timer;

pub use autonomous::{TimedDrive, autonomous_command, teleop_command};
pub use builder::RomiBuilder;
pub use config::{ConfigError, RobotConfig};
pub use error::RobotError;
pub use mode::{ModeDispatcher, ParseModeError, RobotMode, RobotProgram};
pub use robot::RomiRobot;
pub use runner::{CycleInfo, LoopConfig, LoopRunner, LoopStats, Pacing, run_robot};
pub use schedule::{FixedMode, ModeSchedule, ModeSource};
pub use telemetry::{Dashboard, NullDashboard, SmartDashboard, TelemetryFrame};
pub use timer::Timer;
