//! run 命令
//!
//! 构造仿真 Romi，按模式计划运行控制循环，直到计划结束或 Ctrl+C。

use anyhow::{Context, Result};
use clap::Args;
use romi_hal::{HardwareProvider, SimEndpoint, SimRomi};
use romi_robot::telemetry::labels;
use romi_robot::{
    LoopConfig, LoopRunner, ModeSchedule, Pacing, RobotConfig, RobotMode, RomiBuilder,
    SmartDashboard,
};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::info;

use super::config::load_config;
use crate::validation::{validate_axis, validate_seconds};

/// 运行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 配置文件路径（TOML）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 禁用阶段时长（秒）
    #[arg(long, default_value_t = 0.5)]
    pub disabled: f64,

    /// 自动阶段时长（秒）
    #[arg(long, default_value_t = 3.0)]
    pub autonomous: f64,

    /// 手动阶段时长（秒）
    #[arg(long, default_value_t = 0.0)]
    pub teleop: f64,

    /// 手柄 X 轴（旋转）
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub stick_x: f64,

    /// 手柄 Y 轴（前进）
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub stick_y: f64,

    /// 控制周期（毫秒，覆盖配置）
    #[arg(long)]
    pub period_ms: Option<u64>,

    /// 不按墙钟等待（尽快跑完仿真）
    #[arg(long)]
    pub unpaced: bool,

    /// 每隔多少个周期输出一次遥测日志（0 表示不输出）
    #[arg(long, default_value_t = 50)]
    pub report_every: u64,
}

impl RunCommand {
    /// 合并命令行覆盖项后的配置
    fn resolve_config(&self) -> Result<RobotConfig> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(period_ms) = self.period_ms {
            config.timing.period_ms = period_ms;
        }
        config.validate()?;
        Ok(config)
    }

    /// 模式计划：禁用 -> 自动 -> 手动
    fn schedule(&self) -> Result<ModeSchedule> {
        let schedule = ModeSchedule::new()
            .then(RobotMode::Disabled, validate_seconds("disabled", self.disabled)?)
            .then(RobotMode::Autonomous, validate_seconds("autonomous", self.autonomous)?)
            .then(RobotMode::Teleop, validate_seconds("teleop", self.teleop)?);
        if schedule.is_empty() {
            anyhow::bail!("模式计划为空：至少一个阶段的时长必须大于 0");
        }
        Ok(schedule)
    }

    pub fn execute(&self) -> Result<()> {
        let config = self.resolve_config()?;
        let mut schedule = self.schedule()?;
        let stick_x = validate_axis("stick-x", self.stick_x)?;
        let stick_y = validate_axis("stick-y", self.stick_y)?;

        let endpoint = SimEndpoint::from_env_or(&config.sim.endpoint())
            .context("解析 HAL 仿真端点失败")?;
        info!("HAL sim endpoint: {}", endpoint);

        let sim = SimRomi::new(config.sim_config());
        sim.set_joystick(config.channels.joystick, stick_x, stick_y)?;

        let dashboard = SmartDashboard::new();
        let mut robot = RomiBuilder::new()
            .config(config.clone())
            .dashboard(dashboard.clone())
            .endpoint(endpoint)
            .build(&sim)?;

        let period = config.timing.period();
        let loop_config = LoopConfig {
            period,
            max_iterations: None,
            pacing: if self.unpaced { Pacing::Unpaced } else { Pacing::RealTime },
        };
        let runner = LoopRunner::new(loop_config, sim.clock());

        let shutdown = runner.shutdown_handle();
        ctrlc::set_handler(move || {
            eprintln!("\nReceived interrupt signal. Stopping robot...");
            shutdown.store(true, Ordering::Release);
        })
        .context("设置 Ctrl+C 处理器失败")?;

        info!(
            "Running schedule of {:?} with {:?} period ({})",
            schedule.total(),
            period,
            if self.unpaced { "unpaced" } else { "real time" }
        );

        let report_every = self.report_every;
        let stats = runner.run(&mut robot, &mut schedule, |cycle| {
            if report_every > 0 && cycle.iteration % report_every == 0 {
                info!(
                    "[{:>5}] {:<10} left={:>6} right={:>6} gyro_z={:>7.2}",
                    cycle.iteration,
                    cycle.mode,
                    dashboard.get_number(labels::LEFT_ENCODER_COUNT).unwrap_or_default(),
                    dashboard.get_number(labels::RIGHT_ENCODER_COUNT).unwrap_or_default(),
                    dashboard.get_number(labels::GYRO_Z).unwrap_or_default(),
                );
            }
            sim.step(period);
        })?;

        println!(
            "Run finished: {} cycles, {} mode transitions, {} overruns (max cycle {:?})",
            stats.iterations,
            stats.mode_transitions,
            stats.overruns,
            stats.max_cycle_time
        );
        println!("Simulated time: {:.2} s", sim_seconds(stats.iterations, period));
        for (label, value) in dashboard.snapshot() {
            println!("  {label}: {value:.3}");
        }

        Ok(())
    }
}

fn sim_seconds(iterations: u64, period: Duration) -> f64 {
    iterations as f64 * period.as_secs_f64()
}
