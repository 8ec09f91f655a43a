//! Loop Runner - 固定周期控制循环
//!
//! 单线程协作式循环：每个周期询问模式来源、分发回调、记录耗时，然后等待到下一个
//! 周期起点。
//!
//! # 核心功能
//!
//! - **精确定时**: 使用 `spin_sleep` 等待到绝对时间点，抖动不累积
//! - **超时告警**: 周期耗时超过标称周期时输出 `warn!`
//! - **协作退出**: 共享的 `AtomicBool` 标志（例如 Ctrl+C 处理器）
//! - **退出安全**: 循环结束时若仍处于使能模式，调用 `disabled_init()` 停止执行器

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use romi_hal::Clock;
use spin_sleep::SpinSleeper;
use tracing::{info, trace, warn};

use crate::error::RobotError;
use crate::mode::{ModeDispatcher, RobotMode, RobotProgram};
use crate::schedule::ModeSource;

/// 默认控制周期（20ms，50Hz）
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(20);

/// 周期等待方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    /// 按墙钟等待到下一周期起点
    #[default]
    RealTime,
    /// 不等待（仿真、测试）
    Unpaced,
}

/// 控制循环配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// 标称周期
    pub period: Duration,
    /// 最大迭代次数（None 表示直到退出标志或模式来源结束）
    pub max_iterations: Option<u64>,
    pub pacing: Pacing,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            max_iterations: None,
            pacing: Pacing::RealTime,
        }
    }
}

impl LoopConfig {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    /// 不等待的配置（周期仍用于超时判断）
    pub fn unpaced() -> Self {
        Self {
            pacing: Pacing::Unpaced,
            ..Self::default()
        }
    }
}

/// 单个周期的信息（传给 `after_cycle` 钩子）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleInfo {
    /// 从 0 开始的周期序号
    pub iteration: u64,
    pub mode: RobotMode,
    /// 本周期是否进入了新模式
    pub entered: bool,
    /// 回调执行耗时（不含等待）
    pub cycle_time: Duration,
}

/// 运行统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopStats {
    pub iterations: u64,
    pub overruns: u64,
    pub max_cycle_time: Duration,
    pub mode_transitions: u64,
}

/// 控制循环运行器
#[derive(Clone)]
pub struct LoopRunner {
    config: LoopConfig,
    clock: Arc<dyn Clock>,
    shutdown: Arc<AtomicBool>,
}

impl std::fmt::Debug for LoopRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopRunner")
            .field("config", &self.config)
            .field("shutdown", &self.is_shutdown_requested())
            .finish_non_exhaustive()
    }
}

impl LoopRunner {
    /// `clock` 为传给模式来源的时间基准（通常与硬件提供者共享）
    pub fn new(config: LoopConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// 退出标志（置为 true 后循环在下一周期开始前结束）
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// 运行控制循环（阻塞）
    ///
    /// 循环在以下任一条件下结束：
    /// - 退出标志被置位
    /// - 达到 `max_iterations`
    /// - 模式来源返回 `None`
    ///
    /// `after_cycle` 在每个周期的回调之后、等待之前调用，可用于推进仿真。
    pub fn run<P, S, F>(
        &self,
        program: &mut P,
        modes: &mut S,
        mut after_cycle: F,
    ) -> Result<LoopStats, RobotError>
    where
        P: RobotProgram + ?Sized,
        S: ModeSource + ?Sized,
        F: FnMut(&CycleInfo),
    {
        let period = self.config.period;
        if period.is_zero() {
            return Err(RobotError::InvalidLoopConfig(
                "period must be > 0".to_string(),
            ));
        }

        #[cfg(feature = "realtime")]
        {
            use thread_priority::*;

            match set_current_thread_priority(ThreadPriority::Max) {
                Ok(_) => {
                    info!("Control thread priority set to MAX (realtime)");
                },
                Err(e) => {
                    warn!(
                        "Failed to set control thread priority: {}. \
                        On Linux, you may need to run with CAP_SYS_NICE or use rtkit.",
                        e
                    );
                },
            }
        }

        let Some(mut deadline) = Instant::now().checked_add(period) else {
            return Err(RobotError::InvalidLoopConfig(format!(
                "period {period:?} is too large"
            )));
        };

        program.robot_init();

        let sleeper = SpinSleeper::default();
        let mut dispatcher = ModeDispatcher::new();
        let mut stats = LoopStats::default();

        loop {
            if self.is_shutdown_requested() {
                info!("Shutdown requested, leaving control loop");
                break;
            }
            if let Some(max) = self.config.max_iterations
                && stats.iterations >= max
            {
                break;
            }
            let Some(mode) = modes.mode(self.clock.now()) else {
                info!("Mode source finished after {} cycles", stats.iterations);
                break;
            };

            let started = Instant::now();
            let entered = dispatcher.step(mode, program);
            let cycle_time = started.elapsed();

            if entered {
                info!("Entering {} mode", mode);
                stats.mode_transitions += 1;
            }
            if cycle_time > period {
                stats.overruns += 1;
                warn!(
                    "Loop time of {:?} overrun: cycle took {:?} in {} mode",
                    period, cycle_time, mode
                );
            }
            stats.max_cycle_time = stats.max_cycle_time.max(cycle_time);

            let info = CycleInfo {
                iteration: stats.iterations,
                mode,
                entered,
                cycle_time,
            };
            stats.iterations += 1;
            after_cycle(&info);

            if self.config.pacing == Pacing::RealTime {
                let now = Instant::now();
                if now < deadline {
                    sleeper.sleep(deadline - now);
                    deadline += period;
                } else {
                    // 落后时从当前时刻重新对齐，不补跑
                    trace!("Behind schedule by {:?}, resyncing", now - deadline);
                    deadline = now + period;
                }
            }
        }

        if dispatcher.current().is_some_and(RobotMode::is_enabled) {
            program.disabled_init();
        }

        info!(
            "Control loop stopped: {} cycles, {} overruns, max cycle {:?}",
            stats.iterations, stats.overruns, stats.max_cycle_time
        );
        Ok(stats)
    }
}

/// 运行控制程序（不带周期钩子）
///
/// 生命周期入口：`robot_init()` 之后按 `modes` 分发回调，直到模式来源结束或达到
/// `max_iterations`。需要 Ctrl+C 退出或推进仿真时使用 [`LoopRunner`]。
pub fn run_robot<P, S>(
    program: &mut P,
    modes: &mut S,
    config: LoopConfig,
    clock: Arc<dyn Clock>,
) -> Result<LoopStats, RobotError>
where
    P: RobotProgram + ?Sized,
    S: ModeSource + ?Sized,
{
    LoopRunner::new(config, clock).run(program, modes, |_| {})
}
