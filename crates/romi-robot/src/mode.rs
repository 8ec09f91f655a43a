//! 运行模式与分发
//!
//! 运行模式由外部调度方（驱动站/模式计划）决定，控制程序只响应：
//!
//! - 模式变化时调用新模式的 `*_init()`（每次进入恰好一次）
//! - 每个周期调用当前模式的 `*_periodic()`
//! - 每个周期调用 `robot_periodic()`（所有模式）
//! - 最后调用 `cycle_end()`

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RobotMode {
    /// 禁用（默认），执行器不输出
    #[default]
    Disabled,
    /// 自动
    Autonomous,
    /// 手动遥控
    Teleop,
}

impl RobotMode {
    pub fn is_enabled(self) -> bool {
        self != Self::Disabled
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Autonomous => "autonomous",
            Self::Teleop => "teleop",
        }
    }
}

impl fmt::Display for RobotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 模式名称解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown robot mode: {0:?} (expected disabled, autonomous or teleop)")]
pub struct ParseModeError(pub String);

impl FromStr for RobotMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" => Ok(Self::Disabled),
            "autonomous" | "auto" => Ok(Self::Autonomous),
            "teleop" => Ok(Self::Teleop),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// 控制程序生命周期回调
///
/// 所有回调默认为空实现，按需覆盖。
pub trait RobotProgram {
    /// 启动时调用一次
    fn robot_init(&mut self) {}

    /// 每个周期调用（所有模式）
    fn robot_periodic(&mut self) {}

    fn disabled_init(&mut self) {}
    fn disabled_periodic(&mut self) {}

    fn autonomous_init(&mut self) {}
    fn autonomous_periodic(&mut self) {}

    fn teleop_init(&mut self) {}
    fn teleop_periodic(&mut self) {}

    /// 周期结束（看门狗检查等）
    fn cycle_end(&mut self, _mode: RobotMode) {}
}

/// 模式分发器
#[derive(Debug, Default, Clone)]
pub struct ModeDispatcher {
    current: Option<RobotMode>,
    transitions: u64,
}

impl ModeDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前模式（尚未运行任何周期时为 None）
    pub fn current(&self) -> Option<RobotMode> {
        self.current
    }

    /// 模式切换次数（包括首次进入）
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// 以 `mode` 运行一个周期
    ///
    /// 返回 true 表示本周期进入了新模式。
    pub fn step<P: RobotProgram + ?Sized>(&mut self, mode: RobotMode, program: &mut P) -> bool {
        let entered = self.current != Some(mode);
        if entered {
            debug!("Mode transition: {:?} -> {}", self.current, mode);
            match mode {
                RobotMode::Disabled => program.disabled_init(),
                RobotMode::Autonomous => program.autonomous_init(),
                RobotMode::Teleop => program.teleop_init(),
            }
            self.current = Some(mode);
            self.transitions += 1;
        }

        match mode {
            RobotMode::Disabled => program.disabled_periodic(),
            RobotMode::Autonomous => program.autonomous_periodic(),
            RobotMode::Teleop => program.teleop_periodic(),
        }

        program.robot_periodic();
        program.cycle_end(mode);

        entered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 记录回调顺序的程序
    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
    }

    impl RobotProgram for Recorder {
        fn robot_periodic(&mut self) {
            self.calls.push("robot_periodic");
        }
        fn disabled_init(&mut self) {
            self.calls.push("disabled_init");
        }
        fn disabled_periodic(&mut self) {
            self.calls.push("disabled_periodic");
        }
        fn autonomous_init(&mut self) {
            self.calls.push("autonomous_init");
        }
        fn autonomous_periodic(&mut self) {
            self.calls.push("autonomous_periodic");
        }
        fn teleop_init(&mut self) {
            self.calls.push("teleop_init");
        }
        fn teleop_periodic(&mut self) {
            self.calls.push("teleop_periodic");
        }
        fn cycle_end(&mut self, _mode: RobotMode) {
            self.calls.push("cycle_end");
        }
    }

    #[test]
    fn test_init_runs_once_per_entry() {
        let mut dispatcher = ModeDispatcher::new();
        let mut program = Recorder::default();

        assert!(dispatcher.step(RobotMode::Autonomous, &mut program));
        assert!(!dispatcher.step(RobotMode::Autonomous, &mut program));

        assert_eq!(
            program.calls,
            vec![
                "autonomous_init",
                "autonomous_periodic",
                "robot_periodic",
                "cycle_end",
                "autonomous_periodic",
                "robot_periodic",
                "cycle_end",
            ]
        );
        assert_eq!(dispatcher.current(), Some(RobotMode::Autonomous));
        assert_eq!(dispatcher.transitions(), 1);
    }

    #[test]
    fn test_reentry_runs_init_again() {
        let mut dispatcher = ModeDispatcher::new();
        let mut program = Recorder::default();

        dispatcher.step(RobotMode::Autonomous, &mut program);
        dispatcher.step(RobotMode::Disabled, &mut program);
        dispatcher.step(RobotMode::Autonomous, &mut program);

        let inits: Vec<_> = program.calls.iter().filter(|c| c.ends_with("_init")).collect();
        assert_eq!(inits, vec![&"autonomous_init", &"disabled_init", &"autonomous_init"]);
        assert_eq!(dispatcher.transitions(), 3);
    }

    #[test]
    fn test_default_callbacks_are_noops() {
        struct Empty;
        impl RobotProgram for Empty {}

        let mut dispatcher = ModeDispatcher::new();
        assert!(dispatcher.step(RobotMode::Teleop, &mut Empty));
        assert!(!dispatcher.step(RobotMode::Teleop, &mut Empty));
    }

    #[test]
    fn test_mode_parse_and_display() {
        assert_eq!("Teleop".parse::<RobotMode>(), Ok(RobotMode::Teleop));
        assert_eq!("auto".parse::<RobotMode>(), Ok(RobotMode::Autonomous));
        assert_eq!(" disabled ".parse::<RobotMode>(), Ok(RobotMode::Disabled));
        assert!("test".parse::<RobotMode>().is_err());

        assert_eq!(RobotMode::Autonomous.to_string(), "autonomous");
        assert!(!RobotMode::Disabled.is_enabled());
        assert!(RobotMode::Teleop.is_enabled());
        assert_eq!(RobotMode::default(), RobotMode::Disabled);
    }
}
