//! 电机安全看门狗
//!
//! 执行器输出必须在 `expiration` 内被刷新（`feed`），否则视为控制程序失联，
//! 由持有者停止电机。超时后只记录一次警告，直到下一次 `feed`。

use std::time::Duration;

/// 默认超时时间（100ms，约 5 个 20ms 控制周期）
pub const DEFAULT_EXPIRATION: Duration = Duration::from_millis(100);

/// 电机安全看门狗
#[derive(Debug, Clone)]
pub struct MotorSafety {
    expiration: Duration,
    enabled: bool,
    /// 截止时间（None 表示从未喂狗）
    deadline: Option<Duration>,
    tripped: bool,
}

impl Default for MotorSafety {
    fn default() -> Self {
        Self::new(DEFAULT_EXPIRATION)
    }
}

impl MotorSafety {
    pub fn new(expiration: Duration) -> Self {
        Self {
            expiration,
            enabled: true,
            deadline: None,
            tripped: false,
        }
    }

    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    pub fn set_expiration(&mut self, expiration: Duration) {
        self.expiration = expiration;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// 喂狗：截止时间延后到 `now + expiration`
    pub fn feed(&mut self, now: Duration) {
        self.deadline = Some(now + self.expiration);
        self.tripped = false;
    }

    /// 是否仍在有效期内
    ///
    /// 从未喂狗视为已过期。
    pub fn is_alive(&self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) => now <= deadline,
            None => false,
        }
    }

    /// 检查超时
    ///
    /// 返回 `Some(first_trip)` 表示已超时，需要停止电机；`first_trip` 为 true 时
    /// 表示本次是首次超时（用于只记录一次日志）。禁用时总是返回 `None`。
    pub fn check(&mut self, now: Duration) -> Option<bool> {
        if !self.enabled || self.is_alive(now) {
            return None;
        }
        let first_trip = !self.tripped;
        self.tripped = true;
        Some(first_trip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_never_fed_is_expired() {
        let mut safety = MotorSafety::default();
        assert!(!safety.is_alive(ms(0)));
        assert_eq!(safety.check(ms(0)), Some(true));
        assert_eq!(safety.check(ms(20)), Some(false));
    }

    #[test]
    fn test_feed_keeps_alive() {
        let mut safety = MotorSafety::default();
        safety.feed(ms(0));
        assert_eq!(safety.check(ms(100)), None);
        assert_eq!(safety.check(ms(101)), Some(true));

        safety.feed(ms(120));
        assert_eq!(safety.check(ms(140)), None);
        assert_eq!(safety.check(ms(300)), Some(true));
    }

    #[test]
    fn test_disabled_never_trips() {
        let mut safety = MotorSafety::new(ms(50));
        safety.set_enabled(false);
        assert_eq!(safety.check(ms(10_000)), None);
        assert!(!safety.is_enabled());
    }

    #[test]
    fn test_set_expiration() {
        let mut safety = MotorSafety::default();
        safety.set_expiration(ms(500));
        safety.feed(ms(0));
        assert_eq!(safety.expiration(), ms(500));
        assert!(safety.is_alive(ms(400)));
    }
}
