//! 秒表
//!
//! 基于注入的 [`Clock`]，测试中可使用手动时钟精确控制经过时间。

use std::sync::Arc;
use std::time::Duration;

use romi_hal::Clock;

/// 秒表
///
/// - `reset()`：累计时间清零；若正在运行，从当前时刻重新计时
/// - `start()`：开始计时（已运行时无效）
/// - `stop()`：暂停并保留累计时间
pub struct Timer {
    clock: Arc<dyn Clock>,
    start_time: Duration,
    accumulated: Duration,
    running: bool,
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("elapsed", &self.elapsed())
            .field("running", &self.running)
            .finish()
    }
}

impl Timer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let start_time = clock.now();
        Self {
            clock,
            start_time,
            accumulated: Duration::ZERO,
            running: false,
        }
    }

    /// 经过时间
    pub fn elapsed(&self) -> Duration {
        if self.running {
            self.accumulated + self.clock.now().saturating_sub(self.start_time)
        } else {
            self.accumulated
        }
    }

    /// 经过时间（秒）
    pub fn get(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.start_time = self.clock.now();
    }

    pub fn start(&mut self) {
        if !self.running {
            self.start_time = self.clock.now();
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        self.accumulated = self.elapsed();
        self.running = false;
    }

    /// 清零并开始
    pub fn restart(&mut self) {
        self.reset();
        self.start();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_elapsed(&self, seconds: f64) -> bool {
        self.get() >= seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use romi_hal::ManualClock;

    fn timer() -> (ManualClock, Timer) {
        let clock = ManualClock::new();
        let timer = Timer::new(Arc::new(clock.clone()));
        (clock, timer)
    }

    #[test]
    fn test_not_running_by_default() {
        let (clock, timer) = timer();
        clock.advance(Duration::from_secs(5));
        assert_eq!(timer.get(), 0.0);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_reset_and_start() {
        let (clock, mut timer) = timer();
        clock.advance(Duration::from_secs(10));

        timer.reset();
        timer.start();
        clock.advance(Duration::from_millis(1500));
        assert!((timer.get() - 1.5).abs() < 1e-9);
        assert!(!timer.has_elapsed(2.0));

        clock.advance(Duration::from_millis(500));
        assert!(timer.has_elapsed(2.0));
    }

    #[test]
    fn test_reset_while_running_restarts_from_now() {
        let (clock, mut timer) = timer();
        timer.start();
        clock.advance(Duration::from_secs(3));

        timer.reset();
        assert_eq!(timer.get(), 0.0);
        assert!(timer.is_running());

        clock.advance(Duration::from_secs(1));
        assert!((timer.get() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_stop_keeps_accumulated() {
        let (clock, mut timer) = timer();
        timer.start();
        clock.advance(Duration::from_secs(2));
        timer.stop();
        clock.advance(Duration::from_secs(5));
        assert!((timer.get() - 2.0).abs() < 1e-9);

        // 再次启动后继续累计
        timer.start();
        clock.advance(Duration::from_secs(1));
        assert!((timer.get() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_start_twice_is_noop() {
        let (clock, mut timer) = timer();
        timer.start();
        clock.advance(Duration::from_secs(1));
        timer.start();
        clock.advance(Duration::from_secs(1));
        assert!((timer.get() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_elapsed_monotonic_between_resets() {
        let (clock, mut timer) = timer();
        timer.restart();
        let mut last = timer.elapsed();
        for _ in 0..100 {
            clock.advance(Duration::from_millis(20));
            let now = timer.elapsed();
            assert!(now >= last);
            last = now;
        }
    }
}
