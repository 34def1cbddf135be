use std::time::Duration;
use tokio::time::{sleep, Instant};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_POLL_TICK: Duration = Duration::from_secs(60);

/// 扫描节奏：每次扫描完成后间隔 `interval` 再次到期，空闲时每 `poll_tick` 检查一次
#[derive(Debug, Clone)]
pub struct Schedule {
    interval: Duration,
    poll_tick: Duration,
    next_run: Instant,
}

impl Schedule {
    pub fn new(interval: Duration, poll_tick: Duration, run_immediately: bool) -> Self {
        Self::starting_at(Instant::now(), interval, poll_tick, run_immediately)
    }

    pub fn starting_at(now: Instant, interval: Duration, poll_tick: Duration, run_immediately: bool) -> Self {
        let next_run = if run_immediately { now } else { now + interval };
        Self {
            interval,
            poll_tick,
            next_run,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_run(&self) -> Instant {
        self.next_run
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_run
    }

    /// 一轮扫描结束，下一次在 `now + interval` 到期
    pub fn mark_completed(&mut self, now: Instant) {
        self.next_run = now + self.interval;
    }

    /// 按 `poll_tick` 轮询，直到到期
    pub async fn wait_until_due(&self) {
        loop {
            let now = Instant::now();
            if self.is_due(now) {
                return;
            }
            let remaining = self.next_run - now;
            sleep(self.poll_tick.min(remaining)).await;
        }
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL, DEFAULT_POLL_TICK, true)
    }
}
