use std::time::{Duration, Instant};

/// 可取消的单次定时任务
///
/// 同一时刻最多只有一个待触发的截止时间，重新调度会替换掉旧的任务。
#[derive(Debug, Default, Clone)]
pub struct ScheduledTask {
    deadline: Option<Instant>,
}

impl ScheduledTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取消旧任务并在 `at` 重新调度
    pub fn schedule(&mut self, at: Instant) {
        self.deadline = Some(at);
    }

    /// 取消待触发的任务，返回之前是否存在
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// 到期则触发（清除截止时间）并返回 true，每次调度最多触发一次
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(at) if now >= at => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// 固定间隔的轮询器
#[derive(Debug, Clone)]
pub struct PollInterval {
    period: Duration,
    next: Option<Instant>,
}

impl PollInterval {
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// 启动（或重启）轮询，第一次在一个周期后到期
    pub fn start(&mut self, now: Instant) {
        self.next = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next = None;
    }

    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    /// 是否到期；错过的周期合并为一次
    pub fn due(&mut self, now: Instant) -> bool {
        let Some(next) = self.next else {
            return false;
        };
        if now < next {
            return false;
        }

        let mut upcoming = next + self.period;
        while upcoming <= now {
            upcoming += self.period;
        }
        self.next = Some(upcoming);
        true
    }
}
