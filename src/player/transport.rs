use std::time::Instant;

/// 外部音频传输：只暴露时间、时长和基本控制
pub trait Transport: Send {
    /// 当前播放时间（秒）
    fn current_time(&self) -> f64;
    /// 总时长（秒），未知时为 0
    fn duration(&self) -> f64;
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, secs: f64);
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
    fn is_playing(&self) -> bool;
    /// 播放到结尾时返回 true（每次结束只报告一次）
    fn take_ended(&mut self) -> bool;
}

/// 以系统时钟模拟播放进度的传输，不做音频解码
#[derive(Debug, Clone)]
pub struct ClockTransport {
    duration: f64,
    base: f64,
    started: Option<Instant>,
    volume: f32,
}

impl ClockTransport {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            base: 0.0,
            started: None,
            volume: 1.0,
        }
    }

    fn clamp_time(&self, secs: f64) -> f64 {
        if self.duration > 0.0 {
            secs.clamp(0.0, self.duration)
        } else {
            secs.max(0.0)
        }
    }

    pub fn position_at(&self, now: Instant) -> f64 {
        let elapsed = self
            .started
            .map_or(0.0, |at| now.saturating_duration_since(at).as_secs_f64());
        self.clamp_time(self.base + elapsed)
    }

    pub fn play_at(&mut self, now: Instant) {
        if self.started.is_some() {
            return;
        }
        // 已播完时从头开始
        if self.duration > 0.0 && self.base >= self.duration {
            self.base = 0.0;
        }
        self.started = Some(now);
    }

    pub fn pause_at(&mut self, now: Instant) {
        self.base = self.position_at(now);
        self.started = None;
    }

    pub fn seek_at(&mut self, secs: f64, now: Instant) {
        self.base = self.clamp_time(secs);
        if self.started.is_some() {
            self.started = Some(now);
        }
    }

    pub fn take_ended_at(&mut self, now: Instant) -> bool {
        if self.started.is_none() || self.duration <= 0.0 {
            return false;
        }
        if self.position_at(now) >= self.duration {
            self.base = self.duration;
            self.started = None;
            return true;
        }
        false
    }
}

impl Transport for ClockTransport {
    fn current_time(&self) -> f64 {
        self.position_at(Instant::now())
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn play(&mut self) {
        self.play_at(Instant::now());
    }

    fn pause(&mut self) {
        self.pause_at(Instant::now());
    }

    fn seek(&mut self, secs: f64) {
        self.seek_at(secs, Instant::now());
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn is_playing(&self) -> bool {
        self.started.is_some()
    }

    fn take_ended(&mut self) -> bool {
        self.take_ended_at(Instant::now())
    }
}
