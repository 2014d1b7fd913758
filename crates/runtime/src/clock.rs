use std::ops::{Add, Mul, Sub};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time since an arbitrary origin.
pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Wall-clock source backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemTime {
    origin: Instant,
}

impl Default for SystemTime {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for SystemTime {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-advanced source for tests and headless runs. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    nanos: Arc<AtomicU64>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, seconds: f32) {
        let step = Duration::from_secs_f32(seconds.max(0.0)).as_nanos() as u64;
        self.nanos.fetch_add(step, Ordering::SeqCst);
    }

    pub fn set(&self, seconds: f32) {
        let nanos = Duration::from_secs_f32(seconds.max(0.0)).as_nanos() as u64;
        self.nanos.store(nanos, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// One clock sample: seconds since the first sample and since the previous one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    pub elapsed: f32,
    pub delta: f32,
}

/// Elapsed-time clock sampled once per frame. The first sample starts it.
pub struct FrameClock {
    source: Box<dyn TimeSource>,
    start: Option<Duration>,
    previous: f32,
}

impl FrameClock {
    pub fn new(source: Box<dyn TimeSource>) -> Self {
        Self {
            source,
            start: None,
            previous: 0.0,
        }
    }

    pub fn system() -> Self {
        Self::new(Box::new(SystemTime::default()))
    }

    pub fn is_running(&self) -> bool {
        self.start.is_some()
    }

    pub fn sample(&mut self) -> FrameTime {
        let now = self.source.now();
        let start = *self.start.get_or_insert(now);
        let elapsed = now.saturating_sub(start).as_secs_f32();
        let delta = (elapsed - self.previous).max(0.0);
        self.previous = elapsed;
        FrameTime { elapsed, delta }
    }
}

/// One step of exponential smoothing: `value + (target - value) * factor * dt`.
pub fn smooth_towards<T>(value: T, target: T, factor: f32, dt: f32) -> T
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
{
    value + (target - value) * (factor * dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn first_sample_starts_at_zero() {
        let time = ManualTime::new();
        time.set(12.0);
        let mut clock = FrameClock::new(Box::new(time.clone()));
        assert!(!clock.is_running());
        assert_eq!(clock.sample(), FrameTime::default());
        time.advance(0.5);
        let t = clock.sample();
        assert!((t.elapsed - 0.5).abs() < 1e-6);
        assert!((t.delta - 0.5).abs() < 1e-6);
    }

    #[test]
    fn delta_is_time_since_previous_sample() {
        let time = ManualTime::new();
        let mut clock = FrameClock::new(Box::new(time.clone()));
        clock.sample();
        time.advance(0.016);
        clock.sample();
        time.advance(0.032);
        let t = clock.sample();
        assert!((t.delta - 0.032).abs() < 1e-5);
        assert!((t.elapsed - 0.048).abs() < 1e-5);
    }

    #[test]
    fn same_instant_gives_zero_delta() {
        let time = ManualTime::new();
        let mut clock = FrameClock::new(Box::new(time.clone()));
        time.advance(1.0);
        clock.sample();
        assert_eq!(clock.sample().delta, 0.0);
    }

    #[test]
    fn smoothing_converges_without_overshoot() {
        for (factor, dt) in [(5.0, 0.016), (5.0, 0.2), (1.0, 1.0), (0.5, 0.1)] {
            let target = 3.0f32;
            let mut value = -2.0f32;
            let mut gap = (target - value).abs();
            for _ in 0..200 {
                value = smooth_towards(value, target, factor, dt);
                let next = (target - value).abs();
                assert!(next <= gap, "gap grew for factor {factor} dt {dt}");
                assert!(value <= target, "overshoot for factor {factor} dt {dt}");
                gap = next;
            }
            assert!(gap < 1.0, "no convergence for factor {factor} dt {dt}");
        }
    }

    #[test]
    fn smoothing_works_on_vectors() {
        let v = smooth_towards(Vec2::ZERO, Vec2::new(1.0, -1.0), 5.0, 0.1);
        assert_eq!(v, Vec2::new(0.5, -0.5));
    }
}
