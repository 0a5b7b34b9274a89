use std::thread;
use std::time::{Duration, Instant, SystemTime};

pub const DEFAULT_VSYNC_HZ: u32 = 120;

/// Delta-time watch. Every call to [`DtWatch::dt`] consumes the interval since
/// the previous call (or since [`DtWatch::start`]).
#[derive(Debug, Clone)]
pub struct DtWatch {
    started_at: Instant,
    started_wall: SystemTime,
    last_poll: Instant,
}

impl Default for DtWatch {
    fn default() -> Self {
        Self::new()
    }
}

impl DtWatch {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            started_at: now,
            started_wall: SystemTime::now(),
            last_poll: now,
        }
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now(), SystemTime::now());
    }

    pub(crate) fn start_at(&mut self, now: Instant, wall: SystemTime) {
        self.started_at = now;
        self.started_wall = wall;
        self.last_poll = now;
    }

    /// Seconds elapsed since the previous poll.
    pub fn dt(&mut self) -> f64 {
        self.dt_at(Instant::now())
    }

    pub(crate) fn dt_at(&mut self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.last_poll);
        self.last_poll = self.last_poll.max(now);
        elapsed.as_secs_f64()
    }

    pub fn time_started(&self) -> SystemTime {
        self.started_wall
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

/// Periodic tick source on a fixed grid. Missed ticks collapse into one, so a
/// slow consumer observes at most one pending tick.
#[derive(Debug, Clone)]
pub(crate) struct Ticker {
    period: Duration,
    next_tick: Instant,
}

impl Ticker {
    pub(crate) fn new(period: Duration, now: Instant) -> Self {
        let period = if period.is_zero() {
            Duration::from_nanos(1)
        } else {
            period
        };
        Self {
            period,
            next_tick: now + period,
        }
    }

    pub(crate) fn period(&self) -> Duration {
        self.period
    }

    /// Returns true when a tick is pending at `now` and consumes it.
    pub(crate) fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_tick {
            return false;
        }
        let behind = now.saturating_duration_since(self.next_tick).as_nanos();
        let skipped = behind / self.period.as_nanos().max(1);
        let advance_nanos = self.period.as_nanos().saturating_mul(skipped + 1);
        self.next_tick += Duration::from_nanos(u64::try_from(advance_nanos).unwrap_or(u64::MAX));
        true
    }

    pub(crate) fn until_next(&self, now: Instant) -> Duration {
        self.next_tick.saturating_duration_since(now)
    }
}

/// Caps the frame cadence by blocking until the next tick of a fixed-rate grid.
#[derive(Debug, Clone)]
pub struct VsyncPacer {
    ticker: Ticker,
}

impl VsyncPacer {
    pub fn new(hz: u32) -> Self {
        Self {
            ticker: Ticker::new(frame_period(hz), Instant::now()),
        }
    }

    pub fn restart(&mut self) {
        self.ticker = Ticker::new(self.ticker.period(), Instant::now());
    }

    pub fn period(&self) -> Duration {
        self.ticker.period()
    }

    /// Blocks until the next tick. Returns immediately if a tick was missed.
    pub fn wait(&mut self) {
        loop {
            let now = Instant::now();
            if self.ticker.poll(now) {
                return;
            }
            thread::sleep(self.ticker.until_next(now));
        }
    }
}

fn frame_period(hz: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(hz.max(1)))
}
