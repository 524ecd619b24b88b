use std::time::Instant;

/// Monotonic clock feeding the `iTime` uniform.
///
/// The origin is fixed at construction and survives shader reloads — a
/// hot-swap must not restart the animation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameClock {
    origin: Instant,
}

impl FrameClock {
    /// Creates a clock whose zero point is `Instant::now()`.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Seconds elapsed since the clock was created.
    pub fn seconds(&self) -> f32 {
        self.origin.elapsed().as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_never_run_backwards() {
        let clock = FrameClock::new();
        let first = clock.seconds();
        let second = clock.seconds();
        assert!(second >= first);
    }

    #[test]
    fn a_fresh_clock_starts_at_its_origin() {
        let clock = FrameClock::new();
        assert!(clock.seconds() < 1.0);
    }
}
