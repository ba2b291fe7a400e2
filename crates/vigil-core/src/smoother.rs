use std::collections::VecDeque;

/// Number of raw samples averaged when no window is configured
pub const DEFAULT_SMOOTHING_WINDOW: usize = 10;

/// Moving-average filter over the most recent raw attention samples
///
/// Damps frame-to-frame noise from the perception backend. The window is a
/// fixed-capacity FIFO: once full, every new sample evicts the oldest.
#[derive(Debug, Clone)]
pub struct SignalSmoother {
    window: VecDeque<f64>,
    capacity: usize,
}

impl SignalSmoother {
    /// Create a smoother averaging over the last `capacity` samples
    ///
    /// A zero capacity is bumped to one so there is always a sample to average.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a raw score and return the mean of the current window
    ///
    /// Out-of-range input is clamped into `[0, 1]`; NaN counts as zero.
    pub fn update(&mut self, raw: f64) -> f64 {
        let sample = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) };
        if !(0.0..=1.0).contains(&raw) {
            log::warn!("Raw attention {raw} outside [0, 1], clamped to {sample}");
        }

        self.window.push_back(sample);
        while self.window.len() > self.capacity {
            self.window.pop_front();
        }

        self.current()
    }

    /// Drop every held sample
    pub fn reset(&mut self) {
        self.window.clear();
    }

    /// Mean of the samples currently held, 0.0 before the first update
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn current(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SignalSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_WINDOW)
    }
}
