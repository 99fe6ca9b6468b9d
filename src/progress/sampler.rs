use std::collections::VecDeque;

/// Sliding-window moving average of throughput samples.
///
/// Holds at most `capacity` samples; once full, each new sample evicts the
/// oldest. Used to smooth the instantaneous speed between report ticks,
/// which jumps around with I/O scheduling and page-cache effects.
///
/// # Examples
///
/// ```
/// use torkit::progress::Sampler;
///
/// let mut sampler = Sampler::new(3);
/// assert_eq!(sampler.average(), 0);
///
/// for sample in [10, 20, 30, 40] {
///     sampler.add_sample(sample);
/// }
/// assert_eq!(sampler.iter().collect::<Vec<_>>(), vec![20, 30, 40]);
/// assert_eq!(sampler.average(), 30);
/// ```
#[derive(Debug, Clone)]
pub struct Sampler {
    samples: VecDeque<i64>,
    capacity: usize,
}

impl Sampler {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, evicting the oldest one if the window is full.
    pub fn add_sample(&mut self, sample: i64) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Truncating mean of the current window, or 0 when empty.
    pub fn average(&self) -> i64 {
        if self.samples.is_empty() {
            return 0;
        }
        let sum: i128 = self.samples.iter().map(|&s| s as i128).sum();
        (sum / self.samples.len() as i128) as i64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.samples.iter().copied()
    }
}
