use std::fmt;
use std::time::Duration;

/// Accumulates wall time under string tags.
/// # Usage
/// The collector is an explicit value. Hand it to the code being timed, then
/// merge the collectors of independent runs.
/// ```rust
/// use std::time::Duration;
/// use fciqmc::profiler::Profiler;
/// let mut prof = Profiler::new();
/// prof.add_timing("spawning", Duration::from_millis(3));
/// prof.add_timing("spawning", Duration::from_millis(2));
/// assert_eq!(prof.get("spawning"), Some(Duration::from_millis(5)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profiler {
    // First insertion order.
    timings: Vec<(String, Duration)>,
}

impl Profiler {
    pub fn new() -> Self {
        Profiler::default()
    }

    /// Adds `elapsed` to the total of `tag`.
    pub fn add_timing(&mut self, tag: &str, elapsed: Duration) {
        match self.timings.iter_mut().find(|(t, _)| t == tag) {
            Some((_, total)) => *total += elapsed,
            None => self.timings.push((tag.to_owned(), elapsed)),
        }
    }

    pub fn get(&self, tag: &str) -> Option<Duration> {
        self.timings.iter().find(|(t, _)| t == tag).map(|(_, d)| *d)
    }

    /// Adds every timing of `other` into `self`.
    pub fn merge(&mut self, other: &Profiler) {
        for (tag, elapsed) in other.timings.iter() {
            self.add_timing(tag, *elapsed);
        }
    }

    pub fn total(&self) -> Duration {
        self.timings.iter().map(|(_, d)| *d).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.timings.is_empty()
    }
}

impl fmt::Display for Profiler {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let total = self.total().as_secs_f64();
        writeln!(f, "Overview of timings")?;
        writeln!(f, "{:<24} {:>14} {:>8}", "Tag", "Time (s)", "%")?;
        for (tag, elapsed) in self.timings.iter() {
            let secs = elapsed.as_secs_f64();
            let share = if total > 0.0 { 100.0 * secs / total } else { 0.0 };
            writeln!(f, "{:<24} {:>14.6} {:>8.2}", tag, secs, share)?;
        }
        write!(f, "{:<24} {:>14.6} {:>8.2}", "Total", total, 100.0)
    }
}
