//! CPU budget to worker count.

/// Percent is divided by this rather than 100 so that "100%" still leaves
/// a slice of the machine for the presentation thread.
pub const HEADROOM_DIVISOR: u64 = 125;

/// `max(1, floor(cores * cpu_percent / 125))`
pub fn worker_count(cores: usize, cpu_percent: u32) -> usize {
    let workers = (cores as u64 * cpu_percent as u64) / HEADROOM_DIVISOR;
    (workers as usize).max(1)
}

/// Logical cores on this machine, or 1 if that cannot be determined
pub fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
