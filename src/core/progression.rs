//! Experience thresholds and level lookups.

/// XP required to reach each level; index 0 is level 1.
pub const STANDARD_XP_THRESHOLDS: [u32; 20] = [
    0, 300, 900, 2_700, 6_500, 14_000, 23_000, 34_000, 48_000, 64_000, 85_000, 100_000,
    120_000, 140_000, 165_000, 195_000, 225_000, 265_000, 305_000, 355_000,
];

/// Highest level whose threshold is at or below `xp`, against `thresholds`.
pub fn level_in(thresholds: &[u32], xp: u32) -> u32 {
    let reached = thresholds.iter().take_while(|&&t| t <= xp).count();
    reached.max(1) as u32
}

/// Threshold of the level after the one `xp` sits in, or `None` at the top.
pub fn next_threshold_in(thresholds: &[u32], xp: u32) -> Option<u32> {
    let level = level_in(thresholds, xp) as usize;
    thresholds.get(level).copied()
}

/// Fraction of the way from the current level's threshold to the next,
/// clamped to `[0, 1]`. Returns 1 at or beyond the last tabulated level.
pub fn progress_in(thresholds: &[u32], xp: u32) -> f64 {
    let level = level_in(thresholds, xp) as usize;
    let current = thresholds.get(level - 1).copied().unwrap_or(0);
    match thresholds.get(level) {
        Some(&next) if next > current => {
            let progress = f64::from(xp.saturating_sub(current)) / f64::from(next - current);
            progress.clamp(0.0, 1.0)
        }
        _ => 1.0,
    }
}

/// Level for `xp` on the standard table.
pub fn get_level(xp: u32) -> u32 {
    level_in(&STANDARD_XP_THRESHOLDS, xp)
}

/// XP needed for the next level on the standard table.
pub fn xp_for_next_level(xp: u32) -> Option<u32> {
    next_threshold_in(&STANDARD_XP_THRESHOLDS, xp)
}

/// Progress toward the next level on the standard table.
pub fn get_xp_progress(xp: u32) -> f64 {
    progress_in(&STANDARD_XP_THRESHOLDS, xp)
}
