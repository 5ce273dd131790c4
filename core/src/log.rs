//! Logging utilities
//!
//! Thin wrappers over the `log` facade. Nothing is printed unless the host
//! installs a logger.

#![allow(unused)]

const TARGET: &str = "hexlords";

/// Log an info message
#[inline(always)]
pub fn info(msg: &str) {
    ::log::info!(target: TARGET, "{}", msg);
}

/// Log a warning message
#[inline(always)]
pub fn warn(msg: &str) {
    ::log::warn!(target: TARGET, "{}", msg);
}

/// Log a debug message with a label
#[inline(always)]
pub fn debug(label: &str, msg: &str) {
    ::log::debug!(target: TARGET, "[{}] {}", label, msg);
}

/// Log an action being performed
#[inline(always)]
pub fn action(name: &str, details: &str) {
    ::log::debug!(target: TARGET, "action {}: {}", name, details);
}

/// Log a finished battle
#[inline(always)]
pub fn battle_summary(hex: &str, rounds: u32, reason: &str, winner: Option<u32>) {
    match winner {
        Some(player) => ::log::info!(
            target: TARGET,
            "battle at {} ended after {} rounds ({}), winner player {}",
            hex,
            rounds,
            reason,
            player
        ),
        None => ::log::info!(
            target: TARGET,
            "battle at {} ended after {} rounds ({}), no winner",
            hex,
            rounds,
            reason
        ),
    }
}
