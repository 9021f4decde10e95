use std::sync::atomic::{AtomicBool, Ordering};

pub const DEBUG_ENV_VAR: &str = "AUTOFINDER_DEBUG";

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

pub fn set_debug(enabled: bool) {
    DEBUG_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Enables debug output if the flag was given or `AUTOFINDER_DEBUG` is truthy.
pub fn init_debug(flag: bool) -> bool {
    let from_env = std::env::var(DEBUG_ENV_VAR)
        .map(|v| env_value_enabled(&v))
        .unwrap_or(false);
    let enabled = flag || from_env;
    set_debug(enabled);
    enabled
}

fn env_value_enabled(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[macro_export]
macro_rules! debug_println {
    ($($arg:tt)*) => {
        if $crate::debug::is_debug_enabled() {
            println!("[debug] {}", format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! debug_eprintln {
    ($($arg:tt)*) => {
        if $crate::debug::is_debug_enabled() {
            eprintln!("[debug] {}", format!($($arg)*));
        }
    };
}
