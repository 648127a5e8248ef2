//! Build metadata embedded by `build.rs`

/// Incremented by `build.rs` whenever `src/` changes; 0 when built without it
pub const BUILD_NUMBER: u64 = match option_env!("DEALMAIL_BUILD_NUMBER") {
    Some(s) => match parse_build_number(s) {
        Some(n) => n,
        None => 0,
    },
    None => 0,
};

pub const BUILD_TIMESTAMP: &str = match option_env!("DEALMAIL_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

const fn parse_build_number(s: &str) -> Option<u64> {
    let digits = s.as_bytes();
    if digits.is_empty() {
        return None;
    }
    let mut n: u64 = 0;
    let mut i = 0;
    while i < digits.len() {
        if !digits[i].is_ascii_digit() {
            return None;
        }
        n = n * 10 + (digits[i] - b'0') as u64;
        i += 1;
    }
    Some(n)
}

/// One-line identification for a tool, e.g. `Weekly Deals (dealmail 1.0.0, build 12, 2025-09-01T08:00:00Z)`
pub fn banner(tool: &str) -> String {
    format!(
        "{} ({} {}, build {}, {})",
        tool,
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        BUILD_NUMBER,
        BUILD_TIMESTAMP
    )
}

/// Print [`banner`] to stderr so stdout stays clean for tool output
pub fn print_startup_banner(tool: &str) {
    eprintln!("{}", banner(tool));
}
