//! Line-oriented console diagnostics.
//!
//! Normal lines go through `info!`, verbose lines through `debug!`. The
//! verbosity switch picks the default filter; `RUST_LOG` overrides it.

use anstyle::{AnsiColor, Color, Style};
use tracing_subscriber::EnvFilter;

const PALETTE: [AnsiColor; 6] = [
    AnsiColor::Red,
    AnsiColor::Green,
    AnsiColor::Yellow,
    AnsiColor::Blue,
    AnsiColor::Magenta,
    AnsiColor::Cyan,
];

/// Install the stdout subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false)
        .without_time()
        .with_level(false)
        .try_init();
}

pub fn bold(text: &str) -> String {
    let style = Style::new().bold();
    format!("{}{text}{}", style.render(), style.render_reset())
}

pub fn paint(text: &str, color: AnsiColor) -> String {
    let style = Style::new().fg_color(Some(Color::Ansi(color)));
    format!("{}{text}{}", style.render(), style.render_reset())
}

/// Deterministic display color for a system key.
pub fn color_for(key: &str) -> AnsiColor {
    let sum = key.bytes().fold(0usize, |acc, b| acc.wrapping_add(b as usize));
    PALETTE[sum % PALETTE.len()]
}
