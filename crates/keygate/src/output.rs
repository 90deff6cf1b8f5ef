//! Terminal output helpers
//!
//! Status lines go to stdout except errors and warnings, which go to stderr
//! so `--json` output stays parseable.

use console::{style, StyledObject};
use keygate_core::AuthorizationLevel;

pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Underlined section title preceded by a blank line
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Indented, dimmed label with its value
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Level name colored by how much it grants
pub fn level(level: AuthorizationLevel) -> StyledObject<&'static str> {
    let styled = style(level.as_str()).bold();
    match level {
        AuthorizationLevel::Anonymous => styled.dim(),
        AuthorizationLevel::Function => styled.cyan(),
        AuthorizationLevel::System => styled.yellow(),
        AuthorizationLevel::Admin => styled.red(),
    }
}
