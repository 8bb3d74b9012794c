//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::domain::{MemberStatus, PackageTier};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for trees and JSON)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Tier label padded to `width`, colored by metal (Gold yellow, Premium magenta, Silver white).
pub fn tier(tier: PackageTier, width: usize) -> String {
    let padded = format!("{:<width$}", tier.label());
    match tier {
        PackageTier::Vip => padded.yellow().bold().to_string(),
        PackageTier::Premium => padded.magenta().to_string(),
        PackageTier::Basic => padded.white().to_string(),
        PackageTier::None => padded.dimmed().to_string(),
    }
}

/// Status padded to `width`; inactive members are dimmed.
pub fn status(status: MemberStatus, width: usize) -> String {
    let padded = format!("{:<width$}", status);
    match status {
        MemberStatus::Active => padded.green().to_string(),
        MemberStatus::Inactive => padded.dimmed().to_string(),
        MemberStatus::Empty => padded.dimmed().italic().to_string(),
    }
}
