use crate::output::is_quiet;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::SYRINGE, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    if is_quiet() {
        return;
    }
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn dim(text: &str) -> String {
    text.style(theme().dim.clone()).to_string()
}

pub fn muted(text: &str) -> String {
    text.style(theme().muted.clone()).to_string()
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}

/// Risk label colored by severity
pub fn risk_badge(risk: Option<&str>) -> String {
    let label = risk.unwrap_or("Unknown");
    label.style(theme().risk(label)).to_string()
}

pub fn evidence_badge(level: Option<&str>) -> String {
    match level {
        Some("High") => "High".style(theme().strong_evidence.clone()).to_string(),
        Some(other) => other.to_string(),
        None => muted("N/A"),
    }
}

pub fn free_badge() -> String {
    format!("{} {}", Icons::STAR, "Free".style(theme().free.clone()))
}

pub fn locked(text: &str) {
    println!("{} {}", Icons::LOCK, text.style(theme().locked.clone()));
}
