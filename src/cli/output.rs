//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::sync::atomic::{AtomicUsize, Ordering};

use colored::Colorize;

use crate::domain::{EventLevel, PipelineEvent};
use crate::infrastructure::traits::EventSink;

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

/// Print failure status (red X, indented)
pub fn failure(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "✗".red(), msg);
}

/// Print success status indented (green checkmark with leading spaces)
pub fn success_detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "✓".green(), msg);
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

/// Print a labelled value, label padded to `width`
pub fn field(label: &str, value: &(impl std::fmt::Display + ?Sized), width: usize) {
    println!("  {:<width$} {}", format!("{label}:").dimmed(), value);
}

/// Print plain output (no color, for data statements)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Short notification on stderr, coloured by level
pub fn toast(level: EventLevel, msg: &(impl std::fmt::Display + ?Sized)) {
    let badge = match level {
        EventLevel::Info => " INFO ".on_blue().white(),
        EventLevel::Success => " OK ".on_green().black(),
        EventLevel::Warning => " WARN ".on_yellow().black(),
        EventLevel::Error => " ERROR ".on_red().white(),
    };
    eprintln!("{} {}", badge, msg);
}

const BAR_WIDTH: usize = 20;

fn progress_bar(done: usize, total: usize) -> String {
    let total = total.max(1);
    let done = done.min(total);
    let filled = done * BAR_WIDTH / total;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        done * 100 / total
    )
}

/// Prints the training log with timestamps and a step progress bar.
///
/// Every success event marks one finished step.
pub struct ConsoleEventSink {
    total_steps: usize,
    completed: AtomicUsize,
}

impl ConsoleEventSink {
    pub fn new(total_steps: usize) -> Self {
        Self {
            total_steps,
            completed: AtomicUsize::new(0),
        }
    }
}

impl EventSink for ConsoleEventSink {
    fn emit(&self, event: &PipelineEvent) {
        let time = event.timestamp.format("%H:%M:%S").to_string().dimmed();
        let message = match event.level {
            EventLevel::Info => event.message.normal(),
            EventLevel::Success => event.message.green(),
            EventLevel::Warning => event.message.yellow(),
            EventLevel::Error => event.message.red(),
        };
        eprintln!("[{}] {}", time, message);

        if event.level == EventLevel::Success {
            let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
            if done <= self.total_steps {
                eprintln!("  {}", progress_bar(done, self.total_steps).cyan());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_half_done_when_rendering_progress_then_half_filled() {
        assert_eq!(progress_bar(2, 4), format!("[{}{}]  50%", "#".repeat(10), "-".repeat(10)));
        assert!(progress_bar(4, 4).ends_with("100%"));
        assert!(progress_bar(0, 0).ends_with("  0%"));
    }
}
