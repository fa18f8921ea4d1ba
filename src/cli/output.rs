//! CLI output formatting

use crate::{
    core::StepState,
    repo::{CacheEntry, CostRow},
    wizard::{RenderEvent, StepSnapshot},
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Lines of step output shown without `--full`
pub const PREVIEW_LINES: usize = 12;

/// Create a spinner for in-flight requests
pub fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
        spinner.set_style(template);
    }
    spinner
}

/// Start the spinner for one request
pub fn start_spinner(spinner: &ProgressBar, message: String) {
    spinner.reset_elapsed();
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
}

/// Format a step state for display
pub fn format_step_state(state: &StepState) -> String {
    match state {
        StepState::Waiting => style("WAITING").dim().to_string(),
        StepState::Ready => style("READY").cyan().to_string(),
        StepState::Loading => style("LOADING").yellow().to_string(),
        StepState::Completed => style("COMPLETED").green().to_string(),
        StepState::Failed => style("FAILED").red().to_string(),
    }
}

/// Format a render event; loading transitions are shown by the spinner instead
pub fn format_render_event(event: &RenderEvent, max_lines: Option<usize>) -> Option<String> {
    match event {
        RenderEvent::StateChanged { state: StepState::Loading, .. } => None,
        RenderEvent::StateChanged { step_id, state } => Some(format!(
            "  {} {} {}",
            style("→").dim(),
            style(step_id).dim(),
            format_step_state(state)
        )),
        RenderEvent::Rendered {
            step_id,
            label,
            content,
            prompt,
        } => {
            let body = match max_lines {
                Some(lines) => format_output(content, lines),
                None => content.clone(),
            };
            Some(format!(
                "{} {} {}\n{}\n{}",
                CHECK,
                style(label).green().bold(),
                style(format!("({}, prompt {} chars)", step_id, prompt.chars().count())).dim(),
                body,
                style("─".repeat(40)).dim()
            ))
        }
        RenderEvent::Notify { step_id, message } => Some(format!(
            "{} {}: {}",
            CROSS,
            style(step_id).red(),
            style(message).red()
        )),
        RenderEvent::Cleared { pipeline, placeholder } => Some(format!(
            "{} {} cleared: {}",
            INFO,
            style(pipeline).bold(),
            style(placeholder).dim().italic()
        )),
    }
}

/// One line of the final run summary
pub fn format_step_summary(step: &StepSnapshot) -> String {
    let icon = match step.state {
        StepState::Completed => CHECK,
        StepState::Failed => CROSS,
        StepState::Loading => SPINNER,
        _ => INFO,
    };
    let mut line = format!(
        "{} {} - {}",
        icon,
        style(&step.label).bold(),
        format_step_state(&step.state)
    );
    if step.stale {
        line.push_str(&format!(" {}", style("(stale)").yellow()));
    }
    if step.attempts > 1 {
        line.push_str(&format!(" {}", style(format!("{} attempts", step.attempts)).dim()));
    }
    if let Some(error) = &step.last_error {
        line.push_str(&format!(": {}", style(error).dim()));
    }
    line
}

/// Format one cost table row
pub fn format_cost_row(row: &CostRow) -> String {
    format!(
        "  {:<16} creation ${:.6}  storage ${:.6}  input ${:.6}  output ${:.6}  total ${:.6}  cumulative {}",
        row.analysis.display_name(),
        row.cost.cache_creation,
        row.cost.storage,
        row.cost.input,
        row.cost.output,
        row.cost.total,
        style(format!("${:.6}", row.cumulative)).cyan()
    )
}

/// Format one cache table row
pub fn format_cache_entry(entry: &CacheEntry) -> String {
    format!(
        "  {} {} created {} expires {}",
        style(entry.short_name()).bold(),
        style(entry.short_model()).cyan(),
        style(entry.create_time.as_deref().unwrap_or("N/A")).dim(),
        style(entry.expire_time.as_deref().unwrap_or("N/A")).dim()
    )
}

/// Format step output with truncation
pub fn format_output(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();

    if lines.len() <= max_lines {
        output.to_string()
    } else {
        let truncated = lines[..max_lines].join("\n");
        format!(
            "{}\n{}... ({} more lines)",
            truncated,
            style("[truncated]").dim(),
            lines.len() - max_lines
        )
    }
}
