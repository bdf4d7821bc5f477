//! Console output for datapass: styled log lines and the step progress bar.
//!
//! Every user-visible line goes through a [`Console`]. The stdout console
//! prints with `console` styles; the capturing console records lines in
//! memory instead, which is what tests assert against.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::orchestrator::Snapshot;

/// Sink for the log lines produced by a run.
#[derive(Clone)]
pub struct Console {
    // Recorded lines when capturing; `None` prints to the terminal.
    capture: Option<Arc<Mutex<Vec<String>>>>,
    green: Style,
    red: Style,
    cyan: Style,
}

impl Console {
    /// Console that writes to stdout and stderr.
    pub fn stdout() -> Self {
        Self {
            capture: None,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            cyan: Style::new().cyan(),
        }
    }

    /// Console that records every line instead of printing it.
    pub fn capturing() -> Self {
        Self {
            capture: Some(Arc::new(Mutex::new(Vec::new()))),
            ..Self::stdout()
        }
    }

    /// Lines recorded so far. Always empty for the stdout console.
    pub fn lines(&self) -> Vec<String> {
        match &self.capture {
            Some(lines) => lines.lock().unwrap_or_else(|e| e.into_inner()).clone(),
            None => Vec::new(),
        }
    }

    fn record(&self, line: &str) -> bool {
        match &self.capture {
            Some(lines) => {
                lines
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(line.to_string());
                true
            }
            None => false,
        }
    }

    /// Plain informational line.
    pub fn log(&self, line: impl AsRef<str>) {
        let line = line.as_ref();
        if !self.record(line) {
            println!("{line}");
        }
    }

    /// Highlighted line for results worth noticing.
    pub fn success(&self, line: impl AsRef<str>) {
        let line = line.as_ref();
        if !self.record(line) {
            println!("{}", self.green.apply_to(line));
        }
    }

    /// Error line, written to stderr.
    pub fn error(&self, line: impl AsRef<str>) {
        let line = line.as_ref();
        if !self.record(line) {
            eprintln!("{}", self.red.apply_to(line));
        }
    }

    /// Prints the consolidated results of a run as pretty JSON.
    pub fn print_snapshot(&self, snapshot: &Snapshot) {
        let json = serde_json::to_string_pretty(snapshot).unwrap_or_default();
        if self.record("Final Results:") {
            self.record(&json);
            return;
        }
        println!("{}", self.cyan.apply_to("Final Results:"));
        println!("{json}");
    }

    /// Starts a progress bar tracking `total` sequential steps.
    pub fn step_progress(&self, total: u64) -> StepProgress {
        let pb = if self.capture.is_some() {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(total)
        };
        let template = "{spinner:.cyan} [{bar:20}] {pos}/{len} {msg}";
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));

        StepProgress {
            pb,
            console: self.clone(),
        }
    }
}

/// Visual progress for the step sequencer.
///
/// Step names always go through the console, so they land on stdout (or in
/// the capture) whether or not the bar is drawn.
pub struct StepProgress {
    pb: ProgressBar,
    console: Console,
}

impl StepProgress {
    /// Shows the step that is currently waiting.
    pub fn waiting_on(&self, name: &str) {
        self.pb.set_message(format!("waiting on {name}"));
    }

    /// Logs a finished step and advances the bar.
    pub fn step_done(&self, name: &str) {
        self.pb.suspend(|| self.console.log(name));
        self.pb.inc(1);
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;

    #[test]
    fn capturing_console_records_all_levels() {
        let console = Console::capturing();
        console.log("one");
        console.success("two");
        console.error("three");
        assert_eq!(console.lines(), vec!["one", "two", "three"]);
    }

    #[test]
    fn clones_share_the_capture() {
        let console = Console::capturing();
        let other = console.clone();
        other.log("from clone");
        assert_eq!(console.lines(), vec!["from clone"]);
    }

    #[test]
    fn stdout_console_records_nothing() {
        let console = Console::stdout();
        console.log("visible on stdout");
        assert!(console.lines().is_empty());
    }

    #[test]
    fn hidden_progress_logs_step_names() {
        let console = Console::capturing();
        let progress = console.step_progress(2);
        progress.waiting_on("a");
        progress.step_done("a");
        progress.step_done("b");
        progress.finish();
        assert_eq!(console.lines(), vec!["a", "b"]);
    }

    #[test]
    fn drawn_progress_still_logs_step_names() {
        let console = Console::capturing();
        let progress = StepProgress {
            pb: ProgressBar::with_draw_target(Some(2), ProgressDrawTarget::stderr()),
            console: console.clone(),
        };
        progress.step_done("first");
        progress.step_done("second");
        progress.finish();
        assert_eq!(console.lines(), vec!["first", "second"]);
    }
}
