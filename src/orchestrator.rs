use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{Local, Utc};
use serde::Serialize;
use tokio::time::sleep;

use crate::config::DatapassConfig;
use crate::env::PageContext;
use crate::loader::DataLoader;
use crate::numeric::{
    format_number, serialize_number, serialize_numbers, sort_array_ascending, square_and_filter,
    sum_slice,
};
use crate::sequencer::StepSequencer;
use crate::ui::Console;
use crate::user::{get_user_data, sample_users};

/// Multiplier applied to the dataset sum.
pub const ARRAY_SUM_MULTIPLIER: f64 = 4.0;

/// Value the timed wait resolves to.
pub const PROMISE_VALUE: u32 = 42;

/// Called once every step has finished. An error is logged, never rethrown.
pub type StepsCallback = Box<dyn Fn(&Console) -> Result<()> + Send + Sync>;

/// The three filtered-square sequences computed from fixed pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Processed {
    #[serde(serialize_with = "serialize_numbers")]
    pub x: Vec<f64>,
    #[serde(serialize_with = "serialize_numbers")]
    pub y: Vec<f64>,
    #[serde(serialize_with = "serialize_numbers")]
    pub z: Vec<f64>,
}

/// Consolidated results of one run, logged as `Final Results:`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(serialize_with = "serialize_number")]
    pub temp_value: f64,
    #[serde(serialize_with = "serialize_numbers")]
    pub sorted_array: Vec<f64>,
    #[serde(serialize_with = "serialize_numbers")]
    pub original_data: Vec<f64>,
    pub processed: Processed,
    pub formatted_users: Vec<String>,
    pub current_path: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub data_file_path: String,
}

/// Resolves to `value` after `delay`.
pub async fn resolve_after<T>(delay: Duration, value: T) -> T {
    sleep(delay).await;
    value
}

/// Greeting rendered into the page body.
pub fn generate_message(ctx: &dyn PageContext) -> String {
    let now = Local::now().format("%a %b %d %Y %H:%M:%S GMT%z");
    let jitter = rand::random::<f64>() * 1000.0;
    format!(
        "Hello world!!! Current time: {now} -- path: {} :: {}",
        ctx.pathname(),
        format_number(jitter)
    )
}

/// Composes loading, transformation, formatting and reporting into one run.
pub struct Orchestrator {
    ctx: Arc<dyn PageContext>,
    loader: DataLoader,
    config: DatapassConfig,
    console: Console,
    on_steps_done: StepsCallback,
}

impl Orchestrator {
    pub fn new(ctx: Arc<dyn PageContext>, config: DatapassConfig, console: Console) -> Self {
        Self {
            ctx,
            loader: DataLoader::new(),
            config,
            console,
            on_steps_done: Box::new(|console: &Console| -> Result<()> {
                console.success("done");
                Ok(())
            }),
        }
    }

    /// Replaces the HTTP loader.
    pub fn with_loader(mut self, loader: DataLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Replaces the callback run after the step sequence.
    pub fn with_steps_callback(mut self, callback: StepsCallback) -> Self {
        self.on_steps_done = callback;
        self
    }

    pub fn context(&self) -> &dyn PageContext {
        self.ctx.as_ref()
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Runs the whole pipeline, logs completion and returns the exit code,
    /// which is always 0.
    pub async fn run(&self) -> i32 {
        self.execute().await;
        self.console.log("Main execution done");
        0
    }

    /// Runs the pipeline up to and including the step sequence and returns
    /// the snapshot that was logged. Failures are logged and recovered.
    pub async fn execute(&self) -> Snapshot {
        self.console.log("Start main execution");

        if self.ctx.is_page() {
            let html = format!("<p>{}</p>", generate_message(self.ctx.as_ref()));
            if let Err(e) = self.ctx.append_html(&html) {
                self.console.error(format!("Error rendering message: {e}"));
            }
        }

        let data = self
            .loader
            .load_dataset(self.ctx.as_ref(), &self.config.data_file_path, &self.console)
            .await;

        let processed = Processed {
            x: square_and_filter(1, 2, &[]),
            y: square_and_filter(3, 4, &[]),
            z: square_and_filter(5, 6, &[]),
        };
        let temp_value = sum_slice(&data) * ARRAY_SUM_MULTIPLIER;

        let mode = if self.ctx.is_page() {
            self.ctx.hash()
        } else {
            self.config.default_mode.clone()
        };
        if self.config.is_valid_mode(&mode) {
            self.console.log(format!(
                "MODE: {mode} TEMP= {} LEN= {}",
                format_number(temp_value),
                data.len()
            ));
        } else {
            tracing::debug!(%mode, "mode not in allow-set");
            self.console.log("UNKNOWN MODE");
        }

        let sorted_array = sort_array_ascending(&data);
        let formatted_users = sample_users().iter().map(get_user_data).collect();

        let snapshot = Snapshot {
            temp_value,
            sorted_array,
            original_data: data,
            processed,
            formatted_users,
            current_path: self.ctx.pathname(),
            timestamp: Utc::now().timestamp_millis(),
            data_file_path: self.config.data_file_path.clone(),
        };
        self.console.print_snapshot(&snapshot);

        if let Err(e) = self.timed_sequence().await {
            self.console.error(format!("Error in promise: {e}"));
        }

        snapshot
    }

    async fn timed_sequence(&self) -> Result<()> {
        let delay = Duration::from_millis(self.config.promise_delay_ms);
        let value = resolve_after(delay, PROMISE_VALUE).await;
        self.console.log(format!("Promise resolved with: {value}"));

        let sequencer = StepSequencer::new(self.config.steps.clone());
        sequencer
            .run_then(&self.console, || (self.on_steps_done)(&self.console))
            .await
    }
}

/// Emulates loading the program into an environment. With a page the run
/// starts once the page is ready and its exit code is returned; headless
/// nothing runs and `None` is returned.
pub async fn bootstrap(orchestrator: &Orchestrator) -> Option<i32> {
    if orchestrator.context().is_page() {
        orchestrator.console().log("Page ready");
        Some(orchestrator.run().await)
    } else {
        orchestrator
            .console()
            .log("Code is running in a headless environment.");
        None
    }
}
