//! datapass loads a small numeric dataset, derives a few values from it,
//! formats sample user records and reports everything to the console.
//!
//! The orchestrator and each utility are public so a hosting program can
//! call them directly.

pub mod config;
pub mod env;
pub mod error;
pub mod loader;
pub mod numeric;
pub mod orchestrator;
pub mod sequencer;
pub mod ui;
pub mod user;

pub use config::DatapassConfig;
pub use env::{Document, Headless, PageBacked, PageContext, detect, is_page_environment};
pub use error::{DatapassError, LoadError};
pub use loader::{DEFAULT_DATA, DataLoader, parse_dataset};
pub use numeric::{
    ToNumber, calculate_with_offset, sort_array_ascending, square_and_filter, sum_array,
};
pub use orchestrator::{Orchestrator, Snapshot, bootstrap};
pub use sequencer::{Step, StepSequencer};
pub use ui::Console;
pub use user::{get_user_data, sample_users};
