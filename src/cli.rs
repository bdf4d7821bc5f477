//! Command line interface for datapass, built with clap.
//!
//! [`Cli`] carries the global flags (`--config`, `--verbose`) and one
//! [`Command`].

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// datapass: fetch a dataset, transform it and report the results.
#[derive(Debug, Parser)]
#[command(name = "datapass", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the TOML config file (defaults to ./datapass.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Where the run happens. A page URL turns on the page context.
#[derive(Debug, Clone, Default, Args)]
pub struct PageArgs {
    /// URL of the page the run is attached to, e.g. `http://localhost:8080/#y`.
    #[arg(long)]
    pub page_url: Option<String>,

    /// Append rendered fragments to this document file.
    #[arg(long)]
    pub render_to: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full pipeline and exit with its code.
    Run {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Start the pipeline the way a page load would; headless this only
    /// prints a notice.
    Boot {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Run only the configured step sequence.
    Steps,

    /// Print a value plus a random offset.
    Offset {
        /// Value to offset; non-numeric input counts as 0.
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Format a user record given as a JSON object.
    User {
        /// e.g. '{"Name": "Ivan", "age": 30}'
        json: String,
    },

    /// Sum the elements of a JSON array.
    Sum {
        /// e.g. '[1, "a", 3]'
        json: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_run_with_page() {
        let cli = Cli::parse_from([
            "datapass",
            "run",
            "--page-url",
            "http://localhost:8080/#y",
            "--render-to",
            "page.html",
        ]);
        match cli.command {
            Command::Run { page } => {
                assert_eq!(page.page_url.as_deref(), Some("http://localhost:8080/#y"));
                assert_eq!(page.render_to, Some(PathBuf::from("page.html")));
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn cli_parses_run_headless() {
        let cli = Cli::parse_from(["datapass", "run"]);
        match cli.command {
            Command::Run { page } => {
                assert!(page.page_url.is_none());
                assert!(page.render_to.is_none());
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from(["datapass", "--config", "alt.toml", "-v", "steps"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        assert!(matches!(cli.command, Command::Steps));
    }

    #[test]
    fn cli_parses_negative_offset() {
        let cli = Cli::parse_from(["datapass", "offset", "-5"]);
        match cli.command {
            Command::Offset { value } => assert_eq!(value, "-5"),
            _ => panic!("expected Offset command"),
        }
    }

    #[test]
    fn cli_parses_user_and_sum() {
        let cli = Cli::parse_from(["datapass", "user", r#"{"Name":"Ivan"}"#]);
        assert!(matches!(cli.command, Command::User { json } if json == r#"{"Name":"Ivan"}"#));

        let cli = Cli::parse_from(["datapass", "sum", "[1,2,3]"]);
        assert!(matches!(cli.command, Command::Sum { json } if json == "[1,2,3]"));
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
