// gridlog CLI - headless front end for the grid state engine
//
// Each invocation opens the data directory, replays stored grid and history
// into a store, applies one action, and writes back whatever it changed.

mod error;
mod exit_codes;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};

use gridlog_config::Settings;
use gridlog_engine::{Action, CellValue, EditEvent};
use gridlog_io::{FileStore, PersistedStore};

use error::CliError;
use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "gridlog")]
#[command(about = "Grid editor state engine (CLI mode, headless)")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Directory holding table-data.json and history-data.json
    #[arg(long, global = true, env = "GRIDLOG_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Settings file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log transitions and storage writes to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the grid with the contents of a CSV or JSON file
    #[command(after_help = "\
Examples:
  gridlog import people.csv
  gridlog import people.json
  gridlog import export.txt --format csv")]
    Import {
        /// Source file
        file: PathBuf,

        /// Source format (inferred from extension if not specified)
        #[arg(long, short = 'f')]
        format: Option<ImportFormat>,
    },

    /// Print the grid
    Show {
        /// Print as a JSON array of row objects
        #[arg(long)]
        json: bool,
    },

    /// Set one cell and record the change in the history log
    #[command(after_help = "\
Examples:
  gridlog edit 0 age 31
  gridlog edit 0 age 31 --number
  gridlog edit 2 name Carol --at 2024-03-05T10:00:00")]
    Edit {
        /// 0-based row index
        row: usize,

        /// Column name
        column: String,

        /// New cell value
        value: String,

        /// Store the value as a number instead of text
        #[arg(long)]
        number: bool,

        /// Edit time (local), e.g. 2024-03-05T10:00:00. Defaults to now.
        #[arg(long, value_parser = parse_timestamp)]
        at: Option<NaiveDateTime>,
    },

    /// List rows containing a substring (case-insensitive)
    Search {
        query: String,

        #[arg(long)]
        json: bool,
    },

    /// Print the day-grouped edit history, newest first
    History {
        #[arg(long)]
        json: bool,
    },

    /// Apply a raw action, e.g. '{"type":"SetSearchQuery","payload":"bob"}'
    Dispatch {
        /// Action JSON
        action: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ImportFormat {
    Csv,
    Tsv,
    Json,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  gridlog-engine ", env!("CARGO_PKG_VERSION"),
    )
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| format!("expected YYYY-MM-DDTHH:MM:SS, got '{s}'"))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, CliError> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = Some(dir.clone());
    }
    Ok(settings)
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(&cli)?;
    let data_dir = settings.data_dir();
    log::debug!("data dir: {}", data_dir.display());

    let kv = FileStore::open(&data_dir)?;
    let mut store = PersistedStore::open(kv, settings.history_format()?)?;

    match cli.command {
        Commands::Import { file, format } => {
            let format = match format {
                Some(f) => f,
                None => infer_format(&file)?,
            };
            let grid = match format {
                ImportFormat::Csv => gridlog_io::csv::import(&file),
                ImportFormat::Tsv => gridlog_io::csv::import_with_delimiter(&file, b'\t'),
                ImportFormat::Json => gridlog_io::json::import(&file),
            }
            .map_err(|e| CliError::Import(e.to_string()))?;
            let state = store.dispatch(Action::SetGrid(grid))?;
            println!(
                "imported {} rows x {} columns",
                state.grid.len(),
                state.grid.columns().len()
            );
        }

        Commands::Show { json } => {
            if json {
                println!("{}", render::to_json(&store.state().grid)?);
            } else {
                print!("{}", render::grid_table(&store.state().grid, None));
            }
        }

        Commands::Edit { row, column, value, number, at } => {
            let new_value = if number {
                value
                    .parse::<f64>()
                    .ok()
                    .and_then(CellValue::number)
                    .ok_or_else(|| CliError::Usage(format!("'{value}' is not a finite number")))?
            } else {
                CellValue::Text(value)
            };
            let old_value = store.state().grid.get(row, &column).cloned().unwrap_or_default();
            let edit = match at {
                Some(at) => EditEvent::new(row, column, old_value, new_value, at),
                None => EditEvent::now(row, column, old_value, new_value),
            };
            let state = store.dispatch(Action::ApplyEdit(edit))?;
            if let Some(entry) = state.history.latest() {
                println!("{}", render::history_entry(entry));
            }
        }

        Commands::Search { query, json } => {
            // Search state is view-only; nothing is written back.
            let state = store.dispatch(Action::SetSearchQuery(query))?;
            if json {
                println!("{}", render::to_json(&state.search)?);
            } else {
                print!("{}", render::grid_table(&state.grid, Some(state.search.matched_row_indices.as_slice())));
            }
        }

        Commands::History { json } => {
            let history = &store.state().history;
            if json {
                println!("{}", render::to_json(history)?);
            } else {
                print!("{}", render::history(history));
            }
        }

        Commands::Dispatch { action } => {
            let state = store.dispatch_json(&action)?;
            println!("{}", render::to_json(state)?);
        }
    }

    Ok(())
}

fn infer_format(path: &std::path::Path) -> Result<ImportFormat, CliError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") => Ok(ImportFormat::Csv),
        Some("tsv") | Some("tab") => Ok(ImportFormat::Tsv),
        Some("json") => Ok(ImportFormat::Json),
        _ => Err(CliError::Usage(format!(
            "cannot infer format of {}; pass --format",
            path.display()
        ))),
    }
}
