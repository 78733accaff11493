use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use history_lib::ERRORS_LOG_FILE;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Used when the platform has no data directory (e.g. no home directory)
const FALLBACK_DATA_DIR: &str = ".lab-history";

#[derive(Parser, Debug)]
#[command(name = "lab-history")]
#[command(about = "Track personal lab-exam results uploaded from a spreadsheet")]
#[command(version)]
pub struct Args {
    /// Directory holding the saved results and the errors log
    #[arg(long, env = "LAB_HISTORY_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Gemini API key used by `explain`
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Gemini model used by `explain`
    #[arg(long, env = "LAB_HISTORY_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Load a spreadsheet (.xlsx, .xls, .ods or .csv) with the columns
    /// "Data", "Tipo de exame", "Exame" and "Valor", replacing the saved results
    Upload { file: PathBuf },

    /// Latest result of every exam, grouped by exam type
    Recent {
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Every result of one exam over time
    History {
        /// Exam to show (defaults to the first exam in alphabetical order)
        #[arg(long)]
        exam: Option<String>,

        /// Print JSON instead of a chart
        #[arg(long)]
        json: bool,
    },

    /// List the exams available for `history`
    Exams,

    /// Ask the text-generation service what an exam is for
    Explain { exam: String },

    /// Print a web search link with information about an exam
    Search { exam: String },

    /// Remove the saved results
    Clear,
}

/// Resolved runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub api_key: Option<String>,
    pub model: String,
}

impl Settings {
    pub fn from_args(args: &Args) -> Self {
        Settings {
            data_dir: args.data_dir.clone().unwrap_or_else(Self::default_data_dir),
            api_key: args
                .api_key
                .as_ref()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            model: args.model.clone(),
        }
    }

    pub fn default_data_dir() -> PathBuf {
        ProjectDirs::from("br", "lab-history", "lab-history")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
    }

    pub fn errors_log(&self) -> PathBuf {
        self.data_dir.join(ERRORS_LOG_FILE)
    }
}
