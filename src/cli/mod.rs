use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use crate::error::{FileRole, OrangeBookError};
use crate::pipeline::{EssentialSelection, PipelineConfig, run_match, run_pipeline};
use crate::render;
use crate::sources::orange_book::{DEFAULT_DELIMITER, MalformedPolicy, TableFormat};
use crate::utils::fs::read_to_string;

#[derive(Parser, Debug)]
#[command(
    name = "orangebook",
    version,
    about = "Essential-medicine report from FDA Orange Book data files"
)]
pub struct Cli {
    /// Print the summary as JSON instead of markdown
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Match, annotate, condense, and write the report file
    Run {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Patent file (patent.txt)
        #[arg(long)]
        patents: PathBuf,

        /// Exclusivity file (exclusivity.txt)
        #[arg(long)]
        exclusivity: PathBuf,

        /// Report output path (CSV)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List the essential products without annotating or writing a report
    Match {
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Product file (products.txt)
    #[arg(long)]
    pub products: PathBuf,

    /// Essential drug; combinations joined with '+' (repeatable)
    #[arg(short, long = "essential", value_name = "DRUG")]
    pub essential: Vec<String>,

    /// File with one essential drug per line
    #[arg(long, value_name = "FILE")]
    pub essential_file: Option<PathBuf>,

    /// Ingredient substring that disqualifies a match (repeatable)
    #[arg(short, long = "bad-word", value_name = "WORD")]
    pub bad_word: Vec<String>,

    /// File with one bad word per line
    #[arg(long, value_name = "FILE")]
    pub bad_words_file: Option<PathBuf>,

    /// JSON file with "essential" and "bad_words" arrays
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Column delimiter of the input files
    #[arg(long, default_value_t = DEFAULT_DELIMITER)]
    pub delimiter: char,

    /// Abort on the first malformed line instead of skipping it
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ListConfig {
    #[serde(default)]
    essential: Vec<String>,
    #[serde(default)]
    bad_words: Vec<String>,
}

/// Entries of a one-per-line list file; blank lines and `#` comments are ignored.
fn parse_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

async fn read_list(path: &Path, role: FileRole) -> Result<Vec<String>, OrangeBookError> {
    Ok(parse_list(&read_to_string(path, role).await?))
}

async fn read_config(path: &Path) -> Result<ListConfig, OrangeBookError> {
    let text = read_to_string(path, FileRole::Config).await?;
    Ok(serde_json::from_str(&text)?)
}

fn validate_delimiter(delimiter: char) -> Result<char, OrangeBookError> {
    if delimiter == ',' || delimiter.is_whitespace() {
        return Err(OrangeBookError::InvalidArgument(format!(
            "--delimiter must not be ',' or whitespace (got {delimiter:?})"
        )));
    }
    Ok(delimiter)
}

/// Merges config file, list files, and flags, in that order.
pub async fn build_selection(args: SelectionArgs) -> Result<EssentialSelection, OrangeBookError> {
    let delimiter = validate_delimiter(args.delimiter)?;

    let mut essential = Vec::new();
    let mut bad_words = Vec::new();
    if let Some(path) = &args.config {
        let config = read_config(path).await?;
        essential.extend(config.essential);
        bad_words.extend(config.bad_words);
    }
    if let Some(path) = &args.essential_file {
        essential.extend(read_list(path, FileRole::EssentialList).await?);
    }
    if let Some(path) = &args.bad_words_file {
        bad_words.extend(read_list(path, FileRole::BadWords).await?);
    }
    essential.extend(args.essential);
    bad_words.extend(args.bad_word);

    Ok(EssentialSelection {
        products: args.products,
        format: TableFormat {
            delimiter,
            malformed: if args.strict {
                MalformedPolicy::FailFast
            } else {
                MalformedPolicy::Skip
            },
        },
        essential,
        bad_words,
    })
}

pub async fn run(cli: Cli) -> anyhow::Result<String> {
    match cli.command {
        Commands::Run {
            selection,
            patents,
            exclusivity,
            output,
        } => {
            let config = PipelineConfig {
                selection: build_selection(selection).await?,
                patents,
                exclusivity,
                output,
            };
            let summary = run_pipeline(&config).await?;
            if cli.json {
                return Ok(render::json::to_pretty(&summary)?);
            }
            Ok(render::markdown::run_summary_markdown(&summary)?)
        }
        Commands::Match { selection } => {
            let selection = build_selection(selection).await?;
            let summary = run_match(&selection).await?;
            if cli.json {
                return Ok(render::json::to_pretty(&summary)?);
            }
            Ok(render::markdown::match_markdown(&summary)?)
        }
    }
}
