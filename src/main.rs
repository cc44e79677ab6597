use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

use sheet_export::config::{
    self, Config, DEFAULT_COMMIT_MESSAGE, DEFAULT_DEST_PATH, DEFAULT_REMOTE_NAME,
    DEFAULT_REPO_PATH, DEFAULT_SOURCE_PATH,
};
use sheet_export::publish::{GitPublisher, Publisher};
use sheet_export::{convert, excel, json_export};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Excel file to convert
    #[arg(env = "SHEET_EXPORT_SOURCE", default_value = DEFAULT_SOURCE_PATH)]
    source: PathBuf,

    /// JSON file to create or overwrite
    #[arg(env = "SHEET_EXPORT_DEST", default_value = DEFAULT_DEST_PATH)]
    dest: PathBuf,

    /// Print the JSON to stdout instead of writing a file (for piping)
    #[arg(long, short = 'j')]
    stdout: bool,

    /// Stage, commit and push the written file
    #[arg(long, short = 'p', env = "SHEET_EXPORT_PUBLISH")]
    publish: bool,

    /// Working directory of the git repository to publish to
    #[arg(long, env = "SHEET_EXPORT_REPO", default_value = DEFAULT_REPO_PATH)]
    repo: PathBuf,

    /// Remote to push to
    #[arg(long, env = "SHEET_EXPORT_REMOTE", default_value = DEFAULT_REMOTE_NAME)]
    remote: String,

    /// Commit message for the published file
    #[arg(
        long,
        short = 'm',
        env = "SHEET_EXPORT_COMMIT_MESSAGE",
        default_value = DEFAULT_COMMIT_MESSAGE
    )]
    message: String,

    /// Additional cell text to treat as a missing value (repeatable)
    #[arg(long = "missing-marker", value_name = "TEXT")]
    missing_markers: Vec<String>,

    /// Only treat blank and error cells (and --missing-marker texts) as missing
    #[arg(long)]
    no_default_markers: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> Config {
        let mut missing_markers = if self.no_default_markers {
            Vec::new()
        } else {
            config::default_missing_markers()
        };
        missing_markers.extend(self.missing_markers);

        Config {
            source_path: self.source,
            dest_path: self.dest,
            repo_path: self.repo,
            remote_name: self.remote,
            commit_message: self.message,
            publish: self.publish,
            missing_markers,
        }
    }
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let to_stdout = cli.stdout;
    let config = cli.into_config();
    config.validate().context("Invalid configuration")?;

    // Export to stdout and exit
    if to_stdout {
        let workbook = excel::open_workbook(&config.source_path, &config.missing_markers)
            .context("Workbook load failed")?;
        let all_sheets =
            json_export::generate_all_sheets_json(&workbook).context("JSON export failed")?;
        let json_string =
            json_export::serialize_to_json(&all_sheets).context("JSON export failed")?;
        println!("{}", json_string);

        return Ok(());
    }

    let summary = match convert(
        &config.source_path,
        &config.dest_path,
        &config.missing_markers,
    ) {
        Ok(summary) => summary,
        Err(e) => {
            let stage = e.stage();
            return Err(anyhow::Error::new(e).context(format!("{} failed", stage)));
        }
    };

    println!(
        "Converted {} sheet(s) to JSON (missing values → 0) and saved to: {}",
        summary.sheet_count,
        summary.output_path.display()
    );

    if config.publish {
        let publisher =
            GitPublisher::new(&config.repo_path, &config.remote_name, &config.commit_message);

        // The export is already complete; a failed publish is only reported
        match publisher.publish(&summary.output_path) {
            Ok(()) => println!("Published to remote '{}'", config.remote_name),
            Err(e) => {
                log::warn!("Publish failed: {}", e);
                eprintln!("Warning: {} failed, export was not published: {}", e.step(), e);
            }
        }
    }

    Ok(())
}
