use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use rbcp_job::{
    parse_command_with, parse_options_with, read_job_file, serialize_with, write_job_file_with, Capabilities,
    CopyJob, JobFile, Logger, ParseSettings,
};

/// Parse, normalize and convert RBCP/robocopy command lines and job files
#[derive(Parser, Debug)]
#[command(name = "rbcp-job", version = rbcp_job::VERSION)]
struct CommandLineInterface {
    #[command(flatten)]
    global: GlobalSettings,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct GlobalSettings {
    /// log parser decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// target a copy tool without /COMPRESS, /J or /MT
    #[arg(long, global = true)]
    legacy: bool,

    /// also write output to this file
    #[arg(long, global = true)]
    log: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// parse a command line and print it in canonical form
    Parse(ParseOut),
    /// parse job files and print each as a command line
    Show(ShowOut),
    /// parse a command line and write it as a job file
    Save(SaveOut),
}

#[derive(Args, Debug)]
struct ParseOut {
    /// the text contains switches only
    #[arg(long)]
    options_only: bool,

    /// print the parsed job as JSON
    #[arg(long)]
    json: bool,

    /// command text; words are joined with spaces
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    text: Vec<String>,
}

#[derive(Args, Debug)]
struct ShowOut {
    /// print the parsed job files as JSON
    #[arg(long)]
    json: bool,

    /// job files; literal paths or quoted glob patterns
    #[arg(required = true, num_args = 1..)]
    input: Vec<String>,
}

#[derive(Args, Debug)]
struct SaveOut {
    /// job name stored in the file
    #[arg(long, default_value = "")]
    name: String,

    /// stop the copy when its owner goes away
    #[arg(long)]
    stop_if_disposing: bool,

    /// output job file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// command text; words are joined with spaces
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    text: Vec<String>,
}

impl GlobalSettings {
    fn capabilities(&self) -> Capabilities {
        if self.legacy {
            Capabilities::legacy()
        } else {
            Capabilities::default()
        }
    }

    fn settings(&self) -> ParseSettings {
        ParseSettings {
            capabilities: self.capabilities(),
            ..ParseSettings::default()
        }
    }

    fn logger(&self) -> Result<Logger> {
        let file = match &self.log {
            Some(path) => Some(File::create(path).with_context(|| format!("failed to create {}", path.display()))?),
            None => None,
        };
        Ok(Logger::new(file))
    }
}

impl CommandLineInterface {
    fn run(&self) -> Result<()> {
        let logger = self.global.logger()?;
        let caps = self.global.capabilities();
        let settings = self.global.settings();

        match &self.cmd {
            Command::Parse(target) => {
                let text = target.text.join(" ");
                let job = if target.options_only {
                    parse_options_with(&text, &settings)
                } else {
                    parse_command_with(&text, &settings)
                }
                .with_context(|| format!("failed to parse `{}`", text))?;
                if target.json {
                    logger.log(&serde_json::to_string_pretty(&job)?);
                } else {
                    logger.log(&serialize_with(&job, &caps));
                }
            }
            Command::Show(target) => {
                let paths = resolve_file_path_patterns(&target.input)?;
                let files: Vec<(PathBuf, Result<JobFile, rbcp_job::ParseError>)> = paths
                    .into_par_iter()
                    .map(|path| {
                        let file = read_job_file(&path);
                        (path, file)
                    })
                    .collect();
                for (path, file) in files {
                    let file = file.with_context(|| format!("failed to read {}", path.display()))?;
                    if target.json {
                        logger.log(&serde_json::to_string_pretty(&file)?);
                    } else {
                        logger.log(&format!(":: {}", path.display()));
                        logger.log(&serialize_with(&file.job, &caps));
                    }
                }
            }
            Command::Save(target) => {
                let text = target.text.join(" ");
                let job: CopyJob =
                    parse_command_with(&text, &settings).with_context(|| format!("failed to parse `{}`", text))?;
                let mut file = JobFile::new(target.name.clone(), job);
                file.stop_if_disposing = target.stop_if_disposing;
                let rendered = write_job_file_with(&file, &caps);
                match &target.out {
                    Some(out) => {
                        if let Some(parent) = out.parent() {
                            fs::create_dir_all(parent)?;
                        }
                        fs::write(out, &rendered).with_context(|| format!("failed to write {}", out.display()))?;
                        logger.log(&format!("Saved job to {}", out.display()));
                    }
                    None => logger.log(rendered.trim_end()),
                }
            }
        }
        Ok(())
    }
}

/// Expands literal paths and glob patterns, keeping the order given.
fn resolve_file_path_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let before = files.len();
        for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern `{}`", pattern))? {
            let path = entry?;
            if path.is_file() {
                files.push(path);
            }
        }
        if files.len() == before {
            bail!("no job files match `{}`", pattern);
        }
    }
    Ok(files)
}

fn main() -> Result<()> {
    let cli = CommandLineInterface::parse();

    let default_level = if cli.global.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    cli.run()
}
