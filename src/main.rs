//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Metrix.
//! The Metrix project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use metrix::io::{MxIo, MxIoFormat};
use metrix::pipeline::MxPipeline;
use metrix::report::{MxReportConfig, MxReportRunner, MxStaticFetcher};
use metrix::table::MxTablePreview;

#[derive(Parser)]
#[command(name = "metrix")]
#[command(version, about = "Run report transformation pipelines over JSON table sets")]
struct Cli {
    /// Log level; RUST_LOG is used when not given
    #[arg(long, global = true, value_enum, env = "METRIX_LOG_LEVEL")]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a list of steps to a table set
    Run {
        /// JSON object of `source -> rows`
        #[arg(long)]
        tables: PathBuf,
        /// Steps as JSON or YAML
        #[arg(long)]
        pipeline: PathBuf,
        /// Table to print; defaults to the first one
        #[arg(long)]
        output: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run a saved report document against pre-fetched tables
    Report {
        #[arg(long)]
        config: PathBuf,
        /// JSON object of `source id -> rows`
        #[arg(long)]
        tables: PathBuf,
        /// Reference date for the period (YYYY-MM-DD); defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

fn io_format(format: OutputFormat) -> Result<MxIoFormat> {
    match format {
        OutputFormat::Json => Ok(MxIoFormat::Json),
        #[cfg(feature = "csv")]
        OutputFormat::Csv => Ok(MxIoFormat::Csv(Default::default())),
        #[cfg(not(feature = "csv"))]
        OutputFormat::Csv => anyhow::bail!("metrix was built without csv support"),
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn init_logging(level: Option<LogLevel>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.filter_level(level.into());
    }
    builder.format_timestamp_millis().init();
}

fn emit(preview: &MxTablePreview, format: OutputFormat, out: Option<PathBuf>) -> Result<()> {
    let format = io_format(format)?;
    if let Some(path) = out {
        MxIo::write_preview(&path, &format, preview)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote {} row(s) to {}", preview.row_count, path.display());
        return Ok(());
    }

    let stdout = io::stdout();
    let handle = stdout.lock();
    match format {
        MxIoFormat::Json => MxIo::write_preview_json(handle, preview)?,
        #[cfg(feature = "csv")]
        MxIoFormat::Csv(options) => MxIo::write_preview_csv(handle, &options, preview)?,
    }
    io::stdout().flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Command::Run {
            tables,
            pipeline,
            output,
            format,
            out,
        } => {
            let input = MxIo::load_tables(&tables)
                .with_context(|| format!("failed to load tables from {}", tables.display()))?;
            let steps = MxIo::load_steps(&pipeline)
                .with_context(|| format!("failed to load steps from {}", pipeline.display()))?;
            let result = MxPipeline::new(steps).run_owned(input)?;
            let preview = match output {
                Some(key) => result.preview(&key)?,
                None => result.preview_first(),
            };
            emit(&preview, format, out)
        }
        Command::Report {
            config,
            tables,
            today,
            format,
            out,
        } => {
            let report = MxReportConfig::from_path(&config)
                .with_context(|| format!("failed to load report {}", config.display()))?;
            let fetcher = MxStaticFetcher::new(MxIo::load_tables(&tables)?);
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let outcome = MxReportRunner::new().run(&report, &fetcher, today)?;
            log::info!("report period {}", outcome.date_range);
            emit(&outcome.preview, format, out)
        }
    }
}
