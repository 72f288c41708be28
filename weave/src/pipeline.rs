//! Sequences ingestion, key validation and writing for each configured pipeline.
//!
//! The strings pipeline runs first, then analytics. Each one builds its own
//! model, so nothing leaks from one run into the other. Any `Err` returned
//! here is fatal; recoverable problems have already been logged.

use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::{
    config::{AnalyticsConfig, Config, StringsConfig},
    error::Error,
    formats::{write_analytics, write_strings},
    ingest::{ingest_analytics, ingest_strings},
    traits::Fetch,
    validate::verify_keys,
};

/// Files produced by a full run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub strings: Vec<PathBuf>,
    pub analytics: Option<PathBuf>,
}

/// Runs every pipeline present in `config`.
///
/// # Example
///
/// ```rust,no_run
/// use weave::{Config, HttpFetcher, run};
///
/// let config = Config::discover()?;
/// let summary = run(&config, &HttpFetcher::new())?;
/// println!("wrote {} string files", summary.strings.len());
/// # Ok::<(), weave::Error>(())
/// ```
pub fn run(config: &Config, fetcher: &dyn Fetch) -> Result<RunSummary, Error> {
    let mut summary = RunSummary::default();

    match &config.strings {
        Some(strings) => {
            summary.strings = run_strings(strings, fetcher)?;
            info!("Strings parsing complete");
        }
        None => warn!("No Strings config found"),
    }

    match &config.analytics {
        Some(analytics) => {
            summary.analytics = run_analytics(analytics, fetcher)?;
            info!("Analytics parsing complete");
        }
        None => warn!("No Analytics config found"),
    }

    Ok(summary)
}

/// Generates one strings file per configured language.
pub fn run_strings(config: &StringsConfig, fetcher: &dyn Fetch) -> Result<Vec<PathBuf>, Error> {
    config.verify()?;

    let mut model = ingest_strings(fetcher, config)?;
    verify_keys(&mut model)?;

    if model.is_empty() {
        warn!("No Strings to write");
        return Ok(Vec::new());
    }

    let mut written = Vec::with_capacity(config.languages.len());
    for language in &config.languages {
        write_file(&language.path, |out| {
            write_strings(&model, config.platform, &language.id, out)
        })?;
        info!(language = %language.id, path = %language.path.display(), "wrote strings");
        written.push(language.path.clone());
    }
    Ok(written)
}

/// Generates the analytics constants file.
pub fn run_analytics(
    config: &AnalyticsConfig,
    fetcher: &dyn Fetch,
) -> Result<Option<PathBuf>, Error> {
    config.verify()?;

    let mut model = ingest_analytics(fetcher, config)?;
    verify_keys(&mut model)?;

    if model.is_empty() {
        warn!("No Analytics Strings to write");
        return Ok(None);
    }

    write_file(&config.path, |out| write_analytics(&model, config, out))?;
    info!(path = %config.path.display(), "wrote analytics");
    Ok(Some(config.path.clone()))
}

/// Creates `path` (and its missing parent directories) and hands a buffered
/// writer to `write`. The writer is flushed and closed before returning.
fn write_file(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> Result<(), Error>,
) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write(&mut writer)
}
