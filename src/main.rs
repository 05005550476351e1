use anyhow::{Context, Result, bail};
use clap::Parser;
use kino_scrape::cache::ReportCache;
use kino_scrape::{Config, HttpFetcher, logging, pipeline};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "kino-scrape")]
#[command(about = "Collects showtimes from local theaters into one weekly programme")]
#[command(version)]
struct Cli {
    /// Remove the cached report before doing anything else
    #[arg(long)]
    clean: bool,

    /// Do not open the report in a viewer
    #[arg(long)]
    no_open: bool,

    /// Fetch all theaters again and rebuild the report
    #[arg(long)]
    update: bool,

    /// Theater configuration (default: <config dir>/kino-scrape/theaters.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report location (default: <cache dir>/kino-scrape/programm.html)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let cache = match cli.output {
        Some(path) => ReportCache::new(path),
        None => ReportCache::default_location(),
    };

    if cli.clean {
        cache
            .clean()
            .with_context(|| format!("removing {}", cache.path().display()))?;
        if !cli.update {
            return Ok(());
        }
    }

    if cli.update || !cache.exists() {
        update(&cache, cli.config.as_deref()).await?;
    } else {
        info!(path = %cache.path().display(), "using cached report");
    }

    if !cli.no_open {
        open_viewer(cache.path())?;
    }
    Ok(())
}

async fn update(cache: &ReportCache, config_path: Option<&Path>) -> Result<()> {
    let config_path = match config_path {
        Some(path) => path.to_path_buf(),
        None => Config::default_path().context("no configuration directory on this platform")?,
    };
    let config = Config::load(&config_path)?;
    info!(
        config = %config_path.display(),
        theaters = config.theaters().len(),
        "starting collection"
    );

    let fetcher = HttpFetcher::new(config.timeout()).context("building HTTP client")?;
    let now = chrono::Local::now().naive_local();
    let html = pipeline::build_report(&config, &fetcher, now)
        .await
        .context("collection failed, cached report left untouched")?;

    cache
        .store(&html)
        .with_context(|| format!("writing {}", cache.path().display()))
}

fn open_viewer(path: &Path) -> Result<()> {
    let mut command = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };

    let status = command
        .arg(path)
        .status()
        .with_context(|| format!("launching viewer for {}", path.display()))?;
    if !status.success() {
        warn!(%status, "viewer exited with an error");
        bail!("could not open {}", path.display());
    }
    Ok(())
}
