use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use pdf_downloader_core::{DownloadEngine, FileConfig, StatusStore, build_work_queue, load_rows};
use tracing::{debug, info};

use crate::ProcessExit;
use crate::app::exit_handler;
use crate::cli::Args;

pub(crate) async fn run_downloader(args: Args) -> Result<ProcessExit> {
    debug!(?args, "CLI arguments parsed");

    let mut file_config = match args.config.as_deref() {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    args.apply_to(&mut file_config);
    let (data, download) = file_config.resolve().context("invalid configuration")?;

    info!(
        data_file = %data.data_file.display(),
        log_file = %data.log_file.display(),
        downloads_dir = %download.downloads_dir.display(),
        strategy = ?download.strategy,
        workers = download.workers,
        "PDF downloader starting"
    );

    ensure_dir(&download.downloads_dir)?;
    if let Some(parent) = data.log_file.parent() {
        ensure_dir(parent)?;
    }

    let rows = load_rows(&data)?;
    let store = Arc::new(StatusStore::load(data.log_file.clone()).await?);
    let log = store.snapshot().await;
    let queue = build_work_queue(&rows, &log, download.batch_size, download.resume_policy);

    if queue.is_empty() {
        info!(rows = rows.len(), logged = log.len(), "nothing to download");
        return Ok(ProcessExit::Success);
    }
    info!(queued = queue.len(), logged = log.len(), "work queue ready");

    let engine = DownloadEngine::new(&download)?;
    let report = engine.run(queue, &store, download.strategy).await?;

    info!(
        "attempted to download {} files in {:.2} seconds",
        report.attempted(),
        report.elapsed.as_secs_f64()
    );
    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        log_file = %store.path().display(),
        "download complete"
    );

    Ok(exit_handler::exit_for_report(&report))
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))
}
