use crate::events::{Batch, load_batch_file};
use crossbeam_channel::Sender;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};

pub fn start_batch_watcher(
    path: PathBuf,
    tx: Sender<Batch>,
    poll_interval: Duration,
    running: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        log::info!("Watching {} for new batches", path.display());
        run_batch_watcher(&path, &tx, poll_interval, &running);
        log::info!("Batch watcher stopped");
    })
}

pub fn run_batch_watcher(
    path: &Path,
    tx: &Sender<Batch>,
    poll_interval: Duration,
    running: &AtomicBool,
) {
    let mut last_seen: Option<SystemTime> = None;

    while running.load(Ordering::Relaxed) {
        if let Some(modified) = poll_once(path, tx, last_seen) {
            last_seen = Some(modified);
        }
        if !sleep_while_running(poll_interval, running) {
            break;
        }
    }
}

/// Sends the file as a batch if it changed since `last_seen`. Returns the
/// modification time that was consumed, if any.
pub fn poll_once(path: &Path, tx: &Sender<Batch>, last_seen: Option<SystemTime>) -> Option<SystemTime> {
    let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(e) => {
            log::debug!("Batch file {} not readable yet: {}", path.display(), e);
            return None;
        }
    };
    if last_seen == Some(modified) {
        return None;
    }

    match load_batch_file(path) {
        Ok(records) => {
            let batch = Batch::new(&path.display().to_string(), records);
            log::info!("📥 New {}", batch);
            if tx.send(batch).is_err() {
                log::debug!("View engine gone, dropping batch");
            }
        }
        Err(e) => log::warn!("Failed to load batch from {}: {}", path.display(), e),
    }
    Some(modified)
}

fn sleep_while_running(total: Duration, running: &AtomicBool) -> bool {
    let step = Duration::from_millis(100);
    let mut slept = Duration::ZERO;
    while slept < total {
        if !running.load(Ordering::Relaxed) {
            return false;
        }
        let nap = step.min(total - slept);
        std::thread::sleep(nap);
        slept += nap;
    }
    true
}
