use anyhow::Context;
use crossbeam_channel::Sender;
use process_tree::config::load_config;
use process_tree::config::options::DEFAULT_CONFIG_PATH;
use process_tree::events::{Batch, ViewRequest};
use process_tree::monitoring::console::{self, ConsoleExit};
use process_tree::monitoring::{batch_watcher, view_engine};
use simplelog::{ColorChoice, CombinedLogger, LevelFilter, TermLogger, TerminalMode};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};
use std::thread::JoinHandle;
use std::time::Duration;

static RUNNING: AtomicBool = AtomicBool::new(true);
static SHUTDOWN_ONCE: Once = Once::new();

fn main() -> anyhow::Result<()> {
    CombinedLogger::init(vec![TermLogger::new(
        LevelFilter::Trace,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])
    .context("initializing logger")?;

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Arc::new(load_config(&config_path));
    log::set_max_level(config.level_filter());

    log::info!("=========================================");
    log::info!("       Process Tree Console Starting");
    log::info!("=========================================");

    let (request_tx, request_rx) = crossbeam_channel::unbounded();
    let (batch_tx, batch_rx) = crossbeam_channel::unbounded();

    let engine_running = Arc::new(AtomicBool::new(true));
    let watcher_running = Arc::new(AtomicBool::new(true));

    let engine_handle = view_engine::start_view_engine(
        request_rx,
        batch_rx,
        Arc::clone(&config),
        Arc::clone(&engine_running),
    );

    let watcher_handle = match &config.batch_file {
        Some(path) => Some(batch_watcher::start_batch_watcher(
            PathBuf::from(path),
            batch_tx.clone(),
            Duration::from_millis(config.poll_interval_ms),
            Arc::clone(&watcher_running),
        )),
        None => {
            log::info!("No batch_file configured, use 'load <path>' to open one");
            None
        }
    };

    log::info!("🛑 To stop: press Ctrl+C or type 'q' then Enter. Type 'help' for commands.");

    ctrlc::set_handler(|| {
        SHUTDOWN_ONCE.call_once(|| {
            log::info!("🛑 Received shutdown signal");
            RUNNING.store(false, Ordering::Relaxed);
        });
    })
    .context("setting Ctrl+C handler")?;

    let stdin_handle = spawn_console_reader(request_tx.clone());

    while RUNNING.load(Ordering::Relaxed) {
        std::thread::sleep(Duration::from_millis(50));
        if engine_handle.is_finished() {
            log::error!("View engine exited unexpectedly");
            break;
        }
    }

    // The console reader blocks on stdin and is left to die with the process.
    drop(stdin_handle);

    perform_shutdown(
        engine_running,
        watcher_running,
        request_tx,
        batch_tx,
        engine_handle,
        watcher_handle,
    );

    Ok(())
}

fn spawn_console_reader(request_tx: Sender<ViewRequest>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let reason = match console::read_requests(io::stdin().lock(), &request_tx) {
            ConsoleExit::Quit(command) => format!("command: '{}'", command),
            ConsoleExit::Closed => "end of input".to_string(),
            ConsoleExit::EngineGone => "view engine exit".to_string(),
        };
        SHUTDOWN_ONCE.call_once(|| {
            log::info!("🛑 Shutdown requested via {}", reason);
            RUNNING.store(false, Ordering::Relaxed);
        });
    })
}

fn perform_shutdown(
    engine_running: Arc<AtomicBool>,
    watcher_running: Arc<AtomicBool>,
    request_tx: Sender<ViewRequest>,
    batch_tx: Sender<Batch>,
    engine_handle: JoinHandle<()>,
    watcher_handle: Option<JoinHandle<()>>,
) {
    log::info!("=========================================");
    log::info!("       Initiating Graceful Shutdown");
    log::info!("=========================================");

    watcher_running.store(false, Ordering::Relaxed);
    engine_running.store(false, Ordering::Relaxed);
    drop(request_tx);
    drop(batch_tx);

    let mut components = vec![("View Engine", engine_handle)];
    if let Some(handle) = watcher_handle {
        components.insert(0, ("Batch Watcher", handle));
    }

    for (name, handle) in components {
        log::info!("  Waiting for {}...", name);
        match join_with_timeout(handle, Duration::from_secs(5)) {
            Ok(()) => log::info!("  ✅ {} stopped gracefully", name),
            Err(JoinError::Timeout) => log::warn!("  ⚠️  {} didn't stop in time, continuing...", name),
            Err(JoinError::Panic(e)) => log::error!("  ❌ {} panicked during shutdown: {:?}", name, e),
        }
    }

    log::info!("✅ Shutdown complete");
}

fn join_with_timeout(handle: JoinHandle<()>, timeout: Duration) -> Result<(), JoinError> {
    let start = std::time::Instant::now();

    while start.elapsed() < timeout {
        if handle.is_finished() {
            return handle.join().map_err(JoinError::Panic);
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    Err(JoinError::Timeout)
}

#[derive(Debug)]
enum JoinError {
    Timeout,
    Panic(Box<dyn std::any::Any + Send + 'static>),
}
