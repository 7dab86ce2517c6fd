//! Fixed-delay polling loop.
//!
//! Runs one [`CycleRunner`] pass, waits the configured interval, and starts
//! over until the process receives SIGINT/SIGTERM.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{error, info, warn};

use crate::cycle::{CycleReport, CycleRunner};

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Delay after each cycle in seconds (default: 300 = 5 minutes)
    pub interval_secs: u64,
    /// Whether to run a cycle immediately on start
    pub run_on_start: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            run_on_start: true,
        }
    }
}

impl DaemonConfig {
    /// Parse interval string like "300", "30s", "5m", "1h", "1d"
    pub fn parse_interval(s: &str) -> Result<u64, String> {
        let s = s.trim().to_lowercase();

        if let Some(hours) = s.strip_suffix('h') {
            hours
                .parse::<u64>()
                .map(|h| h * 3600)
                .map_err(|_| format!("Invalid hours: {}", hours))
        } else if let Some(minutes) = s.strip_suffix('m') {
            minutes
                .parse::<u64>()
                .map(|m| m * 60)
                .map_err(|_| format!("Invalid minutes: {}", minutes))
        } else if let Some(days) = s.strip_suffix('d') {
            days.parse::<u64>()
                .map(|d| d * 86400)
                .map_err(|_| format!("Invalid days: {}", days))
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.parse::<u64>()
                .map_err(|_| format!("Invalid seconds: {}", secs))
        } else {
            s.parse::<u64>()
                .map_err(|_| format!("Invalid interval: {}. Use format like '300', '5m', '1h'", s))
        }
    }

    /// Format interval for display
    pub fn format_interval(secs: u64) -> String {
        if secs >= 86400 && secs % 86400 == 0 {
            format!("{}d", secs / 86400)
        } else if secs >= 3600 && secs % 3600 == 0 {
            format!("{}h", secs / 3600)
        } else if secs >= 60 && secs % 60 == 0 {
            format!("{}m", secs / 60)
        } else {
            format!("{}s", secs)
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Receives each finished cycle.
pub type ReportSink = Box<dyn Fn(&CycleReport) + Send + Sync>;

/// Daemon runner
pub struct Daemon {
    runner: CycleRunner,
    config: DaemonConfig,
    sink: ReportSink,
    running: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl Daemon {
    pub fn new(runner: CycleRunner, config: DaemonConfig, sink: ReportSink) -> Self {
        Self {
            runner,
            config,
            sink,
            running: Arc::new(AtomicBool::new(true)),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Run until stopped. Cycles never overlap: the delay starts once every
    /// item of the previous cycle has finished.
    pub async fn run(&self) {
        self.install_signal_handler();

        info!(
            interval = %DaemonConfig::format_interval(self.config.interval_secs),
            "Polling started"
        );

        if self.config.run_on_start {
            self.run_cycle().await;
        }

        while self.running.load(Ordering::SeqCst) {
            tokio::select! {
                _ = tokio::time::sleep(self.config.interval()) => {},
                _ = self.wake.notified() => {},
            }

            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            self.run_cycle().await;
        }

        info!("Polling stopped");
    }

    /// Stop after the current cycle, or right away if waiting.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.wake.notify_one();
    }

    fn install_signal_handler(&self) {
        let running = self.running.clone();
        let wake = self.wake.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                warn!("Failed to listen for shutdown signals: {}", e);
                return;
            }
            info!("Shutdown requested");
            running.store(false, Ordering::SeqCst);
            wake.notify_one();
        });
    }

    /// Run a single cycle and hand the report to the sink.
    pub async fn run_cycle(&self) {
        match self.runner.run_cycle().await {
            Ok(report) => {
                (self.sink)(&report);
                info!(
                    resolved = report.resolved_count(),
                    failed = report.failed_count(),
                    "Cycle complete ({:.1}s)",
                    report.elapsed.as_secs_f64()
                );
            }
            Err(e) => {
                error!(error = %e, "Cycle aborted, catalog unavailable");
            }
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {},
        _ = sigint.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
