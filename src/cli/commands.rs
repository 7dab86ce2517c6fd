use crate::app::{AppContext, QuireError, Result};
use crate::cycle::CycleReport;
use crate::daemon::{Daemon, DaemonConfig, ReportSink};
use crate::domain::{Heading, Item};

/// Poll until interrupted.
pub async fn run(ctx: &AppContext, delay: Option<&str>, no_initial_run: bool) -> Result<()> {
    let interval_secs = match delay {
        Some(delay) => DaemonConfig::parse_interval(delay).map_err(QuireError::Config)?,
        None => ctx.config.daemon.interval_secs,
    };

    let config = DaemonConfig {
        interval_secs,
        run_on_start: !no_initial_run,
    };
    let sink: ReportSink = Box::new(print_report);

    Daemon::new(ctx.cycle_runner(), config, sink).run().await;
    Ok(())
}

/// One cycle, then exit.
pub async fn once(ctx: &AppContext) -> Result<()> {
    let report = ctx.cycle_runner().run_cycle().await?;
    print_report(&report);

    println!(
        "Cycle complete: {} resolved, {} failed ({:.1}s)",
        report.resolved_count(),
        report.failed_count(),
        report.elapsed.as_secs_f64()
    );
    Ok(())
}

/// Resolve a single item by id.
pub async fn show(ctx: &AppContext, id: &str) -> Result<()> {
    let item = ctx.resolver.resolve(&Heading::new(id)).await?;
    print_item(&item);
    Ok(())
}

fn print_report(report: &CycleReport) {
    for item in report.resolved() {
        print_item(item);
    }
    for (id, e) in report.failures() {
        tracing::warn!(item_id = id, error = %e, "Item skipped this cycle");
    }
}

fn print_item(item: &Item) {
    match item.to_pretty_json() {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!(item_id = %item.id, "Failed to render item: {}", e),
    }
}
