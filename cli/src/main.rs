mod args;

use anyhow::Context;
use args::Args;
use autoclick_core::{ClickSink, Session, Settings};
use autoclick_platform::{EnigoClicker, NoopClicker, RdevSource};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "autoclick=debug,autoclick_core=debug,autoclick_platform=debug"
    } else {
        "autoclick=info,autoclick_core=info,autoclick_platform=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .try_init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let settings = Settings::load(args.config.as_deref()).context("failed to load settings")?;
    let settings = args.apply(settings);

    if args.print_config {
        print!("{}", serde_yaml::to_string(&settings)?);
        return Ok(());
    }

    let sink: Arc<dyn ClickSink> = if args.dry_run {
        info!("dry run: clicks are logged, not performed");
        Arc::new(NoopClicker)
    } else {
        Arc::new(EnigoClicker::new().context("failed to initialise click injection")?)
    };

    let session = Session::new(
        settings,
        sink,
        Box::new(RdevSource::keyboard()),
        Box::new(RdevSource::pointer()),
    );
    let report = session.run().context("auto clicker failed")?;

    info!(
        total_clicks = report.total_clicks,
        exit_reason = ?report.exit_reason,
        shutdown = ?report.shutdown,
        "session finished"
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
