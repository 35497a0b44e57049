mod alerts_csv;
mod config;
mod main_lib;
mod report_csv;

use alerts_csv::CsvAlertSource;
use config::Config;
use main_lib::{build_app, init_tracing};
use report_csv::CsvReportSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing();
    let app = build_app(&config).await?;

    let mut source = CsvAlertSource::new(&config.alerts_file);
    let mut sink = CsvReportSink::create(&config.report_file)?;
    let result = app.runner.run(&mut source, &mut sink).await;

    // Caches are saved whatever happened to the run.
    app.save().await?;

    let summary = result?;
    tracing::info!(
        "Wrote {} rows to {} ({} unresolved, {} write failures)",
        summary.alerts - summary.write_failures,
        config.report_file.display(),
        summary.unresolved,
        summary.write_failures
    );
    Ok(())
}
