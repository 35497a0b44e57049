use log::{error, info};

use super::model::ReportRow;
use super::traits::{AlertSource, ReportSink};
use crate::dispatch::{classify, CryptoUniverse, SourceDispatcher};
use crate::errors::Result;

/// Counters for one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: usize,
    pub alerts: usize,
    pub unresolved: usize,
    pub write_failures: usize,
}

/// Prices every alert of a source and writes one row per alert.
pub struct AlertRunner {
    dispatcher: SourceDispatcher,
    universe: CryptoUniverse,
}

impl AlertRunner {
    pub fn new(dispatcher: SourceDispatcher, universe: CryptoUniverse) -> Self {
        Self {
            dispatcher,
            universe,
        }
    }

    pub async fn run(
        &self,
        source: &mut dyn AlertSource,
        sink: &mut dyn ReportSink,
    ) -> Result<RunSummary> {
        let batches = source.batches()?;
        let mut summary = RunSummary::default();

        for batch in batches {
            let preferred = classify(batch.symbols().as_slice(), &self.universe);
            info!(
                "{}: {} alerts, preferring {} prices",
                batch.author,
                batch.alerts.len(),
                preferred
            );
            summary.batches += 1;

            for alert in batch.alerts {
                let prices = self
                    .dispatcher
                    .resolve(preferred, &alert.symbol, alert.created_at)
                    .await;
                if prices.is_all_not_found() {
                    summary.unresolved += 1;
                }
                summary.alerts += 1;

                let row = ReportRow { alert, prices };
                if let Err(e) = sink.write_row(&row) {
                    error!("{}: failed to write report row: {}", row.alert.author, e);
                    summary.write_failures += 1;
                }
            }
        }

        sink.finish()?;
        info!(
            "Processed {} alerts in {} batches ({} without any price)",
            summary.alerts, summary.batches, summary.unresolved
        );
        Ok(summary)
    }
}
