use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::prices::PriceTuple;

/// One cashtag mention to price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub author: String,
    pub symbol: String,
    pub created_at: NaiveDateTime,
    pub text: String,
}

/// Alerts of one author, classified together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertBatch {
    pub author: String,
    pub alerts: Vec<Alert>,
}

impl AlertBatch {
    /// Group alerts by author, keeping first-seen author order and the
    /// original order within each author.
    pub fn group_by_author(alerts: impl IntoIterator<Item = Alert>) -> Vec<AlertBatch> {
        let mut batches: Vec<AlertBatch> = Vec::new();
        for alert in alerts {
            match batches.iter_mut().find(|b| b.author == alert.author) {
                Some(batch) => batch.alerts.push(alert),
                None => batches.push(AlertBatch {
                    author: alert.author.clone(),
                    alerts: vec![alert],
                }),
            }
        }
        batches
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.alerts.iter().map(|a| a.symbol.as_str()).collect()
    }
}

/// An alert and the prices resolved for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRow {
    pub alert: Alert,
    pub prices: PriceTuple,
}
