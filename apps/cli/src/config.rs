use std::path::PathBuf;

use pricetrail_market_data::DEFAULT_SOFT_LIMIT;

pub struct Config {
    pub data_dir: PathBuf,
    pub alpha_vantage_keys: Vec<String>,
    pub alpha_vantage_soft_limit: u32,
    pub iex_token: Option<String>,
    pub alerts_file: PathBuf,
    pub report_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup("PT_DATA_DIR").unwrap_or_else(|| "./data".into());
        let alpha_vantage_keys = lookup("PT_ALPHA_VANTAGE_KEYS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let alpha_vantage_soft_limit = lookup("PT_ALPHA_VANTAGE_SOFT_LIMIT")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_SOFT_LIMIT);
        let iex_token = lookup("PT_IEX_TOKEN")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let alerts_file = lookup("PT_ALERTS_FILE").unwrap_or_else(|| "alerts.csv".into());
        let report_file = lookup("PT_REPORT_FILE").unwrap_or_else(|| "alert_prices.csv".into());

        Self {
            data_dir: PathBuf::from(data_dir),
            alpha_vantage_keys,
            alpha_vantage_soft_limit,
            iex_token,
            alerts_file: PathBuf::from(alerts_file),
            report_file: PathBuf::from(report_file),
        }
    }

    pub fn stocks_dir(&self) -> PathBuf {
        self.data_dir.join("stocks")
    }

    pub fn cryptos_dir(&self) -> PathBuf {
        self.data_dir.join("cryptos")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.stocks_dir(), PathBuf::from("./data/stocks"));
        assert_eq!(config.cryptos_dir(), PathBuf::from("./data/cryptos"));
        assert!(config.alpha_vantage_keys.is_empty());
        assert_eq!(config.alpha_vantage_soft_limit, 450);
        assert_eq!(config.iex_token, None);
        assert_eq!(config.report_file, PathBuf::from("alert_prices.csv"));
    }

    #[test]
    fn test_key_pool_keeps_order() {
        let config = config(&[
            ("PT_ALPHA_VANTAGE_KEYS", " k1, k2,,k3 "),
            ("PT_ALPHA_VANTAGE_SOFT_LIMIT", "not-a-number"),
            ("PT_IEX_TOKEN", "  "),
        ]);
        assert_eq!(config.alpha_vantage_keys, vec!["k1", "k2", "k3"]);
        assert_eq!(config.alpha_vantage_soft_limit, 450);
        assert_eq!(config.iex_token, None);
    }
}
