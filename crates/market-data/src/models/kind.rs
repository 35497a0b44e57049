use serde::{Deserialize, Serialize};

/// Which upstream family a series comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeriesKind {
    Equity,
    Crypto,
}

impl SeriesKind {
    /// The other kind, used when falling back between sources.
    pub fn other(self) -> Self {
        match self {
            Self::Equity => Self::Crypto,
            Self::Crypto => Self::Equity,
        }
    }

    /// Canonical spelling of a symbol for this kind.
    ///
    /// Equity tickers are upper-cased, crypto symbols lower-cased.
    pub fn normalize_symbol(self, symbol: &str) -> String {
        let trimmed = symbol.trim().trim_start_matches('$');
        match self {
            Self::Equity => trimmed.to_uppercase(),
            Self::Crypto => trimmed.to_lowercase(),
        }
    }
}

impl std::fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equity => write!(f, "Equity"),
            Self::Crypto => write!(f, "Crypto"),
        }
    }
}
