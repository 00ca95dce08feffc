//! Tracked token symbols.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSymbol {
    Ray,
    Wif,
}

impl TokenSymbol {
    pub const ALL: [Self; 2] = [Self::Ray, Self::Wif];

    /// Case-insensitive match on the trimmed symbol.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|token| token.lowercase() == normalized)
    }

    #[must_use]
    pub fn lowercase(self) -> &'static str {
        match self {
            Self::Ray => "ray",
            Self::Wif => "wif",
        }
    }

    /// Display form, e.g. `RAY`.
    #[must_use]
    pub fn ticker(self) -> &'static str {
        match self {
            Self::Ray => "RAY",
            Self::Wif => "WIF",
        }
    }
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ticker())
    }
}
