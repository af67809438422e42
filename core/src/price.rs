//! Price bucketing for the `Price Range` select.
//!
//! Callers send anything from `"4,95 €"` to `12` to an already bucketed
//! label. The first decimal number found decides the bucket; canonical
//! labels are kept as they are.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:[.,][0-9]+)?").expect("amount pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBucket {
    Budget,
    Moderate,
    Premium,
}

impl PriceBucket {
    pub const ALL: [PriceBucket; 3] = [PriceBucket::Budget, PriceBucket::Moderate, PriceBucket::Premium];

    pub fn label(self) -> &'static str {
        match self {
            PriceBucket::Budget => "€ (Budget)",
            PriceBucket::Moderate => "€€ (Moderate)",
            PriceBucket::Premium => "€€€ (Premium)",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| bucket.label() == label)
    }

    /// Bounds are inclusive; amounts below 1 or in the gaps between buckets
    /// have no bucket.
    pub fn from_amount(amount: f64) -> Option<Self> {
        if (1.0..=5.0).contains(&amount) {
            Some(PriceBucket::Budget)
        } else if (6.0..=20.0).contains(&amount) {
            Some(PriceBucket::Moderate)
        } else if amount >= 21.0 {
            Some(PriceBucket::Premium)
        } else {
            None
        }
    }
}

impl fmt::Display for PriceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map free-form price text to its bucket.
pub fn normalize_price(input: &str) -> Option<PriceBucket> {
    let input = input.trim();
    if let Some(bucket) = PriceBucket::from_label(input) {
        return Some(bucket);
    }
    let amount = AMOUNT.find(input)?.as_str().replace(',', ".");
    PriceBucket::from_amount(amount.parse().ok()?)
}

/// Whether the text contains anything that looks like an amount.
pub fn has_amount(input: &str) -> bool {
    AMOUNT.is_match(input)
}
