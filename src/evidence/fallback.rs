//! Literature Defaults
//!
//! Static PK values used when the model is unavailable or gives nothing
//! usable. Lookup is a case-insensitive substring match of each key against
//! the INN, in table order; the first hit wins.

use super::params::PkParameters;

struct FallbackEntry {
    key: &'static str,
    cv_intra: f64,
    t_half: f64,
    cmax_range: &'static str,
    auc_range: &'static str,
}

impl FallbackEntry {
    fn to_params(&self) -> PkParameters {
        PkParameters {
            cv_intra: Some(self.cv_intra),
            t_half: Some(self.t_half),
            cmax_range: Some(self.cmax_range.to_string()),
            auc_range: Some(self.auc_range.to_string()),
        }
    }
}

const KNOWN_DRUGS: &[FallbackEntry] = &[
    FallbackEntry {
        key: "ibuprofen",
        cv_intra: 0.25,
        t_half: 2.0,
        cmax_range: "15-25 µg/mL",
        auc_range: "50-80 µg·h/mL",
    },
    FallbackEntry {
        key: "metformin",
        cv_intra: 0.20,
        t_half: 4.0,
        cmax_range: "1-2 µg/mL",
        auc_range: "10-15 µg·h/mL",
    },
    FallbackEntry {
        key: "atorvastatin",
        cv_intra: 0.35,
        t_half: 14.0,
        cmax_range: "5-15 ng/mL",
        auc_range: "30-100 ng·h/mL",
    },
    FallbackEntry {
        key: "amoxicillin",
        cv_intra: 0.30,
        t_half: 1.5,
        cmax_range: "5-10 µg/mL",
        auc_range: "20-40 µg·h/mL",
    },
];

const DEFAULT_ENTRY: FallbackEntry = FallbackEntry {
    key: "",
    cv_intra: 0.25,
    t_half: 4.0,
    cmax_range: "typical range",
    auc_range: "typical range",
};

/// Ordered default-data provider keyed by drug name substring.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackTable;

impl FallbackTable {
    /// Defaults for `inn`, or the generic row when no key matches.
    pub fn lookup(&self, inn: &str) -> PkParameters {
        self.find(inn).unwrap_or(&DEFAULT_ENTRY).to_params()
    }

    /// Key of the row `inn` resolves to, `None` for the generic row.
    pub fn matched_key(&self, inn: &str) -> Option<&'static str> {
        self.find(inn).map(|e| e.key)
    }

    fn find(&self, inn: &str) -> Option<&'static FallbackEntry> {
        let inn = inn.to_lowercase();
        KNOWN_DRUGS.iter().find(|entry| inn.contains(entry.key))
    }
}
