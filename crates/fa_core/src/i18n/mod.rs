//! Output language selection.
//!
//! The report templates exist in exactly two fixed variants, so the
//! language is an explicit enum and every rendered string is chosen by
//! matching on it. Adding a language is a localized change in the
//! rendering modules, not a string-table lookup.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Zh,
    En,
}

impl Lang {
    pub fn is_en(self) -> bool {
        matches!(self, Lang::En)
    }

    /// Pick between the two fixed variants of a template line.
    pub fn pick<'a>(self, zh: &'a str, en: &'a str) -> &'a str {
        match self {
            Lang::Zh => zh,
            Lang::En => en,
        }
    }
}

impl Default for Lang {
    fn default() -> Self {
        Lang::Zh
    }
}
