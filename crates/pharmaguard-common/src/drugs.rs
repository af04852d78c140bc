//! The closed catalog of drugs the analysis service supports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DrugCode {
    Codeine,
    Warfarin,
    Clopidogrel,
    Simvastatin,
    Azathioprine,
    Fluorouracil,
}

impl DrugCode {
    /// Catalog order, as presented to the user.
    pub const ALL: [DrugCode; 6] = [
        DrugCode::Codeine,
        DrugCode::Warfarin,
        DrugCode::Clopidogrel,
        DrugCode::Simvastatin,
        DrugCode::Azathioprine,
        DrugCode::Fluorouracil,
    ];

    /// Canonical uppercase identifier sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            DrugCode::Codeine      => "CODEINE",
            DrugCode::Warfarin     => "WARFARIN",
            DrugCode::Clopidogrel  => "CLOPIDOGREL",
            DrugCode::Simvastatin  => "SIMVASTATIN",
            DrugCode::Azathioprine => "AZATHIOPRINE",
            DrugCode::Fluorouracil => "FLUOROURACIL",
        }
    }

    /// Pharmacogene the service evaluates for this drug.
    pub fn primary_gene(&self) -> &'static str {
        match self {
            DrugCode::Codeine      => "CYP2D6",
            DrugCode::Warfarin     => "CYP2C9",
            DrugCode::Clopidogrel  => "CYP2C19",
            DrugCode::Simvastatin  => "SLCO1B1",
            DrugCode::Azathioprine => "TPMT",
            DrugCode::Fluorouracil => "DPYD",
        }
    }
}

impl fmt::Display for DrugCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown drug {0:?}, expected one of CODEINE, WARFARIN, CLOPIDOGREL, SIMVASTATIN, AZATHIOPRINE, FLUOROURACIL")]
pub struct UnknownDrug(pub String);

impl FromStr for DrugCode {
    type Err = UnknownDrug;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DrugCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownDrug(s.to_string()))
    }
}
