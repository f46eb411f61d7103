use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Chapter VI-A sections the engine optimises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeductionSection {
    #[serde(rename = "80C")]
    Section80C,
    #[serde(rename = "80D")]
    Section80D,
    #[serde(rename = "80CCD1B")]
    Section80Ccd1b,
}

impl DeductionSection {
    pub const ALL: [DeductionSection; 3] = [Self::Section80C, Self::Section80D, Self::Section80Ccd1b];

    /// Statutory cap for the section.
    pub fn limit(&self) -> Decimal {
        match self {
            Self::Section80C => Decimal::from(150_000),
            Self::Section80D => Decimal::from(25_000),
            Self::Section80Ccd1b => Decimal::from(50_000),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Section80C => "80C",
            Self::Section80D => "80D",
            Self::Section80Ccd1b => "80CCD1B",
        }
    }

    /// Chart label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Section80C => "Section 80C",
            Self::Section80D => "Section 80D",
            Self::Section80Ccd1b => "Section 80CCD(1B)",
        }
    }
}

impl fmt::Display for DeductionSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeductionSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();
        match key.trim_start_matches("SECTION") {
            "80C" => Ok(Self::Section80C),
            "80D" => Ok(Self::Section80D),
            "80CCD1B" | "80CCD" => Ok(Self::Section80Ccd1b),
            _ => Err(format!("unknown deduction section '{s}'")),
        }
    }
}

/// Capped deduction totals for one scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionBundle {
    #[serde(rename = "section80C")]
    pub section_80c: Decimal,
    #[serde(rename = "section80D")]
    pub section_80d: Decimal,
    #[serde(rename = "section80CCD1B")]
    pub section_80ccd1b: Decimal,
    pub total: Decimal,
}

impl DeductionBundle {
    pub fn get(&self, section: DeductionSection) -> Decimal {
        match section {
            DeductionSection::Section80C => self.section_80c,
            DeductionSection::Section80D => self.section_80d,
            DeductionSection::Section80Ccd1b => self.section_80ccd1b,
        }
    }
}

/// How much of a section's cap a client is already using.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionUtilization {
    pub section: DeductionSection,
    pub claimed: Decimal,
    pub limit: Decimal,
    pub remaining: Decimal,
    pub utilization_percentage: Decimal,
}
