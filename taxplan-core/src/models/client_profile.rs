use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::lenient;

/// Everything the tax engine needs to know about a client.
///
/// Assembled by the caller from several collaborator records. Every monetary
/// leaf defaults to zero, so `ClientTaxProfile::default()` is the all-zero
/// profile and a partially populated JSON document never fails to load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientTaxProfile {
    pub personal_info: PersonalInfo,
    pub income: IncomeDetails,
    pub investments: Investments,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(deserialize_with = "lenient::date")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::enumeration")]
    pub marital_status: MaritalStatus,
    #[serde(deserialize_with = "lenient::count")]
    pub number_of_dependents: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IncomeDetails {
    #[serde(deserialize_with = "lenient::amount")]
    pub annual_income: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub monthly_income: Decimal,
    #[serde(deserialize_with = "lenient::enumeration")]
    pub income_type: IncomeType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Investments {
    #[serde(rename = "section80C")]
    pub section_80c: Section80C,
    #[serde(rename = "section80D")]
    pub section_80d: Section80D,
    #[serde(rename = "section80CCD1B")]
    pub section_80ccd1b: Section80Ccd1b,
}

/// Raw (uncapped) section 80C investment amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Section80C {
    #[serde(deserialize_with = "lenient::amount")]
    pub ppf: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub epf: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub elss: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub nsc: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub life_insurance: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub tuition_fees: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub principal_repayment: Decimal,
}

impl Section80C {
    pub fn raw_total(&self) -> Decimal {
        [
            self.ppf,
            self.epf,
            self.elss,
            self.nsc,
            self.life_insurance,
            self.tuition_fees,
            self.principal_repayment,
        ]
        .into_iter()
        .fold(Decimal::ZERO, Decimal::saturating_add)
    }
}

/// Raw (uncapped) section 80D health insurance premiums.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Section80D {
    #[serde(deserialize_with = "lenient::amount")]
    pub self_family: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub parents: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub senior_citizen: Decimal,
}

impl Section80D {
    pub fn raw_total(&self) -> Decimal {
        self.self_family
            .saturating_add(self.parents)
            .saturating_add(self.senior_citizen)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Section80Ccd1b {
    #[serde(deserialize_with = "lenient::amount")]
    pub nps_additional: Decimal,
}

impl ClientTaxProfile {
    /// Annual income used for every calculation.
    ///
    /// The declared annual figure wins; when it is zero the monthly figure is
    /// annualised.
    pub fn annual_income(&self) -> Decimal {
        if self.income.annual_income > Decimal::ZERO {
            self.income.annual_income
        } else {
            self.income.monthly_income.saturating_mul(Decimal::from(12))
        }
    }

    /// Age in whole calendar years as of `as_of`, ignoring month and day.
    pub fn age(&self, as_of: NaiveDate) -> Option<i32> {
        self.personal_info
            .date_of_birth
            .map(|dob| as_of.year() - dob.year())
    }

    pub fn age_band(&self, as_of: NaiveDate) -> AgeBand {
        self.age(as_of).map(AgeBand::from_age).unwrap_or_default()
    }
}

/// Slab schedule selector derived from the client's age.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    #[default]
    Normal,
    /// 60 to 79 years.
    Senior,
    /// 80 years and above.
    SuperSenior,
}

impl AgeBand {
    pub fn from_age(age: i32) -> Self {
        if age >= 80 {
            Self::SuperSenior
        } else if age >= 60 {
            Self::Senior
        } else {
            Self::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Senior => "senior",
            Self::SuperSenior => "super_senior",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
    #[default]
    Unknown,
}

impl FromStr for MaritalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "unmarried" => Ok(Self::Single),
            "married" => Ok(Self::Married),
            "divorced" => Ok(Self::Divorced),
            "widowed" | "widow" | "widower" => Ok(Self::Widowed),
            other => Err(format!("unknown marital status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeType {
    #[default]
    Salaried,
    Business,
    Professional,
    Mixed,
}

impl IncomeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Salaried => "salaried",
            Self::Business => "business",
            Self::Professional => "professional",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for IncomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncomeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "salaried" | "salary" => Ok(Self::Salaried),
            "business" => Ok(Self::Business),
            "professional" => Ok(Self::Professional),
            "mixed" => Ok(Self::Mixed),
            other => Err(format!("unknown income type '{other}'")),
        }
    }
}
