use std::collections::HashSet;
use std::io::Read;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use taxplan_core::calculations::TaxLiabilityCalculator;
use taxplan_core::calculations::common::financial_year;
use taxplan_core::models::lenient;
use taxplan_core::{
    ClientTaxProfile, IncomeDetails, IncomeType, Investments, MaritalStatus, NewTaxPlan,
    PersonalInfo, RepositoryError, Section80C, Section80Ccd1b, Section80D, TaxPlanRepository,
};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading client profiles.
#[derive(Debug, Error)]
pub enum ProfileLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Row {0} has no client_id")]
    MissingClientId(usize),

    #[error("Client '{0}' appears more than once")]
    DuplicateClient(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for ProfileLoaderError {
    fn from(err: csv::Error) -> Self {
        ProfileLoaderError::CsvParse(err.to_string())
    }
}

/// One row of the client profile CSV.
///
/// Every column except `client_id` may be empty; empty amounts read as zero
/// and unrecognised enum values fall back to their defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientProfileRecord {
    pub client_id: String,
    #[serde(deserialize_with = "lenient::date")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::enumeration")]
    pub marital_status: MaritalStatus,
    #[serde(deserialize_with = "lenient::count")]
    pub number_of_dependents: u32,
    #[serde(deserialize_with = "lenient::enumeration")]
    pub income_type: IncomeType,
    #[serde(deserialize_with = "lenient::amount")]
    pub annual_income: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub monthly_income: Decimal,
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
    #[serde(deserialize_with = "lenient::amount")]
    pub health_self_family: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub health_parents: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub health_senior_citizen: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub nps_additional: Decimal,
}

impl ClientProfileRecord {
    pub fn to_profile(&self) -> ClientTaxProfile {
        ClientTaxProfile {
            personal_info: PersonalInfo {
                date_of_birth: self.date_of_birth,
                marital_status: self.marital_status,
                number_of_dependents: self.number_of_dependents,
            },
            income: IncomeDetails {
                annual_income: self.annual_income,
                monthly_income: self.monthly_income,
                income_type: self.income_type,
            },
            investments: Investments {
                section_80c: Section80C {
                    ppf: self.ppf,
                    epf: self.epf,
                    elss: self.elss,
                    nsc: self.nsc,
                    life_insurance: self.life_insurance,
                    tuition_fees: self.tuition_fees,
                    principal_repayment: self.principal_repayment,
                },
                section_80d: Section80D {
                    self_family: self.health_self_family,
                    parents: self.health_parents,
                    senior_citizen: self.health_senior_citizen,
                },
                section_80ccd1b: Section80Ccd1b {
                    nps_additional: self.nps_additional,
                },
            },
        }
    }
}

/// Batch loader for client profiles from CSV.
pub struct ClientProfileLoader;

impl ClientProfileLoader {
    /// Parses and validates records. Client ids are trimmed and must be
    /// present and unique.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ClientProfileRecord>, ProfileLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();
        let mut seen = HashSet::new();

        for (index, result) in csv_reader.deserialize().enumerate() {
            let mut record: ClientProfileRecord = result?;
            record.client_id = record.client_id.trim().to_string();

            if record.client_id.is_empty() {
                // Header is line 1.
                return Err(ProfileLoaderError::MissingClientId(index + 2));
            }
            if !seen.insert(record.client_id.clone()) {
                return Err(ProfileLoaderError::DuplicateClient(record.client_id));
            }
            records.push(record);
        }

        Ok(records)
    }

    /// Stores each record as a plan carrying its current liability.
    ///
    /// Loading replaces any earlier plan for the same client, including its
    /// recommendations, so reloading the same file is idempotent.
    pub async fn load<R: TaxPlanRepository + ?Sized>(
        repo: &R,
        records: &[ClientProfileRecord],
        as_of: NaiveDate,
    ) -> Result<usize, ProfileLoaderError> {
        let calculator = TaxLiabilityCalculator::new();
        let year = financial_year(as_of);

        for record in records {
            let profile = record.to_profile();
            let scenario = calculator.current_scenario(&profile, as_of);
            debug!(
                client_id = %record.client_id,
                liability = %scenario.tax_liability,
                "loading client profile"
            );

            repo.upsert_plan(NewTaxPlan {
                client_id: record.client_id.clone(),
                financial_year: year.clone(),
                profile,
                ai_recommendations: None,
                current_tax_liability: scenario.tax_liability,
                optimized_tax_liability: None,
            })
            .await?;
        }

        info!(count = records.len(), financial_year = %year, "loaded client profiles");
        Ok(records.len())
    }
}
