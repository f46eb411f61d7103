//! Data-completeness checks on a client profile.
//!
//! Each step appends to an explicit [`DiagnosticReport`]; nothing is shared
//! between calls.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::percentage;
use crate::models::{ClientTaxProfile, DeductionSection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warning,
    Missing,
}

impl CheckStatus {
    /// Weight towards the completeness score.
    fn weight(&self) -> Decimal {
        match self {
            Self::Pass => Decimal::ONE,
            Self::Warning => Decimal::new(5, 1),
            Self::Missing => Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticCheck {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub checks: Vec<DiagnosticCheck>,
    /// 0 to 100; a warning counts half.
    pub completeness_score: Decimal,
}

impl DiagnosticReport {
    fn record(
        &mut self,
        name: &str,
        status: CheckStatus,
        message: impl Into<String>,
    ) {
        self.checks.push(DiagnosticCheck {
            name: name.to_string(),
            status,
            message: message.into(),
        });
    }

    fn finish(mut self) -> Self {
        let earned: Decimal = self.checks.iter().map(|c| c.status.weight()).sum();
        self.completeness_score = percentage(earned, Decimal::from(self.checks.len()));
        self
    }

    pub fn has_missing(&self) -> bool {
        self.checks.iter().any(|c| c.status == CheckStatus::Missing)
    }
}

/// Runs every check in order: personal info, income, then each deduction
/// section.
pub fn diagnose(
    profile: &ClientTaxProfile,
    as_of: NaiveDate,
) -> DiagnosticReport {
    let mut report = DiagnosticReport::default();
    check_personal_info(profile, as_of, &mut report);
    check_income(profile, &mut report);
    check_section(
        DeductionSection::Section80C,
        profile.investments.section_80c.raw_total(),
        &mut report,
    );
    check_section(
        DeductionSection::Section80D,
        profile.investments.section_80d.raw_total(),
        &mut report,
    );
    check_section(
        DeductionSection::Section80Ccd1b,
        profile.investments.section_80ccd1b.nps_additional,
        &mut report,
    );
    report.finish()
}

fn check_personal_info(
    profile: &ClientTaxProfile,
    as_of: NaiveDate,
    report: &mut DiagnosticReport,
) {
    match profile.age(as_of) {
        None => report.record(
            "personal_info",
            CheckStatus::Missing,
            "Date of birth missing; normal slabs assumed",
        ),
        Some(age) if !(0..=120).contains(&age) => report.record(
            "personal_info",
            CheckStatus::Warning,
            format!("Implausible age {age} from date of birth"),
        ),
        Some(age) => report.record(
            "personal_info",
            CheckStatus::Pass,
            format!("Age {age}, {} slabs", profile.age_band(as_of).as_str()),
        ),
    }
}

fn check_income(
    profile: &ClientTaxProfile,
    report: &mut DiagnosticReport,
) {
    let income = &profile.income;
    let annual = profile.annual_income();

    if annual <= Decimal::ZERO {
        report.record("income", CheckStatus::Missing, "No annual or monthly income declared");
    } else if income.annual_income > Decimal::ZERO
        && income.monthly_income > Decimal::ZERO
        && income.monthly_income * Decimal::from(12) != income.annual_income
    {
        report.record(
            "income",
            CheckStatus::Warning,
            format!(
                "Annual income {} differs from 12 × monthly {}; annual figure used",
                income.annual_income, income.monthly_income
            ),
        );
    } else {
        report.record("income", CheckStatus::Pass, format!("Annual income {annual}"));
    }
}

fn check_section(
    section: DeductionSection,
    raw: Decimal,
    report: &mut DiagnosticReport,
) {
    let name = format!("section_{}", section.as_str().to_ascii_lowercase());
    let limit = section.limit();

    if raw.is_zero() {
        report.record(
            &name,
            CheckStatus::Missing,
            format!("No {} investments declared", section.label()),
        );
    } else if raw > limit {
        report.record(
            &name,
            CheckStatus::Warning,
            format!("{} declared {raw} exceeds the {limit} cap", section.label()),
        );
    } else {
        report.record(
            &name,
            CheckStatus::Pass,
            format!("{} declared {raw} of {limit}", section.label()),
        );
    }
}
