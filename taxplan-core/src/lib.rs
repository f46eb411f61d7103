//! Tax-planning engine for Indian individual income tax (old regime).
//!
//! `ClientTaxProfile → DeductionBundle → TaxScenario → ComparisonResult →
//! VisualizationPayload`, with AI recommendations normalised on the side.

pub mod calculations;
pub mod db;
pub mod diagnostics;
pub mod models;
pub mod recommendations;
pub mod service;
pub mod visualization;

pub use db::repository::{RepositoryError, TaxPlanRepository};
pub use diagnostics::{DiagnosticReport, diagnose};
pub use models::*;
pub use recommendations::{AdvisorError, RecommendationSource, TaxAdvisor};
pub use service::{PlanAnalysis, PlanOutcome, TaxPlanningService};
pub use visualization::VisualizationBuilder;
