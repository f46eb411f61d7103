mod client_profile;
mod deduction;
pub mod lenient;
mod recommendation;
mod scenario;
mod tax_plan;
mod visualization;

pub use client_profile::{
    AgeBand, ClientTaxProfile, IncomeDetails, IncomeType, Investments, MaritalStatus,
    PersonalInfo, Section80C, Section80Ccd1b, Section80D,
};
pub use deduction::{DeductionBundle, DeductionSection, DeductionUtilization};
pub use recommendation::{
    AiRecommendationSet, Priority, RawRecommendation, Recommendation, RecommendationCategory,
    RiskLevel,
};
pub use scenario::{ComparisonResult, TaxScenario};
pub use tax_plan::{NewTaxPlan, TaxPlan};
pub use visualization::{
    BeforeAfterComparison, ChartData, ChartKind, Charts, Dataset, ImplementationStatus,
    PayloadSummary, TimelineItem, VisualizationPayload,
};
