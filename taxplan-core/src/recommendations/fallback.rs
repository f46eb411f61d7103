//! Static recommendation set substituted when the advisor fails.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::calculations::common::financial_year_end;
use crate::models::{
    DeductionSection, Priority, Recommendation, RecommendationCategory, RiskLevel,
};

pub const FALLBACK_SUMMARY: &str = "Standard tax-saving recommendations based on \
     unused Chapter VI-A limits. Review with your advisor before acting.";

/// Default confidence for the fallback set.
pub const FALLBACK_CONFIDENCE: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// The fixed fallback recommendations, deadlines at the end of the financial
/// year containing `as_of`.
pub fn fallback_recommendations(as_of: NaiveDate) -> Vec<Recommendation> {
    let year_end = Some(financial_year_end(as_of));

    vec![
        Recommendation {
            category: RecommendationCategory::DeductionOptimization,
            priority: Priority::High,
            title: "Maximize Section 80C through ELSS or PPF".to_string(),
            description: "Use the full ₹1,50,000 Section 80C limit with ELSS funds for growth \
                          or PPF for guaranteed returns."
                .to_string(),
            potential_savings: Decimal::from(46_800),
            implementation_steps: vec![
                "Review existing EPF, insurance and tuition payments".to_string(),
                "Invest the remaining 80C headroom in ELSS or PPF".to_string(),
                "Keep investment proofs for your employer".to_string(),
            ],
            deadline: year_end,
            risk_level: RiskLevel::Low,
            section: Some(DeductionSection::Section80C),
        },
        Recommendation {
            category: RecommendationCategory::DeductionOptimization,
            priority: Priority::High,
            title: "Health insurance under Section 80D".to_string(),
            description: "Buy or top up health cover for yourself and your family to claim up to \
                          ₹25,000."
                .to_string(),
            potential_savings: Decimal::from(7_800),
            implementation_steps: vec![
                "Compare family floater policies".to_string(),
                "Pay the premium by a non-cash mode".to_string(),
            ],
            deadline: year_end,
            risk_level: RiskLevel::Low,
            section: Some(DeductionSection::Section80D),
        },
        Recommendation {
            category: RecommendationCategory::DeductionOptimization,
            priority: Priority::Medium,
            title: "Additional NPS contribution under Section 80CCD(1B)".to_string(),
            description: "Contribute up to ₹50,000 to NPS Tier 1 over and above the 80C limit."
                .to_string(),
            potential_savings: Decimal::from(15_600),
            implementation_steps: vec![
                "Open or locate your NPS Tier 1 account".to_string(),
                "Make a voluntary contribution before year end".to_string(),
            ],
            deadline: year_end,
            risk_level: RiskLevel::Medium,
            section: Some(DeductionSection::Section80Ccd1b),
        },
        Recommendation {
            category: RecommendationCategory::Compliance,
            priority: Priority::Medium,
            title: "Complete your financial profile".to_string(),
            description: "Missing income or investment details limit how precise these \
                          recommendations can be."
                .to_string(),
            potential_savings: Decimal::ZERO,
            implementation_steps: vec![
                "Add date of birth and income details".to_string(),
                "Record existing 80C, 80D and NPS investments".to_string(),
            ],
            deadline: None,
            risk_level: RiskLevel::Low,
            section: None,
        },
    ]
}
