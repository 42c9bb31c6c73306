/// Property-based tests using proptest
/// Invariants of scoring over the whole valid customer domain
mod common;

use churn_risk_scorer::{
    models::{ArtifactLoader, ArtifactPaths},
    types::{CustomerRecord, Gender, Geography, RiskVerdict},
    ScoringContext,
};
use common::ArtifactDir;
use proptest::prelude::*;
use std::sync::OnceLock;

fn context() -> &'static ScoringContext {
    static CONTEXT: OnceLock<ScoringContext> = OnceLock::new();
    CONTEXT.get_or_init(|| {
        let dir = ArtifactDir::with_fixtures();
        let artifacts = ArtifactLoader::new(ArtifactPaths::in_dir(dir.path()))
            .load()
            .unwrap();
        ScoringContext::from(artifacts)
    })
}

fn customer() -> impl Strategy<Value = CustomerRecord> {
    (
        (300u16..=900, 0usize..3, 0usize..2, 18u8..=100, 0u8..=10),
        (0.0f64..300000.0, 1u8..=4, 0u8..=1, 0u8..=1, 0.0f64..250000.0),
    )
        .prop_map(
            |(
                (credit_score, geography, gender, age, tenure),
                (balance, num_of_products, has_cr_card, is_active_member, estimated_salary),
            )| CustomerRecord {
                credit_score,
                geography: Geography::ALL[geography],
                gender: Gender::ALL[gender],
                age,
                tenure,
                balance,
                num_of_products,
                has_cr_card,
                is_active_member,
                estimated_salary,
            },
        )
}

proptest! {
    #[test]
    fn generated_customers_are_in_domain(record in customer()) {
        prop_assert!(record.validate().is_ok());
    }

    #[test]
    fn probability_in_unit_interval_and_verdict_consistent(record in customer()) {
        let result = context().score(&record).unwrap();

        prop_assert!((0.0..=1.0).contains(&result.probability));
        prop_assert_eq!(
            result.verdict == RiskVerdict::AtRisk,
            result.probability >= 0.5
        );
    }

    #[test]
    fn scoring_is_repeatable(record in customer()) {
        let first = context().score(&record).unwrap();
        let second = context().score(&record).unwrap();
        prop_assert_eq!(first.probability.to_bits(), second.probability.to_bits());
    }

    #[test]
    fn percentage_has_two_decimals(record in customer()) {
        let formatted = context().score(&record).unwrap().percentage();
        let (_, decimals) = formatted.trim_end_matches('%').split_once('.').unwrap();
        prop_assert_eq!(decimals.len(), 2);
    }
}
