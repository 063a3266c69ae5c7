/// Property-based tests using proptest
/// Tests invariants and properties that should hold for all inputs
use proptest::prelude::*;
use credit_risk_form::models::{BorrowerRecord, RiskTier};
use credit_risk_form::risk::tier;
use credit_risk_form::schema::FEATURES;

// Property: tier bands are half-open on the lower bound
proptest! {
    #[test]
    fn low_band(p in 0.0f64..0.30) {
        prop_assert_eq!(tier(p), RiskTier::Low);
    }

    #[test]
    fn medium_band(p in 0.30f64..0.60) {
        prop_assert_eq!(tier(p), RiskTier::Medium);
    }

    #[test]
    fn high_band(p in 0.60f64..=1.0) {
        prop_assert_eq!(tier(p), RiskTier::High);
    }

    #[test]
    fn tier_is_deterministic(p in 0.0f64..=1.0) {
        prop_assert_eq!(tier(p), tier(p));
    }

    #[test]
    fn tier_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let rank = |t: RiskTier| match t {
            RiskTier::Low => 0,
            RiskTier::Medium => 1,
            RiskTier::High => 2,
        };
        prop_assert!(rank(tier(lo)) <= rank(tier(hi)));
    }
}

// Property: records inside every control's bounds pass the domain check
proptest! {
    #[test]
    fn in_range_records_accepted(
        age in 18i64..=100,
        income in 0.0f64..=100_000.0,
        loan_amount in 0.0f64..=50_000.0,
        credit_score in 0i64..=1000,
        debt_ratio in 0.0f64..=1.0,
        region in 0i64..=2,
        education in 0i64..=2
    ) {
        let record = BorrowerRecord {
            age,
            income,
            loan_amount,
            credit_score,
            debt_ratio,
            region,
            education,
            ..BorrowerRecord::default()
        };
        prop_assert!(record.check_domain().is_ok());
    }

    #[test]
    fn feature_vector_matches_schema_order(age in 18i64..=100, balance in 0.0f64..=100_000.0) {
        let record = BorrowerRecord { age, balance, ..BorrowerRecord::default() };
        let vector = record.feature_vector();
        for (i, spec) in FEATURES.iter().enumerate() {
            prop_assert_eq!(vector[i], record.value(spec.id).as_f64());
        }
    }

    #[test]
    fn age_below_range_rejected(age in -50i64..18) {
        let record = BorrowerRecord { age, ..BorrowerRecord::default() };
        prop_assert!(record.check_domain().is_err());
    }
}
