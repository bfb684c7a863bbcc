use std::collections::HashMap;

use common::enums::{Education, PropertyArea, YesNo};

use crate::features::DerivedFeatures;
use crate::validator::ValidatedApplication;
use crate::weights::default_weights;

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// 各特征的风险值, 统一归一到 [0, 1], 1 为最高风险
///
/// gender 取常量 0.5: 权重参与计算, 取值不区分申请人
pub fn factor_values(
    app: &ValidatedApplication,
    features: &DerivedFeatures,
) -> Vec<(&'static str, f64)> {
    vec![
        (
            "credit_history",
            if app.credit_history == 1 { 0.0 } else { 1.0 },
        ),
        (
            "total_income",
            clamp01(1.0 - features.total_income / 10000.0),
        ),
        (
            "emi_income_ratio",
            clamp01(features.emi_income_ratio / 0.8),
        ),
        ("loan_amount", clamp01(app.loan_amount / 700.0)),
        (
            "education",
            match app.education {
                Education::Graduate => 0.0,
                Education::NotGraduate => 1.0,
            },
        ),
        (
            "self_employed",
            match app.self_employed {
                YesNo::No => 0.0,
                YesNo::Yes => 1.0,
            },
        ),
        (
            "married",
            match app.married {
                YesNo::Yes => 0.0,
                YesNo::No => 1.0,
            },
        ),
        ("dependents", clamp01(app.dependents as f64 / 5.0)),
        (
            "property_area",
            match app.property_area {
                PropertyArea::Urban => 0.0,
                PropertyArea::Semiurban => 0.5,
                PropertyArea::Rural => 1.0,
            },
        ),
        ("gender", 0.5),
    ]
}

/// 加权平均风险分: round(100 * Σ(w*v) / Σw)
///
/// 只统计权重表中存在的特征; 权重表为空或权重和为 0 时使用默认表
pub fn weighted_risk_score(
    factors: &[(&'static str, f64)],
    weights: &HashMap<String, f64>,
) -> i32 {
    let mean = match weighted_mean(factors, weights) {
        Some(mean) => mean,
        None => {
            let defaults = default_weights();
            weighted_mean(factors, &defaults).unwrap_or(0.5)
        }
    };
    ((mean * 100.0).round() as i32).clamp(0, 100)
}

fn weighted_mean(factors: &[(&'static str, f64)], weights: &HashMap<String, f64>) -> Option<f64> {
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (name, value) in factors {
        if let Some(weight) = weights.get(*name) {
            numerator += weight * value;
            denominator += weight;
        }
    }
    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        None
    }
}

/// 风险值 <= 0.3 计入正面因素, >= 0.6 计入风险因素
///
/// gender 不参与画像描述
pub fn factor_labels(factors: &[(&'static str, f64)]) -> (Vec<String>, Vec<String>) {
    let mut positive = Vec::new();
    let mut risky = Vec::new();
    for (name, value) in factors {
        let Some((good, bad)) = label_pair(name) else {
            continue;
        };
        if *value <= 0.3 {
            positive.push(good.to_string());
        } else if *value >= 0.6 {
            risky.push(bad.to_string());
        }
    }
    (positive, risky)
}

fn label_pair(feature: &str) -> Option<(&'static str, &'static str)> {
    match feature {
        "credit_history" => Some(("good credit history", "poor credit history")),
        "total_income" => Some(("adequate income level", "insufficient income")),
        "emi_income_ratio" => Some(("manageable EMI burden", "high EMI-to-income ratio")),
        "loan_amount" => Some(("modest loan amount", "large loan amount")),
        "education" => Some(("graduate education", "non-graduate education")),
        "self_employed" => Some(("salaried employment", "self-employment income volatility")),
        "married" => Some(("married household", "single applicant household")),
        "dependents" => Some(("few dependents", "many dependents")),
        "property_area" => Some(("urban property location", "rural property location")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::enums::Gender;

    fn good_applicant() -> (ValidatedApplication, DerivedFeatures) {
        let app = ValidatedApplication {
            gender: Gender::Male,
            married: YesNo::Yes,
            dependents: 0,
            education: Education::Graduate,
            self_employed: YesNo::No,
            applicant_income: 5849.0,
            coapplicant_income: 0.0,
            loan_amount: 128.0,
            loan_amount_term: 360.0,
            credit_history: 1,
            property_area: PropertyArea::Urban,
        };
        let features = crate::features::derive_features(&app);
        (app, features)
    }

    fn bad_applicant() -> (ValidatedApplication, DerivedFeatures) {
        let app = ValidatedApplication {
            gender: Gender::Female,
            married: YesNo::No,
            dependents: 5,
            education: Education::NotGraduate,
            self_employed: YesNo::Yes,
            applicant_income: 2000.0,
            coapplicant_income: 0.0,
            loan_amount: 600.0,
            loan_amount_term: 12.0,
            credit_history: 0,
            property_area: PropertyArea::Rural,
        };
        let features = crate::features::derive_features(&app);
        (app, features)
    }

    #[test]
    fn test_factor_values_are_normalized() {
        let (app, features) = bad_applicant();
        for (name, value) in factor_values(&app, &features) {
            println!("{} = {}", name, value);
            assert!((0.0..=1.0).contains(&value), "{} out of range", name);
        }
    }

    #[test]
    fn test_good_applicant_scores_low() {
        let (app, features) = good_applicant();
        let factors = factor_values(&app, &features);
        let score = weighted_risk_score(&factors, &default_weights());
        println!("good applicant risk = {}", score);
        assert_eq!(score, 11);
    }

    #[test]
    fn test_bad_applicant_scores_high() {
        let (app, features) = bad_applicant();
        let factors = factor_values(&app, &features);
        let score = weighted_risk_score(&factors, &default_weights());
        println!("bad applicant risk = {}", score);
        assert_eq!(score, 87);
        assert!(score > 70);
    }

    #[test]
    fn test_empty_weights_fall_back_to_defaults() {
        let (app, features) = good_applicant();
        let factors = factor_values(&app, &features);
        let with_defaults = weighted_risk_score(&factors, &default_weights());
        let with_empty = weighted_risk_score(&factors, &HashMap::new());
        assert_eq!(with_defaults, with_empty);
    }

    #[test]
    fn test_weight_change_moves_score() {
        let (app, features) = bad_applicant();
        let factors = factor_values(&app, &features);
        let base = weighted_risk_score(&factors, &default_weights());

        // 调低信用历史权重后, 信用差的申请整体风险应下降
        let mut weights = default_weights();
        weights.insert("credit_history".to_string(), 0.1);
        let adjusted = weighted_risk_score(&factors, &weights);
        println!("base = {}, adjusted = {}", base, adjusted);
        assert!(adjusted < base);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let (app, features) = good_applicant();
        let factors = factor_values(&app, &features);
        let weights = default_weights();
        let first = weighted_risk_score(&factors, &weights);
        for _ in 0..10 {
            assert_eq!(weighted_risk_score(&factors, &weights), first);
        }
    }

    #[test]
    fn test_factor_labels_split() {
        let (app, features) = good_applicant();
        let factors = factor_values(&app, &features);
        let (positive, risky) = factor_labels(&factors);
        println!("positive: {:?}, risky: {:?}", positive, risky);
        assert!(positive.contains(&"good credit history".to_string()));
        assert!(positive.contains(&"manageable EMI burden".to_string()));
        assert!(risky.is_empty());
        // gender 恒为 0.5, 不出现在任何一侧
        assert!(!positive.iter().any(|label| label.contains("gender")));

        let (app, features) = bad_applicant();
        let factors = factor_values(&app, &features);
        let (_, risky) = factor_labels(&factors);
        assert!(risky.contains(&"poor credit history".to_string()));
        assert!(risky.contains(&"insufficient income".to_string()));
    }
}
