use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{info, warn};
use serde::Serialize;

use common::enums::{LoanDecision, RiskCategory};

use crate::features::DerivedFeatures;
use crate::model::ModelArtifact;
use crate::rules;
use crate::validator::ValidatedApplication;

pub const METHOD_ML_MODEL: &str = "ml_model";
pub const METHOD_RULE_BASED: &str = "rule_based";

/// 评分策略, 启动时按训练产物可用性选定一次
pub enum ScoringStrategy {
    Model(Box<ModelArtifact>),
    RuleBased,
}

/// 预测计数器, 仅用于运维观测
#[derive(Default)]
pub struct PredictionStats {
    total: AtomicU64,
    model: AtomicU64,
    fallback: AtomicU64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatsSnapshot {
    pub total_predictions: u64,
    pub model_predictions: u64,
    pub fallback_predictions: u64,
}

impl PredictionStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_predictions: self.total.load(Ordering::Relaxed),
            model_predictions: self.model.load(Ordering::Relaxed),
            fallback_predictions: self.fallback.load(Ordering::Relaxed),
        }
    }
}

/// 预测结果
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub loan_decision: LoanDecision,
    /// 0-100
    pub risk_score: i32,
    pub risk_category: RiskCategory,
    pub recommendation: String,
    pub confidence_score: f64,
    pub key_positive_factors: Vec<String>,
    pub key_risk_factors: Vec<String>,
    pub prediction_method: String,
}

/// 贷款预测器
///
/// 模型产物存在则走线性模型, 否则回退到加权规则评分,
/// 两条路径输出同一种结果结构
pub struct Predictor {
    strategy: ScoringStrategy,
    stats: PredictionStats,
}

impl Predictor {
    pub fn new(strategy: ScoringStrategy) -> Self {
        Self {
            strategy,
            stats: PredictionStats::default(),
        }
    }

    pub fn rule_based() -> Self {
        Self::new(ScoringStrategy::RuleBased)
    }

    /// 从配置路径加载训练产物, 失败时回退到规则评分, 不向上抛错
    pub fn from_artifact_path(path: &str) -> Self {
        if !Path::new(path).exists() {
            info!("📦 模型文件不存在: {}, 使用规则评分", path);
            return Self::rule_based();
        }
        match ModelArtifact::load(path) {
            Ok(artifact) => {
                info!(
                    "✅ 模型加载成功: {} (version={})",
                    path,
                    artifact.version.as_deref().unwrap_or("unknown")
                );
                Self::new(ScoringStrategy::Model(Box::new(artifact)))
            }
            Err(e) => {
                warn!("⚠️ 模型加载失败: {}, 使用规则评分", e);
                Self::rule_based()
            }
        }
    }

    pub fn is_model_loaded(&self) -> bool {
        matches!(self.strategy, ScoringStrategy::Model(_))
    }

    pub fn method(&self) -> &'static str {
        match self.strategy {
            ScoringStrategy::Model(_) => METHOD_ML_MODEL,
            ScoringStrategy::RuleBased => METHOD_RULE_BASED,
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// 对已校验的申请打分
    ///
    /// 相同输入 + 相同权重 => 相同输出
    pub fn predict(
        &self,
        app: &ValidatedApplication,
        features: &DerivedFeatures,
        weights: &HashMap<String, f64>,
    ) -> PredictionOutcome {
        self.stats.total.fetch_add(1, Ordering::Relaxed);

        let factors = rules::factor_values(app, features);
        let (decision, risk_score, confidence) = match &self.strategy {
            ScoringStrategy::Model(artifact) => {
                self.stats.model.fetch_add(1, Ordering::Relaxed);
                let p = artifact.approval_probability(app, features);
                let decision = if p >= 0.5 {
                    LoanDecision::Yes
                } else {
                    LoanDecision::No
                };
                let risk_score = (((1.0 - p) * 100.0).round() as i32).clamp(0, 100);
                (decision, risk_score, p.max(1.0 - p))
            }
            ScoringStrategy::RuleBased => {
                self.stats.fallback.fetch_add(1, Ordering::Relaxed);
                let risk_score = rules::weighted_risk_score(&factors, weights);
                let decision = if risk_score < 50 {
                    LoanDecision::Yes
                } else {
                    LoanDecision::No
                };
                let confidence = 0.5 + f64::from((risk_score - 50).abs()) / 100.0;
                (decision, risk_score, confidence)
            }
        };

        let risk_category = RiskCategory::from_score(risk_score);
        let (key_positive_factors, key_risk_factors) = rules::factor_labels(&factors);

        PredictionOutcome {
            loan_decision: decision,
            risk_score,
            risk_category,
            recommendation: recommendation_for(risk_category).to_string(),
            confidence_score: confidence,
            key_positive_factors,
            key_risk_factors,
            prediction_method: self.method().to_string(),
        }
    }
}

pub fn recommendation_for(category: RiskCategory) -> &'static str {
    match category {
        RiskCategory::Low => "Approve",
        RiskCategory::Medium => "Manual review recommended",
        RiskCategory::High => "Reject",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::derive_features;
    use crate::weights::default_weights;
    use common::enums::{Education, Gender, PropertyArea, YesNo};
    use serde_json::json;

    fn sample_application() -> ValidatedApplication {
        ValidatedApplication {
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
        }
    }

    #[test]
    fn test_fallback_sample_is_low_risk_yes() {
        let predictor = Predictor::rule_based();
        let app = sample_application();
        let features = derive_features(&app);
        let outcome = predictor.predict(&app, &features, &default_weights());
        println!(
            "decision={:?} risk={} category={:?}",
            outcome.loan_decision, outcome.risk_score, outcome.risk_category
        );
        assert_eq!(outcome.loan_decision, LoanDecision::Yes);
        assert_eq!(outcome.risk_category, RiskCategory::Low);
        assert_eq!(outcome.recommendation, "Approve");
        assert_eq!(outcome.prediction_method, METHOD_RULE_BASED);
        assert!((0..=100).contains(&outcome.risk_score));
        assert!((0.5..=1.0).contains(&outcome.confidence_score));
    }

    #[test]
    fn test_missing_artifact_selects_fallback() {
        let predictor = Predictor::from_artifact_path("/nonexistent/loan_model.json");
        assert!(!predictor.is_model_loaded());
        assert_eq!(predictor.method(), METHOD_RULE_BASED);

        // 兜底路径依然产出完整结果
        let app = sample_application();
        let features = derive_features(&app);
        let outcome = predictor.predict(&app, &features, &default_weights());
        assert!(!outcome.recommendation.is_empty());
        assert!(!outcome.key_positive_factors.is_empty());
    }

    #[test]
    fn test_corrupt_artifact_selects_fallback() {
        let path = std::env::temp_dir().join("predictor_corrupt_model.json");
        std::fs::write(&path, "{ broken").unwrap();
        let predictor = Predictor::from_artifact_path(path.to_str().unwrap());
        assert!(!predictor.is_model_loaded());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_model_strategy_decision_boundary() {
        let artifact: ModelArtifact = serde_json::from_value(json!({
            "intercept": 2.0,
            "coefficients": {},
            "feature_names": []
        }))
        .unwrap();
        let predictor = Predictor::new(ScoringStrategy::Model(Box::new(artifact)));
        let app = sample_application();
        let features = derive_features(&app);
        let outcome = predictor.predict(&app, &features, &default_weights());

        // p = sigmoid(2.0) ≈ 0.8808 -> risk = 12
        assert_eq!(outcome.loan_decision, LoanDecision::Yes);
        assert_eq!(outcome.risk_score, 12);
        assert_eq!(outcome.prediction_method, METHOD_ML_MODEL);
        assert!((outcome.confidence_score - 0.880797).abs() < 1e-5);

        let rejecting: ModelArtifact = serde_json::from_value(json!({
            "intercept": -2.0,
            "coefficients": {},
            "feature_names": []
        }))
        .unwrap();
        let predictor = Predictor::new(ScoringStrategy::Model(Box::new(rejecting)));
        let outcome = predictor.predict(&app, &features, &default_weights());
        assert_eq!(outcome.loan_decision, LoanDecision::No);
        assert_eq!(outcome.risk_score, 88);
    }

    #[test]
    fn test_counters_track_methods() {
        let predictor = Predictor::rule_based();
        let app = sample_application();
        let features = derive_features(&app);
        let weights = default_weights();
        for _ in 0..3 {
            predictor.predict(&app, &features, &weights);
        }
        let stats = predictor.stats();
        assert_eq!(stats.total_predictions, 3);
        assert_eq!(stats.fallback_predictions, 3);
        assert_eq!(stats.model_predictions, 0);
    }

    #[test]
    fn test_weight_update_visible_to_next_prediction() {
        let predictor = Predictor::rule_based();
        let mut app = sample_application();
        app.credit_history = 0;
        let features = derive_features(&app);

        let before = predictor.predict(&app, &features, &default_weights());
        let mut adjusted = default_weights();
        adjusted.insert("credit_history".to_string(), 0.1);
        let after = predictor.predict(&app, &features, &adjusted);
        println!("before={} after={}", before.risk_score, after.risk_score);
        assert!(after.risk_score < before.risk_score);
    }

    #[test]
    fn test_determinism() {
        let predictor = Predictor::rule_based();
        let app = sample_application();
        let features = derive_features(&app);
        let weights = default_weights();
        let first = predictor.predict(&app, &features, &weights);
        for _ in 0..5 {
            let next = predictor.predict(&app, &features, &weights);
            assert_eq!(next.risk_score, first.risk_score);
            assert_eq!(next.loan_decision, first.loan_decision);
            assert_eq!(next.key_positive_factors, first.key_positive_factors);
        }
    }
}
