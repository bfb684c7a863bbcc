use serde::Serialize;

/// 预测结果响应
#[derive(Debug, Serialize)]
pub struct LoanPredictionDto {
    pub application_id: String,
    /// "Yes" / "No"
    pub loan_decision: String,
    /// 0-100
    pub risk_score: i32,
    /// "Low" / "Medium" / "High"
    pub risk_category: String,
    pub justification: String,
    pub recommendation: String,
    pub confidence_score: f64,
    pub key_positive_factors: Vec<String>,
    pub key_risk_factors: Vec<String>,
    pub total_income: f64,
    pub emi: f64,
    pub emi_income_ratio: f64,
    pub loan_income_ratio: f64,
    /// "ml_model" / "rule_based"
    pub prediction_method: String,
}
