use std::collections::HashMap;

use common::{AppError, AppResult};

/// 默认特征权重表, 也是初始化种子
///
/// 权重存储不可用或为空时, 规则评分回退到这张表
pub const DEFAULT_WEIGHT_ROWS: [(&str, f64, &str); 10] = [
    ("credit_history", 2.5, "Credit history is the most important factor"),
    ("total_income", 2.0, "Total household income"),
    ("emi_income_ratio", 1.8, "EMI to income ratio"),
    ("loan_amount", 1.5, "Loan amount requested"),
    ("education", 1.2, "Education level"),
    ("property_area", 1.1, "Property location"),
    ("self_employed", 1.0, "Employment type"),
    ("married", 0.9, "Marital status"),
    ("dependents", 0.8, "Number of dependents"),
    ("gender", 0.5, "Gender (lowest weight for fairness)"),
];

pub fn default_weight_rows() -> Vec<(&'static str, f64, &'static str)> {
    DEFAULT_WEIGHT_ROWS.to_vec()
}

pub fn default_weights() -> HashMap<String, f64> {
    DEFAULT_WEIGHT_ROWS
        .iter()
        .map(|(name, weight, _)| (name.to_string(), *weight))
        .collect()
}

/// 权重取值范围 (0, 10]
pub fn validate_weight(weight: f64) -> AppResult<()> {
    if !(weight > 0.0 && weight <= 10.0) {
        return Err(AppError::validation("Weight must be between 0 and 10"));
    }
    Ok(())
}
