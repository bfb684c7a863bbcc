use serde::Serialize;

use crate::validator::ValidatedApplication;

/// 衍生特征
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedFeatures {
    /// 家庭总收入 = 申请人收入 + 共同申请人收入
    pub total_income: f64,
    /// 月供 = 贷款金额 / 期数
    pub emi: f64,
    /// 月供收入比, 总收入为 0 时取 0
    pub emi_income_ratio: f64,
    /// 贷款收入比, 总收入为 0 时取 0
    pub loan_income_ratio: f64,
}

pub fn derive_features(app: &ValidatedApplication) -> DerivedFeatures {
    let total_income = app.applicant_income + app.coapplicant_income;
    let emi = app.loan_amount / app.loan_amount_term;
    let (emi_income_ratio, loan_income_ratio) = if total_income > 0.0 {
        (emi / total_income, app.loan_amount / total_income)
    } else {
        (0.0, 0.0)
    };
    DerivedFeatures {
        total_income,
        emi,
        emi_income_ratio,
        loan_income_ratio,
    }
}
