use rbatis::{crud, impl_select};
use rbatis::rbdc::datetime::DateTime;
use serde::{Deserialize, Serialize};

/// 贷款申请
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanApplication {
    pub id: Option<i64>,
    /// 业务编号, 形如 LOAN_20260821_9F3A21BC
    pub application_id: Option<String>,

    // 申请人画像
    pub gender: Option<String>,
    pub married: Option<String>,
    pub dependents: Option<i32>,
    pub education: Option<String>,
    pub self_employed: Option<String>,
    pub applicant_income: Option<f64>,
    pub coapplicant_income: Option<f64>,
    pub loan_amount: Option<f64>,
    pub loan_amount_term: Option<f64>,
    pub credit_history: Option<i32>,
    pub property_area: Option<String>,

    // 衍生特征
    pub total_income: Option<f64>,
    pub emi: Option<f64>,
    pub emi_income_ratio: Option<f64>,
    pub loan_income_ratio: Option<f64>,

    // 预测结果
    pub loan_decision: Option<String>,
    pub risk_score: Option<i32>,
    pub risk_category: Option<String>,
    pub justification: Option<String>,
    pub recommendation: Option<String>,
    pub confidence_score: Option<f64>,
    pub prediction_method: Option<String>,

    // 人工复核
    pub final_status: Option<String>,
    pub admin_notes: Option<String>,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime>,

    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

crud!(LoanApplication {}, "loan_application");
impl_select!(LoanApplication{select_by_application_id(application_id: &str) -> Option => "`where application_id = #{application_id} LIMIT 1`"});

impl LoanApplication {
    pub const TABLE_NAME: &'static str = "loan_application";
}
