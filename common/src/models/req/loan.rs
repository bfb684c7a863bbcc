use serde::Deserialize;

// DTO for loan prediction
//
// 字段全部可选，由校验器逐项检查并汇总缺失/非法项，
// 避免反序列化阶段只报第一个错误
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoanApplicationRequest {
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
}

// DTO for admin override
#[derive(Debug, Deserialize)]
pub struct AdminDecisionRequest {
    /// 最终审批结果: "Yes" / "No"
    pub final_status: String,
    pub admin_notes: Option<String>,
}

// DTO for loan status update
#[derive(Debug, Deserialize)]
pub struct LoanStatusUpdateRequest {
    /// 最终审批结果: "Yes" / "No"
    pub status: String,
    pub notes: Option<String>,
}
