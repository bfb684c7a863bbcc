use common::enums::{Education, Gender, PropertyArea, YesNo};
use common::models::LoanApplicationRequest;
use common::{AppError, AppResult};

/// 校验通过后的申请数据, 枚举字段已解析
#[derive(Debug, Clone)]
pub struct ValidatedApplication {
    pub gender: Gender,
    pub married: YesNo,
    pub dependents: i32,
    pub education: Education,
    pub self_employed: YesNo,
    pub applicant_income: f64,
    pub coapplicant_income: f64,
    pub loan_amount: f64,
    pub loan_amount_term: f64,
    pub credit_history: i32,
    pub property_area: PropertyArea,
}

fn required<T: Copy>(value: &Option<T>, name: &str) -> AppResult<T> {
    value
        .ok_or_else(|| AppError::validation(format!("Field '{}' is required", name)))
}

fn required_str<'a>(value: &'a Option<String>, name: &str) -> AppResult<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| AppError::validation(format!("Field '{}' is required", name)))
}

fn invalid_enum(name: &str, values: Vec<&'static str>) -> AppError {
    AppError::validation(format!("Field '{}' must be one of {:?}", name, values))
}

/// 校验贷款申请
///
/// 分两步汇总错误: 先检查必填字段, 全部存在后再逐项检查取值,
/// 所有问题一次性返回, 不在第一个错误处中断
pub fn validate_application(req: &LoanApplicationRequest) -> AppResult<ValidatedApplication> {
    // 必填字段
    let required_fields = [
        ("gender", req.gender.is_none()),
        ("married", req.married.is_none()),
        ("dependents", req.dependents.is_none()),
        ("education", req.education.is_none()),
        ("self_employed", req.self_employed.is_none()),
        ("applicant_income", req.applicant_income.is_none()),
        ("coapplicant_income", req.coapplicant_income.is_none()),
        ("loan_amount", req.loan_amount.is_none()),
        ("loan_amount_term", req.loan_amount_term.is_none()),
        ("credit_history", req.credit_history.is_none()),
        ("property_area", req.property_area.is_none()),
    ];
    let missing: Vec<String> = required_fields
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| format!("Field '{}' is required", name))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let gender_raw = required_str(&req.gender, "gender")?;
    let married_raw = required_str(&req.married, "married")?;
    let dependents = required(&req.dependents, "dependents")?;
    let education_raw = required_str(&req.education, "education")?;
    let self_employed_raw = required_str(&req.self_employed, "self_employed")?;
    let applicant_income = required(&req.applicant_income, "applicant_income")?;
    let coapplicant_income = required(&req.coapplicant_income, "coapplicant_income")?;
    let loan_amount = required(&req.loan_amount, "loan_amount")?;
    let loan_amount_term = required(&req.loan_amount_term, "loan_amount_term")?;
    let credit_history = required(&req.credit_history, "credit_history")?;
    let property_area_raw = required_str(&req.property_area, "property_area")?;

    let mut errors: Vec<String> = Vec::new();

    // 闭集字段取值
    let gender = Gender::parse(gender_raw);
    if gender.is_none() {
        errors.push(format!(
            "Field 'gender' must be one of {:?}",
            Gender::all_values()
        ));
    }
    let married = YesNo::parse(married_raw);
    if married.is_none() {
        errors.push(format!(
            "Field 'married' must be one of {:?}",
            YesNo::all_values()
        ));
    }
    let education = Education::parse(education_raw);
    if education.is_none() {
        errors.push(format!(
            "Field 'education' must be one of {:?}",
            Education::all_values()
        ));
    }
    let self_employed = YesNo::parse(self_employed_raw);
    if self_employed.is_none() {
        errors.push(format!(
            "Field 'self_employed' must be one of {:?}",
            YesNo::all_values()
        ));
    }
    let property_area = PropertyArea::parse(property_area_raw);
    if property_area.is_none() {
        errors.push(format!(
            "Field 'property_area' must be one of {:?}",
            PropertyArea::all_values()
        ));
    }
    if credit_history != 0 && credit_history != 1 {
        errors.push("Field 'credit_history' must be one of [0, 1]".to_string());
    }

    // 数值约束
    if applicant_income <= 0.0 {
        errors.push("Applicant income must be positive".to_string());
    }
    if coapplicant_income < 0.0 {
        errors.push("Co-applicant income cannot be negative".to_string());
    }
    if loan_amount <= 0.0 {
        errors.push("Loan amount must be positive".to_string());
    }
    if loan_amount_term <= 0.0 {
        errors.push("Loan amount term must be positive".to_string());
    }
    if dependents < 0 {
        errors.push("Number of dependents cannot be negative".to_string());
    }

    // 家庭总收入下限
    let total_income = applicant_income + coapplicant_income;
    if total_income < 1000.0 {
        errors.push("Total household income is too low".to_string());
    }

    // 月供不超过收入的 80%
    if loan_amount != 0.0 && loan_amount_term != 0.0 {
        let emi = loan_amount / loan_amount_term;
        let emi_ratio = if total_income > 0.0 {
            emi / total_income
        } else {
            f64::INFINITY
        };
        if emi_ratio > 0.8 {
            errors.push("EMI to income ratio is too high (>80%)".to_string());
        }
    }

    if !errors.is_empty() {
        return Err(AppError::validation(format!(
            "Validation errors: {}",
            errors.join("; ")
        )));
    }

    Ok(ValidatedApplication {
        gender: gender.ok_or_else(|| invalid_enum("gender", Gender::all_values()))?,
        married: married.ok_or_else(|| invalid_enum("married", YesNo::all_values()))?,
        dependents,
        education: education.ok_or_else(|| invalid_enum("education", Education::all_values()))?,
        self_employed: self_employed
            .ok_or_else(|| invalid_enum("self_employed", YesNo::all_values()))?,
        applicant_income,
        coapplicant_income,
        loan_amount,
        loan_amount_term,
        credit_history,
        property_area: property_area
            .ok_or_else(|| invalid_enum("property_area", PropertyArea::all_values()))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> LoanApplicationRequest {
        LoanApplicationRequest {
            gender: Some("Male".to_string()),
            married: Some("Yes".to_string()),
            dependents: Some(0),
            education: Some("Graduate".to_string()),
            self_employed: Some("No".to_string()),
            applicant_income: Some(5849.0),
            coapplicant_income: Some(0.0),
            loan_amount: Some(128.0),
            loan_amount_term: Some(360.0),
            credit_history: Some(1),
            property_area: Some("Urban".to_string()),
        }
    }

    #[test]
    fn test_valid_application_passes() {
        let app = validate_application(&valid_request()).unwrap();
        assert_eq!(app.gender, Gender::Male);
        assert_eq!(app.education, Education::Graduate);
        assert_eq!(app.credit_history, 1);
    }

    #[test]
    fn test_missing_fields_are_accumulated() {
        let mut req = valid_request();
        req.gender = None;
        req.loan_amount = None;
        let err = validate_application(&req).unwrap_err();
        let msg = err.message().to_string();
        println!("missing: {}", msg);
        assert!(msg.starts_with("Missing required fields: "));
        assert!(msg.contains("Field 'gender' is required"));
        assert!(msg.contains("Field 'loan_amount' is required"));
    }

    #[test]
    fn test_negative_income_rejected() {
        let mut req = valid_request();
        req.applicant_income = Some(-1000.0);
        let err = validate_application(&req).unwrap_err();
        assert!(err.message().contains("Applicant income must be positive"));
    }

    #[test]
    fn test_value_errors_are_accumulated() {
        let mut req = valid_request();
        req.gender = Some("male".to_string());
        req.coapplicant_income = Some(-1.0);
        req.dependents = Some(-2);
        let err = validate_application(&req).unwrap_err();
        let msg = err.message().to_string();
        println!("errors: {}", msg);
        assert!(msg.starts_with("Validation errors: "));
        assert!(msg.contains("Field 'gender' must be one of"));
        assert!(msg.contains("Co-applicant income cannot be negative"));
        assert!(msg.contains("Number of dependents cannot be negative"));
    }

    #[test]
    fn test_credit_history_closed_set() {
        let mut req = valid_request();
        req.credit_history = Some(2);
        let err = validate_application(&req).unwrap_err();
        assert!(err
            .message()
            .contains("Field 'credit_history' must be one of [0, 1]"));
    }

    #[test]
    fn test_low_total_income_rejected() {
        let mut req = valid_request();
        req.applicant_income = Some(600.0);
        req.coapplicant_income = Some(300.0);
        let err = validate_application(&req).unwrap_err();
        assert!(err.message().contains("Total household income is too low"));
    }

    #[test]
    fn test_emi_ratio_ceiling() {
        let mut req = valid_request();
        // emi = 50000/12 ≈ 4167, ratio ≈ 0.71 -> 通过
        req.applicant_income = Some(5849.0);
        req.loan_amount = Some(50000.0);
        req.loan_amount_term = Some(12.0);
        assert!(validate_application(&req).is_ok());

        // emi = 60000/12 = 5000, ratio ≈ 0.85 -> 超限
        req.loan_amount = Some(60000.0);
        let err = validate_application(&req).unwrap_err();
        assert!(err
            .message()
            .contains("EMI to income ratio is too high (>80%)"));
    }
}
