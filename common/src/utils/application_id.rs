// 申请编号生成
use chrono::Local;
use uuid::Uuid;

/// 生成贷款申请编号
///
/// 格式: LOAN_YYYYMMDD_XXXXXXXX（8位大写十六进制随机后缀）
pub fn generate_application_id() -> String {
    let date = Local::now().format("%Y%m%d");
    let hex = Uuid::new_v4().simple().to_string();
    format!("LOAN_{}_{}", date, hex[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let id = generate_application_id();
        println!("Generated application id: {}", id);
        assert!(id.starts_with("LOAN_"));
        // LOAN_ + 8位日期 + _ + 8位后缀
        assert_eq!(id.len(), 5 + 8 + 1 + 8);

        let suffix = &id[id.len() - 8..];
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_uniqueness() {
        let a = generate_application_id();
        let b = generate_application_id();
        assert_ne!(a, b);
    }
}
