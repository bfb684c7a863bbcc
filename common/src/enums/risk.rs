use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator, IntoStaticStr};

/// 审批决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr, IntoStaticStr)]
pub enum LoanDecision {
    #[strum(to_string = "Yes")]
    Yes,
    #[strum(to_string = "No")]
    No,
}

impl LoanDecision {
    pub fn parse(value: &str) -> Option<Self> {
        Self::iter().find(|v| v.as_ref() == value)
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, LoanDecision::Yes)
    }
}

/// 风险分档
///
/// 风险分 0-100：<30 低风险，30-70 中风险，>70 高风险
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr, IntoStaticStr)]
pub enum RiskCategory {
    #[strum(to_string = "Low")]
    Low,
    #[strum(to_string = "Medium")]
    Medium,
    #[strum(to_string = "High")]
    High,
}

impl RiskCategory {
    pub fn from_score(score: i32) -> Self {
        if score < 30 {
            RiskCategory::Low
        } else if score <= 70 {
            RiskCategory::Medium
        } else {
            RiskCategory::High
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::iter().find(|v| v.as_ref() == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_score_boundaries() {
        assert_eq!(RiskCategory::from_score(0), RiskCategory::Low);
        assert_eq!(RiskCategory::from_score(29), RiskCategory::Low);
        assert_eq!(RiskCategory::from_score(30), RiskCategory::Medium);
        assert_eq!(RiskCategory::from_score(70), RiskCategory::Medium);
        assert_eq!(RiskCategory::from_score(71), RiskCategory::High);
        assert_eq!(RiskCategory::from_score(100), RiskCategory::High);
    }

    #[test]
    fn test_decision_parse() {
        assert_eq!(LoanDecision::parse("Yes"), Some(LoanDecision::Yes));
        assert_eq!(LoanDecision::parse("Maybe"), None);
        assert!(LoanDecision::Yes.is_approved());
        assert!(!LoanDecision::No.is_approved());
    }
}
