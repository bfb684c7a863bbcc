use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator, IntoStaticStr};

/// 系统用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr, IntoStaticStr)]
pub enum UserRole {
    /// 超级管理员
    #[serde(rename = "superadmin")]
    #[strum(to_string = "superadmin")]
    Superadmin,
    /// 银行经理
    #[serde(rename = "bank_manager")]
    #[strum(to_string = "bank_manager")]
    BankManager,
}

impl UserRole {
    /// 按存储字符串解析，未知角色返回 None
    pub fn parse(value: &str) -> Option<Self> {
        Self::iter().find(|v| v.as_ref() == value)
    }

    pub fn all_values() -> Vec<&'static str> {
        Self::iter().map(|v| -> &'static str { v.into() }).collect()
    }

    /// 用户管理权限（仅超级管理员）
    pub fn can_manage_users(&self) -> bool {
        matches!(self, UserRole::Superadmin)
    }

    /// 贷款审查权限（超级管理员与银行经理）
    pub fn can_review_loans(&self) -> bool {
        matches!(self, UserRole::Superadmin | UserRole::BankManager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(UserRole::parse("superadmin"), Some(UserRole::Superadmin));
        assert_eq!(UserRole::parse("bank_manager"), Some(UserRole::BankManager));
        assert_eq!(UserRole::parse("intern"), None);
    }

    #[test]
    fn test_capabilities() {
        assert!(UserRole::Superadmin.can_manage_users());
        assert!(UserRole::Superadmin.can_review_loans());
        assert!(!UserRole::BankManager.can_manage_users());
        assert!(UserRole::BankManager.can_review_loans());
    }
}
