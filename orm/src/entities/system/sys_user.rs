use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 系统用户表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SysUser {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    /// sha256 摘要, 不返回给前端
    pub password: Option<String>,
    /// superadmin / bank_manager
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub is_disabled: Option<bool>,
    pub created_by_id: Option<i64>,
    pub last_login: Option<DateTime>,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(SysUser {}, "sys_user");
impl_select!(SysUser{select_by_username(username: &str) -> Option => "`where username = #{username} LIMIT 1`"});
impl_select!(SysUser{select_by_email(email: &str) -> Option => "`where email = #{email} LIMIT 1`"});
impl_select!(SysUser{select_by_id(id: i64) -> Option => "`where id = #{id} LIMIT 1`"});

impl SysUser {
    pub const TABLE_NAME: &'static str = "sys_user";

    /// 账号可用: 激活且未停用
    pub fn is_usable(&self) -> bool {
        self.is_active.unwrap_or(false) && !self.is_disabled.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_usable() {
        let mut user = SysUser {
            id: Some(1),
            username: Some("admin".to_string()),
            email: None,
            full_name: None,
            password: None,
            role: Some("superadmin".to_string()),
            is_active: Some(true),
            is_disabled: Some(false),
            created_by_id: None,
            last_login: None,
            create_time: None,
            update_time: None,
        };
        assert!(user.is_usable());

        user.is_disabled = Some(true);
        assert!(!user.is_usable());

        user.is_disabled = Some(false);
        user.is_active = Some(false);
        assert!(!user.is_usable());

        // 字段缺省视为不可用
        user.is_active = None;
        assert!(!user.is_usable());
    }
}
