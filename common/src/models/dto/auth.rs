use serde::Serialize;

/// 登录成功响应
#[derive(Debug, Serialize)]
pub struct LoginDto {
    pub access_token: String,
    /// 固定为 "bearer"
    pub token_type: String,
    /// 有效期（秒）
    pub expires_in: i64,
    pub user_info: UserDto,
}

/// 用户信息（不含密码）
#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub is_disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
