use serde::Deserialize;

// DTO for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// DTO for password change
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

// DTO for user creation (superadmin only)
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// "superadmin" / "bank_manager"
    pub role: String,
    pub full_name: Option<String>,
}

// DTO for user update (superadmin only)
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_disabled: Option<bool>,
}
