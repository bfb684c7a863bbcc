use std::sync::Arc;

use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;
use rbs::Value;
use serde::Serialize;

use common::constants::{audit_actions, resource_types, MAX_PAGE_SIZE, TOKEN_TYPE};
use common::enums::UserRole;
use common::error::{AppError, AppResult};
use common::middleware::auth::{issue_token, AuthContext};
use common::models::{ChangePasswordRequest, CreateUserRequest, LoginDto, LoginRequest, UpdateUserRequest, UserDto};
use common::utils::{hash_password, verify_password};
use orm::entities::system::SysUser;

use super::audit_service::AuditService;

/// 用户分页结果
#[derive(Debug, Serialize)]
pub struct UserPage {
    pub users: Vec<UserDto>,
    pub total_count: i64,
    pub page: u64,
    pub page_size: u64,
    pub has_more: bool,
}

/// 认证与用户管理
pub struct AuthService {
    rb: Arc<RBatis>,
    audit: Arc<AuditService>,
    secret_key: String,
    token_expire_minutes: i64,
}

impl AuthService {
    pub fn new(
        rb: Arc<RBatis>,
        audit: Arc<AuditService>,
        secret_key: String,
        token_expire_minutes: i64,
    ) -> Self {
        Self {
            rb,
            audit,
            secret_key,
            token_expire_minutes,
        }
    }

    /// 登录
    ///
    /// 用户不存在 / 密码错误 / 账号停用统一返回同一个 401,
    /// 不向调用方泄露失败原因
    pub async fn login(
        &self,
        req: &LoginRequest,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<LoginDto> {
        let user = SysUser::select_by_username(self.rb.as_ref(), &req.username)
            .await?
            .filter(|u| {
                let stored = u.password.as_deref().unwrap_or_default();
                verify_password(&req.password, stored) && u.is_usable()
            });

        let user = match user {
            Some(user) => user,
            None => {
                log::warn!("⚠️  登录失败: username={}", req.username);
                self.audit
                    .record(
                        None,
                        audit_actions::LOGIN_FAILED,
                        None,
                        None,
                        format!("Failed login attempt for username: {}", req.username),
                        ip,
                        user_agent,
                    )
                    .await;
                return Err(AppError::auth("Incorrect username or password"));
            }
        };

        let user_id = user.id.unwrap_or_default();
        let username = user.username.clone().unwrap_or_default();
        let role = user.role.clone().unwrap_or_default();

        let access_token = issue_token(
            user_id,
            &username,
            &role,
            &self.secret_key,
            self.token_expire_minutes,
        )?;

        // 更新最近登录时间, 失败不影响登录
        let mut touched = user.clone();
        touched.last_login = Some(DateTime::now());
        touched.update_time = Some(DateTime::now());
        let where_map = rbs::value! { "id": user_id };
        if let Err(e) = SysUser::update_by_map(self.rb.as_ref(), &touched, where_map).await {
            log::warn!("⚠️  更新最近登录时间失败: user={}, err={}", username, e);
        }

        self.audit
            .record(
                Some(user_id),
                audit_actions::LOGIN_SUCCESS,
                None,
                None,
                "User logged in successfully",
                ip,
                user_agent,
            )
            .await;
        log::info!("✅ 登录成功: username={}", username);

        Ok(LoginDto {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.token_expire_minutes * 60,
            user_info: to_user_dto(&touched),
        })
    }

    /// 登出 (仅留审计痕迹)
    pub async fn logout(&self, ctx: &AuthContext, ip: Option<String>, user_agent: Option<String>) {
        self.audit
            .record(
                Some(ctx.user_id),
                audit_actions::LOGOUT,
                None,
                None,
                "User logged out",
                ip,
                user_agent,
            )
            .await;
    }

    /// 当前用户资料
    pub async fn current_user(&self, user_id: i64) -> AppResult<UserDto> {
        let user = SysUser::select_by_id(self.rb.as_ref(), user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        Ok(to_user_dto(&user))
    }

    /// 修改本人密码
    pub async fn change_password(
        &self,
        ctx: &AuthContext,
        req: &ChangePasswordRequest,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<()> {
        let user = SysUser::select_by_id(self.rb.as_ref(), ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let stored = user.password.as_deref().unwrap_or_default();
        if !verify_password(&req.current_password, stored) {
            return Err(AppError::validation("Current password is incorrect"));
        }
        if req.new_password != req.confirm_password {
            return Err(AppError::validation("New password and confirmation don't match"));
        }

        let mut updated = user;
        updated.password = Some(hash_password(&req.new_password));
        updated.update_time = Some(DateTime::now());
        let where_map = rbs::value! { "id": ctx.user_id };
        SysUser::update_by_map(self.rb.as_ref(), &updated, where_map).await?;

        self.audit
            .record(
                Some(ctx.user_id),
                audit_actions::PASSWORD_CHANGED,
                None,
                None,
                "User changed password",
                ip,
                user_agent,
            )
            .await;
        Ok(())
    }

    /// 创建用户 (仅超级管理员)
    pub async fn create_user(
        &self,
        ctx: &AuthContext,
        req: &CreateUserRequest,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<UserDto> {
        let role = UserRole::parse(&req.role).ok_or_else(|| {
            AppError::validation(format!(
                "Field 'role' must be one of {:?}",
                UserRole::all_values()
            ))
        })?;

        if SysUser::select_by_username(self.rb.as_ref(), &req.username)
            .await?
            .is_some()
        {
            return Err(AppError::business("Username already registered"));
        }
        if SysUser::select_by_email(self.rb.as_ref(), &req.email)
            .await?
            .is_some()
        {
            return Err(AppError::business("Email already registered"));
        }

        let now = DateTime::now();
        let user = SysUser {
            id: None,
            username: Some(req.username.clone()),
            email: Some(req.email.clone()),
            full_name: req.full_name.clone(),
            password: Some(hash_password(&req.password)),
            role: Some(role.as_ref().to_string()),
            is_active: Some(true),
            is_disabled: Some(false),
            created_by_id: Some(ctx.user_id),
            last_login: None,
            create_time: Some(now.clone()),
            update_time: Some(now),
        };
        SysUser::insert(self.rb.as_ref(), &user).await?;

        // 回查拿自增主键
        let created = SysUser::select_by_username(self.rb.as_ref(), &req.username)
            .await?
            .ok_or_else(|| AppError::database_error("User creation could not be confirmed"))?;

        self.audit
            .record(
                Some(ctx.user_id),
                audit_actions::USER_CREATED,
                Some(resource_types::USER),
                created.id.map(|id| id.to_string()),
                format!("Created user: {} with role: {}", req.username, role.as_ref()),
                ip,
                user_agent,
            )
            .await;
        log::info!("✅ 新建用户: {} ({})", req.username, role.as_ref());

        Ok(to_user_dto(&created))
    }

    /// 用户分页列表 (仅超级管理员)
    pub async fn list_users(
        &self,
        role: Option<String>,
        is_active: Option<bool>,
        page: u64,
        page_size: u64,
    ) -> AppResult<UserPage> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let mut where_sql = String::from(" where 1 = 1");
        let mut args: Vec<Value> = Vec::new();

        if let Some(role) = &role {
            where_sql.push_str(" and role = ?");
            args.push(role.clone().into());
        }
        if let Some(is_active) = is_active {
            where_sql.push_str(" and is_active = ?");
            args.push(is_active.into());
        }

        let count_sql = format!("select count(*) as total from sys_user{}", where_sql);
        let total_count: i64 = self.rb.query_decode(&count_sql, args.clone()).await?;

        let offset = page.saturating_sub(1) * page_size;
        let list_sql = format!(
            "select * from sys_user{} order by id asc limit ? offset ?",
            where_sql
        );
        args.push(page_size.into());
        args.push(offset.into());
        let users: Vec<SysUser> = self.rb.query_decode(&list_sql, args).await?;

        Ok(UserPage {
            users: users.iter().map(to_user_dto).collect(),
            total_count,
            page,
            page_size,
            has_more: total_count > (page * page_size) as i64,
        })
    }

    /// 按 id 查用户 (仅超级管理员)
    pub async fn get_user(&self, user_id: i64) -> AppResult<UserDto> {
        let user = SysUser::select_by_id(self.rb.as_ref(), user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        Ok(to_user_dto(&user))
    }

    /// 部分更新用户 (仅超级管理员)
    pub async fn update_user(
        &self,
        ctx: &AuthContext,
        user_id: i64,
        req: &UpdateUserRequest,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<UserDto> {
        let user = SysUser::select_by_id(self.rb.as_ref(), user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        // 管理员不能停用自己
        if user_id == ctx.user_id && req.is_disabled == Some(true) {
            return Err(AppError::business("Cannot disable your own account"));
        }

        let mut updated = user;
        if let Some(email) = &req.email {
            updated.email = Some(email.clone());
        }
        if let Some(full_name) = &req.full_name {
            updated.full_name = Some(full_name.clone());
        }
        if let Some(role) = &req.role {
            let parsed = UserRole::parse(role).ok_or_else(|| {
                AppError::validation(format!(
                    "Field 'role' must be one of {:?}",
                    UserRole::all_values()
                ))
            })?;
            updated.role = Some(parsed.as_ref().to_string());
        }
        if let Some(password) = &req.password {
            updated.password = Some(hash_password(password));
        }
        if let Some(is_active) = req.is_active {
            updated.is_active = Some(is_active);
        }
        if let Some(is_disabled) = req.is_disabled {
            updated.is_disabled = Some(is_disabled);
        }
        updated.update_time = Some(DateTime::now());

        let where_map = rbs::value! { "id": user_id };
        SysUser::update_by_map(self.rb.as_ref(), &updated, where_map).await?;

        self.audit
            .record(
                Some(ctx.user_id),
                audit_actions::USER_UPDATED,
                Some(resource_types::USER),
                Some(user_id.to_string()),
                format!("Updated user: {}", updated.username.as_deref().unwrap_or_default()),
                ip,
                user_agent,
            )
            .await;

        Ok(to_user_dto(&updated))
    }

    /// 软删除用户 (仅超级管理员): 置为停用, 不物理删除
    pub async fn delete_user(
        &self,
        ctx: &AuthContext,
        user_id: i64,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<()> {
        let user = SysUser::select_by_id(self.rb.as_ref(), user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if user_id == ctx.user_id {
            return Err(AppError::business("Cannot delete your own account"));
        }

        let mut updated = user;
        updated.is_disabled = Some(true);
        updated.is_active = Some(false);
        updated.update_time = Some(DateTime::now());
        let where_map = rbs::value! { "id": user_id };
        SysUser::update_by_map(self.rb.as_ref(), &updated, where_map).await?;

        self.audit
            .record(
                Some(ctx.user_id),
                audit_actions::USER_DELETED,
                Some(resource_types::USER),
                Some(user_id.to_string()),
                format!("Disabled user: {}", updated.username.as_deref().unwrap_or_default()),
                ip,
                user_agent,
            )
            .await;
        log::info!("✅ 用户已停用: id={}", user_id);
        Ok(())
    }
}

/// 实体转响应对象, 密码摘要不出服务层
fn to_user_dto(user: &SysUser) -> UserDto {
    UserDto {
        id: user.id.unwrap_or_default(),
        username: user.username.clone().unwrap_or_default(),
        email: user.email.clone().unwrap_or_default(),
        full_name: user.full_name.clone(),
        role: user.role.clone().unwrap_or_default(),
        is_active: user.is_active.unwrap_or(false),
        is_disabled: user.is_disabled.unwrap_or(false),
        last_login: user.last_login.as_ref().map(|d| d.to_string()),
        created_at: user.create_time.as_ref().map(|d| d.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> SysUser {
        SysUser {
            id: Some(3),
            username: Some("bankmanager".to_string()),
            email: Some("bm@bank.local".to_string()),
            full_name: Some("Bank Manager".to_string()),
            password: Some(hash_password("bm123")),
            role: Some("bank_manager".to_string()),
            is_active: Some(true),
            is_disabled: Some(false),
            created_by_id: Some(1),
            last_login: None,
            create_time: Some(DateTime::now()),
            update_time: None,
        }
    }

    #[test]
    fn test_to_user_dto_never_carries_password() {
        let dto = to_user_dto(&sample_user());
        assert_eq!(dto.id, 3);
        assert_eq!(dto.username, "bankmanager");
        assert_eq!(dto.role, "bank_manager");
        assert!(dto.is_active);
        let json = serde_json::to_string(&dto).unwrap();
        println!("user dto: {}", json);
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_password_round_trip() {
        let user = sample_user();
        let stored = user.password.as_deref().unwrap();
        assert!(verify_password("bm123", stored));
        assert!(!verify_password("wrong", stored));
    }
}
