use actix_web::dev::ServiceRequest;
use async_trait::async_trait;

use super::claims::TokenClaims;
use super::context::AuthContext;
use super::route_matcher::RouteMatcher;
use crate::enums::UserRole;
use crate::error::{AppError, AppResult};

/// 认证检查器 trait
///
/// 用于判断请求是否需要进行身份认证
pub trait AuthChecker: Send + Sync {
    /// 检查请求是否需要鉴权
    ///
    /// # 返回
    /// - `true`: 需要鉴权
    /// - `false`: 不需要鉴权
    fn check_auth_required(&self, req: &ServiceRequest) -> bool;
}

/// 账户校验器 trait
///
/// 把合法 token 的载荷换成请求上下文。服务端实现可在这里查库，
/// 拒绝被禁用的账户
#[async_trait(?Send)]
pub trait AccountVerifier: Send + Sync {
    async fn verify(&self, claims: &TokenClaims) -> AppResult<AuthContext>;
}

/// 基于 RouteMatcher 的默认认证检查器
pub struct DefaultAuthChecker {
    match_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
}

impl DefaultAuthChecker {
    pub fn new(match_patterns: Vec<String>, exclude_patterns: Vec<String>) -> Self {
        Self {
            match_patterns,
            exclude_patterns,
        }
    }

    /// 创建一个构建器
    pub fn builder() -> AuthCheckerBuilder {
        AuthCheckerBuilder::new()
    }
}

impl AuthChecker for DefaultAuthChecker {
    fn check_auth_required(&self, req: &ServiceRequest) -> bool {
        let match_patterns: Vec<&str> = self.match_patterns.iter().map(|s| s.as_str()).collect();
        let exclude_patterns: Vec<&str> = self.exclude_patterns.iter().map(|s| s.as_str()).collect();

        RouteMatcher::new(req)
            .match_path(match_patterns)
            .not_match_path(exclude_patterns)
            .is_hit()
    }
}

/// AuthChecker 构建器
pub struct AuthCheckerBuilder {
    match_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
}

impl AuthCheckerBuilder {
    pub fn new() -> Self {
        Self {
            match_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }

    /// 添加匹配路径 (单个)
    pub fn add_match(mut self, pattern: impl Into<String>) -> Self {
        self.match_patterns.push(pattern.into());
        self
    }

    /// 添加匹配路径 (多个)
    pub fn add_matches(mut self, patterns: Vec<String>) -> Self {
        self.match_patterns.extend(patterns);
        self
    }

    /// 添加排除路径 (单个)
    pub fn add_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// 添加排除路径 (多个)
    pub fn add_excludes(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns.extend(patterns);
        self
    }

    /// 构建 DefaultAuthChecker
    pub fn build(self) -> DefaultAuthChecker {
        DefaultAuthChecker {
            match_patterns: self.match_patterns,
            exclude_patterns: self.exclude_patterns,
        }
    }
}

impl Default for AuthCheckerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 仅依据 token 载荷构建上下文（不查库）
///
/// 生产部署应使用查库实现，保证被禁用账户的 token 立即失效
pub struct ClaimsVerifier;

#[async_trait(?Send)]
impl AccountVerifier for ClaimsVerifier {
    async fn verify(&self, claims: &TokenClaims) -> AppResult<AuthContext> {
        let role = UserRole::parse(&claims.role)
            .ok_or_else(|| AppError::auth("Invalid or expired token"))?;

        Ok(AuthContext {
            user_id: claims.user_id,
            username: claims.sub.clone(),
            role,
        })
    }
}
