use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures_util::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use crate::constants::{AUTH_HEADER_NAME, BEARER_PREFIX};
use crate::error::AppError;
use super::auth_checker::{AccountVerifier, AuthChecker};
use super::claims::decode_token;

/// JWT 认证中间件
///
/// 拦截逻辑:
/// 1. RouteMatcher 判断当前路径是否需要鉴权
/// 2. 从 Authorization 头提取 Bearer token 并校验签名与有效期
/// 3. AccountVerifier 校验账户状态，把 AuthContext 写入请求扩展
#[derive(Clone)]
pub struct AuthMiddleware {
    pub secret: Arc<String>,
    pub auth_checker: Arc<dyn AuthChecker>,
    pub verifier: Arc<dyn AccountVerifier>,
}

impl AuthMiddleware {
    pub fn new(
        secret: impl Into<String>,
        auth_checker: Arc<dyn AuthChecker>,
        verifier: Arc<dyn AccountVerifier>,
    ) -> Self {
        Self {
            secret: Arc::new(secret.into()),
            auth_checker,
            verifier,
        }
    }

    /// 创建一个构建器
    pub fn builder() -> AuthMiddlewareBuilder {
        AuthMiddlewareBuilder::new()
    }
}

/// AuthMiddleware 构建器
pub struct AuthMiddlewareBuilder {
    secret: Option<String>,
    auth_checker: Option<Arc<dyn AuthChecker>>,
    verifier: Option<Arc<dyn AccountVerifier>>,
}

impl AuthMiddlewareBuilder {
    pub fn new() -> Self {
        Self {
            secret: None,
            auth_checker: None,
            verifier: None,
        }
    }

    /// 设置签名密钥 (必须)
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// 设置 AuthChecker (必须)
    pub fn auth_checker(mut self, auth_checker: Arc<dyn AuthChecker>) -> Self {
        self.auth_checker = Some(auth_checker);
        self
    }

    /// 设置 AccountVerifier (必须)
    pub fn verifier(mut self, verifier: Arc<dyn AccountVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// 构建 AuthMiddleware
    ///
    /// # Panics
    /// 如果 `secret`、`auth_checker` 或 `verifier` 未设置，则 panic。
    pub fn build(self) -> AuthMiddleware {
        AuthMiddleware {
            secret: Arc::new(self.secret.expect("AuthMiddlewareBuilder: secret is required")),
            auth_checker: self
                .auth_checker
                .expect("AuthMiddlewareBuilder: auth_checker is required"),
            verifier: self
                .verifier
                .expect("AuthMiddlewareBuilder: verifier is required"),
        }
    }
}

impl Default for AuthMiddlewareBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            secret: self.secret.clone(),
            auth_checker: self.auth_checker.clone(),
            verifier: self.verifier.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    secret: Arc<String>,
    auth_checker: Arc<dyn AuthChecker>,
    verifier: Arc<dyn AccountVerifier>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = self.secret.clone();
        let auth_checker = self.auth_checker.clone();
        let verifier = self.verifier.clone();

        Box::pin(async move {
            // 1. 判断是否需要鉴权
            let need_auth = auth_checker.check_auth_required(&req);

            // 2. 尝试提取 Token
            let token_str = match extract_token_from_request(&req) {
                Some(token) => token,
                None => {
                    if need_auth {
                        log::warn!("⚠️  [Auth] 未提供 Token，且接口需要鉴权: {}", req.path());
                        return Err(AppError::auth("Not authenticated").into());
                    }
                    // 未提供 token，也不需要鉴权，放行
                    return service.call(req).await;
                }
            };

            // 3. 校验签名与有效期
            let claims = match decode_token(&token_str, &secret) {
                Ok(claims) => claims,
                Err(e) => {
                    if need_auth {
                        log::warn!("⚠️  [Auth] Token 无效或已过期，且接口需要鉴权: {}", req.path());
                        return Err(e.into());
                    }
                    return service.call(req).await;
                }
            };

            // 4. 校验账户状态并写入上下文
            match verifier.verify(&claims).await {
                Ok(ctx) => {
                    log::debug!("✅ [Auth] Token 验证通过: user={}", ctx.username);
                    req.extensions_mut().insert(ctx);
                }
                Err(e) => {
                    if need_auth {
                        log::warn!("⚠️  [Auth] 账户校验未通过: user={}", claims.sub);
                        return Err(e.into());
                    }
                    // 公开接口不因携带失效 token 被阻断
                    log::debug!("[Auth] 公开接口忽略失效 token: {}", req.path());
                }
            }

            service.call(req).await
        })
    }
}

/// 从请求中提取 token
fn extract_token_from_request(req: &ServiceRequest) -> Option<String> {
    let auth_header = req.headers().get(AUTH_HEADER_NAME)?;
    let auth_str = auth_header.to_str().ok()?;

    log::debug!("🔍 [Auth] 从 Header[{}] 获取到 token", AUTH_HEADER_NAME);
    Some(extract_bearer_token(auth_str))
}

/// 提取 Bearer token
fn extract_bearer_token(token: &str) -> String {
    match token.strip_prefix(BEARER_PREFIX) {
        Some(stripped) => stripped.to_string(),
        None => token.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(extract_bearer_token("abc.def.ghi"), "abc.def.ghi");
    }
}
