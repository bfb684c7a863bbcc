// 认证中间件模块
//
// JWT Bearer 认证：路由匹配决定是否需要鉴权，
// AccountVerifier 负责把 token 载荷换成请求上下文

pub mod claims;
pub mod context;
pub mod route_matcher;
pub mod auth_checker;
pub mod auth_middleware;

pub use claims::{decode_token, issue_token, TokenClaims};
pub use context::AuthContext;
pub use route_matcher::RouteMatcher;
pub use auth_checker::{AccountVerifier, AuthChecker, ClaimsVerifier, DefaultAuthChecker};
pub use auth_middleware::AuthMiddleware;
