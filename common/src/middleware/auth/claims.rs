use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// JWT 载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// 用户名
    pub sub: String,
    pub user_id: i64,
    pub role: String,
    /// 签发时间（Unix 秒）
    pub iat: i64,
    /// 过期时间（Unix 秒）
    pub exp: i64,
}

/// 签发 HS256 token
pub fn issue_token(
    user_id: i64,
    username: &str,
    role: &str,
    secret: &str,
    expire_minutes: i64,
) -> AppResult<String> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: username.to_string(),
        user_id,
        role: role.to_string(),
        iat: now.timestamp(),
        exp: (now + chrono::Duration::minutes(expire_minutes)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))
}

/// 校验并解析 token（含过期校验）
pub fn decode_token(token: &str, secret: &str) -> AppResult<TokenClaims> {
    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::auth("Invalid or expired token"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_round_trip() {
        let token = issue_token(7, "bankmanager", "bank_manager", SECRET, 30).unwrap();
        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "bankmanager");
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.role, "bank_manager");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(1, "superadmin", "superadmin", SECRET, 30).unwrap();
        assert!(decode_token(&token, "another-secret").is_err());
    }

    #[test]
    fn test_expired_rejected() {
        // 过期时间远在过去，超过默认 leeway
        let token = issue_token(1, "superadmin", "superadmin", SECRET, -120).unwrap();
        let err = decode_token(&token, SECRET).unwrap_err();
        assert_eq!(err.message(), "Invalid or expired token");
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(decode_token("not-a-token", SECRET).is_err());
    }
}
