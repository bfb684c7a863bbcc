// 密码摘要
use sha2::{Digest, Sha256};

/// 计算密码摘要 (sha256 hex)
pub fn hash_password(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    hex::encode(digest)
}

/// 校验密码
pub fn verify_password(raw: &str, hashed: &str) -> bool {
    hash_password(raw) == hashed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_hex_sha256() {
        let h = hash_password("admin123");
        println!("hash: {}", h);
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_verify() {
        let h = hash_password("bm123");
        assert!(verify_password("bm123", &h));
        assert!(!verify_password("bm124", &h));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(hash_password("same"), hash_password("same"));
    }
}
