use actix_web::dev::ServiceRequest;

/// 路由匹配工具类
///
/// 提供流式 API 进行路由匹配，用于决定某个请求是否落在鉴权范围内。
///
/// `RouteMatcher` 维护一个 `is_hit` 状态，初始为 `true`。
/// 通常用法: `RouteMatcher::new(&req).match_path("/api/**").not_match_path("/api/v1/login").is_hit()`
pub struct RouteMatcher {
    // 当前请求路径
    path: String,
    // 是否命中
    is_hit: bool,
}

impl RouteMatcher {
    /// 创建新的路由匹配器
    pub fn new(req: &ServiceRequest) -> Self {
        RouteMatcher {
            path: req.path().to_string(),
            is_hit: true,
        }
    }

    /// 仅用于测试或非 Request 场景
    pub fn new_unchecked(path: &str) -> Self {
        RouteMatcher {
            path: path.to_string(),
            is_hit: true,
        }
    }

    /// 获取当前命中状态
    pub fn is_hit(&self) -> bool {
        self.is_hit
    }

    /// 匹配路径 (白名单)
    ///
    /// 如果当前路径匹配传入的模式(或模式列表中的任意一个)，则保持命中状态；
    /// 否则，标记为未命中。
    pub fn match_path<P>(mut self, patterns: P) -> Self
    where
        P: IntoPatterns,
    {
        if !self.is_hit {
            return self;
        }

        let patterns = patterns.into_patterns();
        let matched = patterns.iter().any(|p| self.is_match(p));
        if !matched {
            self.is_hit = false;
        }
        self
    }

    /// 排除路径 (黑名单)
    ///
    /// 如果当前路径匹配传入的模式(或模式列表中的任意一个)，则标记为未命中。
    pub fn not_match_path<P>(mut self, patterns: P) -> Self
    where
        P: IntoPatterns,
    {
        if !self.is_hit {
            return self;
        }

        let patterns = patterns.into_patterns();
        if patterns.iter().any(|p| self.is_match(p)) {
            self.is_hit = false;
        }
        self
    }

    /// 判断路径是否匹配 (Ant 风格)
    ///
    /// 支持:
    /// - /** : 匹配所有
    /// - /xxx/** : 前缀匹配
    /// - *.json : 后缀匹配
    /// - /xxx/* : 单级目录匹配
    /// - 其余为精确匹配
    fn is_match(&self, pattern: &str) -> bool {
        if pattern == "/**" {
            return true;
        }

        if let Some(prefix) = pattern.strip_suffix("/**") {
            return self.path.starts_with(prefix);
        }

        if let Some(suffix) = pattern.strip_prefix('*') {
            return self.path.ends_with(suffix);
        }

        if let Some(prefix) = pattern.strip_suffix("/*") {
            if let Some(rest) = self.path.strip_prefix(prefix) {
                // 单级匹配，剩余部分不能再带目录
                let rest = rest.trim_start_matches('/');
                return !rest.is_empty() && !rest.contains('/');
            }
            return false;
        }

        self.path == pattern
    }
}

// ------------------- 辅助 Trait -------------------

/// 辅助 trait，用于支持传入单个 &str 或 Vec<&str>
pub trait IntoPatterns {
    fn into_patterns(self) -> Vec<String>;
}

impl IntoPatterns for &str {
    fn into_patterns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoPatterns for String {
    fn into_patterns(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoPatterns for Vec<&str> {
    fn into_patterns(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoPatterns for Vec<String> {
    fn into_patterns(self) -> Vec<String> {
        self
    }
}

impl<const N: usize> IntoPatterns for [&str; N] {
    fn into_patterns(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_all() {
        assert!(RouteMatcher::new_unchecked("/api/v1/predict")
            .match_path("/**")
            .is_hit());
    }

    #[test]
    fn test_prefix_match() {
        assert!(RouteMatcher::new_unchecked("/api/v1/loans/42")
            .match_path("/api/**")
            .is_hit());
        assert!(!RouteMatcher::new_unchecked("/health")
            .match_path("/api/**")
            .is_hit());
    }

    #[test]
    fn test_exclude_wins() {
        let hit = RouteMatcher::new_unchecked("/api/v1/login")
            .match_path("/api/**")
            .not_match_path(vec!["/api/v1/login", "/api/v1/health"])
            .is_hit();
        assert!(!hit);

        let hit = RouteMatcher::new_unchecked("/api/v1/predict")
            .match_path("/api/**")
            .not_match_path(vec!["/api/v1/login", "/api/v1/health"])
            .is_hit();
        assert!(hit);
    }

    #[test]
    fn test_single_level_wildcard() {
        assert!(RouteMatcher::new_unchecked("/api/v1/applications/LOAN_X")
            .match_path("/api/v1/applications/*")
            .is_hit());
        assert!(!RouteMatcher::new_unchecked("/api/v1/applications/LOAN_X/status")
            .match_path("/api/v1/applications/*")
            .is_hit());
    }

    #[test]
    fn test_suffix_match() {
        assert!(RouteMatcher::new_unchecked("/static/app.json")
            .match_path("*.json")
            .is_hit());
    }
}
