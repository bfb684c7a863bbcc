use std::sync::Arc;

use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;
use rbs::Value;
use serde::Serialize;

use common::constants::MAX_PAGE_SIZE;
use common::error::AppResult;
use orm::entities::system::{AuditLogDetail, SysAuditLog};

/// 审计日志查询条件
#[derive(Debug, Default)]
pub struct AuditLogFilter {
    pub user_id: Option<i64>,
    /// 按动作名模糊匹配
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// 审计日志分页结果
#[derive(Debug, Serialize)]
pub struct AuditLogPage {
    pub logs: Vec<AuditLogDetail>,
    pub total_count: i64,
    pub page: u64,
    pub page_size: u64,
    pub has_more: bool,
}

/// 审计服务, 只增不改
pub struct AuditService {
    rb: Arc<RBatis>,
}

impl AuditService {
    pub fn new(rb: Arc<RBatis>) -> Self {
        Self { rb }
    }

    /// 写入一条审计记录
    ///
    /// 写入失败只记日志, 绝不影响主流程
    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        &self,
        user_id: Option<i64>,
        action: &str,
        resource_type: Option<&str>,
        resource_id: Option<String>,
        detail: impl Into<String>,
        ip: Option<String>,
        user_agent: Option<String>,
    ) {
        let row = SysAuditLog {
            id: None,
            user_id,
            action: Some(action.to_string()),
            resource_type: resource_type.map(str::to_string),
            resource_id,
            details: Some(detail.into()),
            ip_address: ip,
            user_agent,
            created_at: Some(DateTime::now()),
        };

        if let Err(e) = SysAuditLog::insert(self.rb.as_ref(), &row).await {
            log::warn!("⚠️  审计日志写入失败: action={}, err={}", action, e);
        }
    }

    /// 分页查询审计日志, 联表带出操作人用户名
    pub async fn list(
        &self,
        filter: &AuditLogFilter,
        page: u64,
        page_size: u64,
    ) -> AppResult<AuditLogPage> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let (where_sql, mut args) = build_where(filter);

        let count_sql = format!("select count(*) as total from sys_audit_log a{}", where_sql);
        let total_count: i64 = self.rb.query_decode(&count_sql, args.clone()).await?;

        let offset = page.saturating_sub(1) * page_size;
        let list_sql = format!(
            "select a.id, a.user_id, u.username, a.action, a.resource_type, a.resource_id, \
             a.details, a.ip_address, a.user_agent, a.created_at \
             from sys_audit_log a left join sys_user u on a.user_id = u.id{} \
             order by a.created_at desc limit ? offset ?",
            where_sql
        );
        args.push(page_size.into());
        args.push(offset.into());
        let logs: Vec<AuditLogDetail> = self.rb.query_decode(&list_sql, args).await?;

        Ok(AuditLogPage {
            logs,
            total_count,
            page,
            page_size,
            has_more: total_count > (page * page_size) as i64,
        })
    }
}

/// 拼接 where 片段与参数, 条件顺序与参数顺序一致
fn build_where(filter: &AuditLogFilter) -> (String, Vec<Value>) {
    let mut where_sql = String::from(" where 1 = 1");
    let mut args: Vec<Value> = Vec::new();

    if let Some(user_id) = filter.user_id {
        where_sql.push_str(" and a.user_id = ?");
        args.push(user_id.into());
    }
    if let Some(action) = &filter.action {
        where_sql.push_str(" and a.action like ?");
        args.push(format!("%{}%", action).into());
    }
    if let Some(resource_type) = &filter.resource_type {
        where_sql.push_str(" and a.resource_type = ?");
        args.push(resource_type.clone().into());
    }
    if let Some(from) = &filter.date_from {
        where_sql.push_str(" and a.created_at >= ?");
        args.push(from.clone().into());
    }
    if let Some(to) = &filter.date_to {
        where_sql.push_str(" and a.created_at <= ?");
        args.push(to.clone().into());
    }

    (where_sql, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_where_empty_filter() {
        let (sql, args) = build_where(&AuditLogFilter::default());
        assert_eq!(sql, " where 1 = 1");
        assert!(args.is_empty());
    }

    #[test]
    fn test_build_where_all_conditions() {
        let filter = AuditLogFilter {
            user_id: Some(7),
            action: Some("login".to_string()),
            resource_type: Some("user".to_string()),
            date_from: Some("2026-08-01 00:00:00".to_string()),
            date_to: Some("2026-08-21 23:59:59".to_string()),
        };
        let (sql, args) = build_where(&filter);
        println!("where: {}", sql);
        assert!(sql.contains("a.user_id = ?"));
        assert!(sql.contains("a.action like ?"));
        assert!(sql.contains("a.resource_type = ?"));
        assert!(sql.contains("a.created_at >= ?"));
        assert!(sql.contains("a.created_at <= ?"));
        assert_eq!(args.len(), 5);
        // 模糊匹配两侧加 %
        assert_eq!(args[1], Value::String("%login%".to_string()));
    }
}
