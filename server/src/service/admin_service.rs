use std::sync::Arc;

use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;
use rbs::Value;
use serde::Serialize;
use serde_json::json;

use common::constants::{audit_actions, resource_types, MAX_PAGE_SIZE};
use common::enums::LoanDecision;
use common::error::{AppError, AppResult};
use common::middleware::auth::AuthContext;
use common::models::{LoanStatusUpdateRequest, UpdateWeightRequest};
use orm::entities::config::FeatureWeight;
use orm::entities::loan::LoanApplication;
use scoring::validate_weight;

use super::audit_service::AuditService;
use super::loan_service::{cutoff_datetime, summarize_decided, DecidedRow};

/// 贷款列表查询条件
#[derive(Debug, Default)]
pub struct LoanListFilter {
    /// 人工终审结果 Yes / No
    pub final_status: Option<String>,
    pub risk_category: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub min_loan_amount: Option<f64>,
    pub max_loan_amount: Option<f64>,
    pub property_area: Option<String>,
    /// 申请编号模糊搜索
    pub search: Option<String>,
}

/// 贷款分页结果
#[derive(Debug, Serialize)]
pub struct LoanListPage {
    pub loans: Vec<LoanApplication>,
    pub total_count: i64,
    pub page: u64,
    pub page_size: u64,
    pub has_more: bool,
    pub filters_applied: serde_json::Value,
}

/// 状态覆盖确认
#[derive(Debug, Serialize)]
pub struct StatusUpdateAck {
    pub message: String,
    pub application_id: String,
    pub new_status: String,
    pub reviewed_by: String,
}

/// 后台管理: 权重维护 / 模型报告 / 贷款台账
pub struct AdminService {
    rb: Arc<RBatis>,
    audit: Arc<AuditService>,
}

impl AdminService {
    pub fn new(rb: Arc<RBatis>, audit: Arc<AuditService>) -> Self {
        Self { rb, audit }
    }

    /// 全部特征权重, 按权重从大到小
    pub async fn get_feature_weights(&self) -> AppResult<Vec<FeatureWeight>> {
        Ok(FeatureWeight::select_all_ordered(self.rb.as_ref()).await?)
    }

    /// 按 feature_name 创建或更新权重
    pub async fn update_weight(
        &self,
        ctx: &AuthContext,
        req: &UpdateWeightRequest,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<()> {
        validate_weight(req.weight)?;

        let now = DateTime::now();
        let existing = FeatureWeight::select_by_name(self.rb.as_ref(), &req.feature_name).await?;
        match existing {
            Some(mut row) => {
                row.weight = Some(req.weight);
                if req.description.is_some() {
                    row.description = req.description.clone();
                }
                row.updated_by = Some(ctx.user_id);
                row.updated_at = Some(now);
                let where_map = rbs::value! { "feature_name": req.feature_name.clone() };
                FeatureWeight::update_by_map(self.rb.as_ref(), &row, where_map).await?;
            }
            None => {
                let row = FeatureWeight {
                    id: None,
                    feature_name: Some(req.feature_name.clone()),
                    weight: Some(req.weight),
                    description: req.description.clone(),
                    is_active: Some(true),
                    updated_by: Some(ctx.user_id),
                    created_at: Some(now.clone()),
                    updated_at: Some(now),
                };
                FeatureWeight::insert(self.rb.as_ref(), &row).await?;
            }
        }

        self.audit
            .record(
                Some(ctx.user_id),
                audit_actions::FEATURE_WEIGHT_UPDATED,
                Some(resource_types::FEATURE_WEIGHT),
                Some(req.feature_name.clone()),
                format!("Set weight of {} to {}", req.feature_name, req.weight),
                ip,
                user_agent,
            )
            .await;
        log::info!("✅ 权重已更新: {}={}", req.feature_name, req.weight);
        Ok(())
    }

    /// 模型表现报告
    ///
    /// 近 30 天基础指标 + 全量终审样本的分档命中率与 7 天漂移
    pub async fn performance_report(&self) -> AppResult<serde_json::Value> {
        let basic_rows: Vec<DecidedRow> = self
            .rb
            .query_decode(
                "select loan_decision, final_status, risk_category from loan_application \
                 where created_at >= ? and final_status is not null",
                vec![cutoff_datetime(30).into()],
            )
            .await?;
        let basic = summarize_decided(&basic_rows, 30);

        let decided: Vec<DecidedRow> = self
            .rb
            .query_decode(
                "select loan_decision, final_status, risk_category from loan_application \
                 where final_status is not null",
                vec![],
            )
            .await?;

        if decided.is_empty() {
            return Ok(json!({
                "error": "No applications with admin decisions found",
                "basic_metrics": basic,
            }));
        }

        let approved = decided
            .iter()
            .filter(|r| r.final_status.as_deref() == Some("Yes"))
            .count();
        let rejected = decided
            .iter()
            .filter(|r| r.final_status.as_deref() == Some("No"))
            .count();

        // 分档命中率, 无样本的档位不出现
        let mut accuracy_by_risk = serde_json::Map::new();
        for category in ["Low", "Medium", "High"] {
            let in_category: Vec<&DecidedRow> = decided
                .iter()
                .filter(|r| r.risk_category.as_deref() == Some(category))
                .collect();
            if in_category.is_empty() {
                continue;
            }
            let hit = in_category
                .iter()
                .filter(|r| r.loan_decision.is_some() && r.loan_decision == r.final_status)
                .count();
            accuracy_by_risk.insert(
                category.to_string(),
                json!(hit as f64 / in_category.len() as f64),
            );
        }

        let recent: Vec<DecidedRow> = self
            .rb
            .query_decode(
                "select loan_decision, final_status, risk_category from loan_application \
                 where created_at >= ? and final_status is not null",
                vec![cutoff_datetime(7).into()],
            )
            .await?;

        let mut drift_score = 0.0;
        if !recent.is_empty() && decided.len() > recent.len() {
            let recent_accuracy = recent
                .iter()
                .filter(|r| r.loan_decision.is_some() && r.loan_decision == r.final_status)
                .count() as f64
                / recent.len() as f64;
            drift_score = (recent_accuracy - basic.accuracy.unwrap_or(0.0)).abs();
        }

        let recommendation = retraining_recommendation(
            basic.accuracy.unwrap_or(0.0),
            drift_score,
            decided.len(),
        );

        Ok(json!({
            "basic_metrics": basic,
            "total_applications": decided.len(),
            "approved_applications": approved,
            "rejected_applications": rejected,
            "accuracy_by_risk": accuracy_by_risk,
            "model_drift_score": drift_score,
            "recommendation": recommendation,
        }))
    }

    /// 重训请求: 仅登记, 不做进程内训练
    pub async fn request_retraining(
        &self,
        ctx: &AuthContext,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<serde_json::Value> {
        let sample_count: i64 = self
            .rb
            .query_decode(
                "select count(*) as total from loan_application where final_status is not null",
                vec![],
            )
            .await?;

        if sample_count < 50 {
            return Ok(json!({
                "success": false,
                "message": "Insufficient training data (minimum 50 samples required)",
                "sample_count": sample_count,
            }));
        }

        self.audit
            .record(
                Some(ctx.user_id),
                audit_actions::MODEL_RETRAIN_REQUESTED,
                Some(resource_types::MODEL),
                None,
                format!("Requested model retraining with {} samples", sample_count),
                ip,
                user_agent,
            )
            .await;
        log::info!("📊 重训请求已登记: samples={}", sample_count);

        Ok(json!({
            "success": true,
            "message": "Model retraining request recorded",
            "sample_count": sample_count,
        }))
    }

    /// 贷款台账分页
    pub async fn list_loans(
        &self,
        filter: &LoanListFilter,
        page: u64,
        page_size: u64,
    ) -> AppResult<LoanListPage> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let (where_sql, mut args, filters_applied) = build_loan_where(filter);

        let count_sql = format!("select count(*) as total from loan_application{}", where_sql);
        let total_count: i64 = self.rb.query_decode(&count_sql, args.clone()).await?;

        let offset = page.saturating_sub(1) * page_size;
        let list_sql = format!(
            "select * from loan_application{} order by created_at desc limit ? offset ?",
            where_sql
        );
        args.push(page_size.into());
        args.push(offset.into());
        let loans: Vec<LoanApplication> = self.rb.query_decode(&list_sql, args).await?;

        Ok(LoanListPage {
            loans,
            total_count,
            page,
            page_size,
            has_more: total_count > (page * page_size) as i64,
            filters_applied: serde_json::Value::Object(filters_applied),
        })
    }

    /// 台账详情
    pub async fn get_loan(&self, application_id: &str) -> AppResult<LoanApplication> {
        LoanApplication::select_by_application_id(self.rb.as_ref(), application_id)
            .await?
            .ok_or_else(|| AppError::not_found("Loan application not found"))
    }

    /// 状态覆盖, 审计记录新旧状态
    pub async fn update_loan_status(
        &self,
        ctx: &AuthContext,
        application_id: &str,
        req: &LoanStatusUpdateRequest,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<StatusUpdateAck> {
        let decision = LoanDecision::parse(&req.status).ok_or_else(|| {
            AppError::validation("Field 'status' must be one of [\"Yes\", \"No\"]")
        })?;

        let loan = LoanApplication::select_by_application_id(self.rb.as_ref(), application_id)
            .await?
            .ok_or_else(|| AppError::not_found("Loan application not found"))?;

        let previous = loan
            .final_status
            .clone()
            .unwrap_or_else(|| "None".to_string());

        let mut updated = loan;
        updated.final_status = Some(decision.as_ref().to_string());
        updated.admin_notes = req.notes.clone();
        updated.reviewed_by = Some(ctx.user_id);
        updated.reviewed_at = Some(DateTime::now());
        updated.updated_at = Some(DateTime::now());
        let where_map = rbs::value! { "application_id": application_id };
        LoanApplication::update_by_map(self.rb.as_ref(), &updated, where_map).await?;

        self.audit
            .record(
                Some(ctx.user_id),
                audit_actions::LOAN_STATUS_UPDATED,
                Some(resource_types::LOAN_APPLICATION),
                Some(application_id.to_string()),
                format!("Status changed from {} to {}", previous, decision.as_ref()),
                ip,
                user_agent,
            )
            .await;

        Ok(StatusUpdateAck {
            message: "Loan status updated successfully".to_string(),
            application_id: application_id.to_string(),
            new_status: decision.as_ref().to_string(),
            reviewed_by: ctx.username.clone(),
        })
    }
}

/// 重训建议口径: 命中率 < 0.7 最急, 漂移 > 0.1 次之, 大样本低命中率再次之
fn retraining_recommendation(accuracy: f64, drift_score: f64, sample_count: usize) -> &'static str {
    if accuracy < 0.7 {
        "URGENT: Model accuracy is below 70%. Immediate retraining recommended."
    } else if drift_score > 0.1 {
        "WARNING: Significant model drift detected. Retraining recommended."
    } else if sample_count > 500 && accuracy < 0.85 {
        "ADVISORY: Consider retraining to improve model performance."
    } else {
        "OK: Model performance is acceptable. Continue monitoring."
    }
}

/// 拼接台账筛选条件, 同时产出回显用的 filters_applied
fn build_loan_where(
    filter: &LoanListFilter,
) -> (String, Vec<Value>, serde_json::Map<String, serde_json::Value>) {
    let mut where_sql = String::from(" where 1 = 1");
    let mut args: Vec<Value> = Vec::new();
    let mut applied = serde_json::Map::new();

    if let Some(status) = &filter.final_status {
        where_sql.push_str(" and final_status = ?");
        args.push(status.clone().into());
        applied.insert("status".to_string(), json!(status));
    }
    if let Some(category) = &filter.risk_category {
        where_sql.push_str(" and risk_category = ?");
        args.push(category.clone().into());
        applied.insert("risk_category".to_string(), json!(category));
    }
    if let Some(from) = &filter.date_from {
        where_sql.push_str(" and created_at >= ?");
        args.push(from.clone().into());
        applied.insert("date_from".to_string(), json!(from));
    }
    if let Some(to) = &filter.date_to {
        where_sql.push_str(" and created_at <= ?");
        args.push(to.clone().into());
        applied.insert("date_to".to_string(), json!(to));
    }
    if let Some(min) = filter.min_loan_amount {
        where_sql.push_str(" and loan_amount >= ?");
        args.push(min.into());
        applied.insert("min_loan_amount".to_string(), json!(min));
    }
    if let Some(max) = filter.max_loan_amount {
        where_sql.push_str(" and loan_amount <= ?");
        args.push(max.into());
        applied.insert("max_loan_amount".to_string(), json!(max));
    }
    if let Some(area) = &filter.property_area {
        where_sql.push_str(" and property_area = ?");
        args.push(area.clone().into());
        applied.insert("property_area".to_string(), json!(area));
    }
    if let Some(search) = &filter.search {
        where_sql.push_str(" and application_id like ?");
        args.push(format!("%{}%", search).into());
        applied.insert("search".to_string(), json!(search));
    }

    (where_sql, args, applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_thresholds() {
        assert_eq!(
            retraining_recommendation(0.65, 0.0, 100),
            "URGENT: Model accuracy is below 70%. Immediate retraining recommended."
        );
        assert_eq!(
            retraining_recommendation(0.9, 0.15, 100),
            "WARNING: Significant model drift detected. Retraining recommended."
        );
        assert_eq!(
            retraining_recommendation(0.8, 0.05, 501),
            "ADVISORY: Consider retraining to improve model performance."
        );
        assert_eq!(
            retraining_recommendation(0.9, 0.05, 501),
            "OK: Model performance is acceptable. Continue monitoring."
        );
        assert_eq!(
            retraining_recommendation(0.8, 0.05, 100),
            "OK: Model performance is acceptable. Continue monitoring."
        );
    }

    #[test]
    fn test_build_loan_where_tracks_applied_filters() {
        let filter = LoanListFilter {
            final_status: Some("Yes".to_string()),
            risk_category: Some("High".to_string()),
            min_loan_amount: Some(100.0),
            search: Some("LOAN_2026".to_string()),
            ..Default::default()
        };
        let (sql, args, applied) = build_loan_where(&filter);
        println!("where: {}", sql);
        assert!(sql.contains("final_status = ?"));
        assert!(sql.contains("risk_category = ?"));
        assert!(sql.contains("loan_amount >= ?"));
        assert!(sql.contains("application_id like ?"));
        assert_eq!(args.len(), 4);
        assert_eq!(applied.len(), 4);
        assert_eq!(applied["status"], json!("Yes"));
        assert_eq!(applied["search"], json!("LOAN_2026"));
        // 模糊搜索两侧加 %
        assert_eq!(args[3], Value::String("%LOAN_2026%".to_string()));
    }

    #[test]
    fn test_build_loan_where_empty() {
        let (sql, args, applied) = build_loan_where(&LoanListFilter::default());
        assert_eq!(sql, " where 1 = 1");
        assert!(args.is_empty());
        assert!(applied.is_empty());
    }
}
