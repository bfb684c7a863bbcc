use std::collections::HashMap;
use std::sync::Arc;

use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;
use serde::{Deserialize, Serialize};

use common::constants::{audit_actions, resource_types};
use common::enums::LoanDecision;
use common::error::{AppError, AppResult};
use common::middleware::auth::AuthContext;
use common::models::{AdminDecisionRequest, LoanApplicationRequest, LoanPredictionDto};
use common::utils::generate_application_id;
use orm::entities::config::FeatureWeight;
use orm::entities::loan::LoanApplication;
use scoring::{derive_features, validate_application, LoanExplainer, Predictor};

use super::audit_service::AuditService;

/// 待复核队列分页
#[derive(Debug, Serialize)]
pub struct ReviewQueuePage {
    pub applications: Vec<LoanApplication>,
    pub total_count: i64,
    pub has_more: bool,
}

/// 按风险分档的数量分布, 键与风险档位同名
#[derive(Debug, Default, Serialize)]
pub struct RiskBuckets {
    #[serde(rename = "Low")]
    pub low: i64,
    #[serde(rename = "Medium")]
    pub medium: i64,
    #[serde(rename = "High")]
    pub high: i64,
}

/// 近 30 天数据库口径指标
#[derive(Debug, Serialize)]
pub struct DbMetrics {
    /// 无人工终审样本时为空
    pub accuracy: Option<f64>,
    pub total_applications: i64,
    pub correct_predictions: i64,
    pub period_days: i64,
    pub risk_distribution: RiskBuckets,
}

/// 预测器运行时指标
#[derive(Debug, Serialize)]
pub struct PredictorMetrics {
    pub predictor_loaded: bool,
    pub prediction_method: &'static str,
    pub total_predictions: u64,
    pub model_predictions: u64,
    pub fallback_predictions: u64,
}

#[derive(Debug, Serialize)]
pub struct SystemHealth {
    pub predictor_available: bool,
    pub database_accessible: bool,
}

/// GET /metrics/model-performance 响应
#[derive(Debug, Serialize)]
pub struct ModelMetricsDto {
    pub database_metrics: DbMetrics,
    pub predictor_metrics: PredictorMetrics,
    pub system_health: SystemHealth,
    pub generated_at: String,
}

/// 已有人工终审的样本行
#[derive(Debug, Deserialize)]
pub(crate) struct DecidedRow {
    pub(crate) loan_decision: Option<String>,
    pub(crate) final_status: Option<String>,
    pub(crate) risk_category: Option<String>,
}

/// 贷款申请编排: 校验 -> 权重 -> 预测 -> 解释 -> 落库
pub struct LoanService {
    rb: Arc<RBatis>,
    predictor: Arc<Predictor>,
    explainer: LoanExplainer,
    audit: Arc<AuditService>,
}

impl LoanService {
    pub fn new(
        rb: Arc<RBatis>,
        predictor: Arc<Predictor>,
        explainer: LoanExplainer,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            rb,
            predictor,
            explainer,
            audit,
        }
    }

    /// 处理一笔新申请
    ///
    /// 落库失败只记日志, 客户端仍然拿到完整预测结果
    pub async fn predict(&self, req: &LoanApplicationRequest) -> AppResult<LoanPredictionDto> {
        let app = validate_application(req)?;
        let features = derive_features(&app);
        let weights = self.active_weights().await;

        let outcome = self.predictor.predict(&app, &features, &weights);
        let justification = self.explainer.explain(&app, &features, &outcome).await;

        let application_id = generate_application_id();
        log::info!(
            "🔍 申请评分完成: id={}, decision={}, risk={}, method={}",
            application_id,
            outcome.loan_decision.as_ref(),
            outcome.risk_score,
            outcome.prediction_method
        );

        let now = DateTime::now();
        let entity = LoanApplication {
            id: None,
            application_id: Some(application_id.clone()),
            gender: Some(app.gender.as_ref().to_string()),
            married: Some(app.married.as_ref().to_string()),
            dependents: Some(app.dependents),
            education: Some(app.education.as_ref().to_string()),
            self_employed: Some(app.self_employed.as_ref().to_string()),
            applicant_income: Some(app.applicant_income),
            coapplicant_income: Some(app.coapplicant_income),
            loan_amount: Some(app.loan_amount),
            loan_amount_term: Some(app.loan_amount_term),
            credit_history: Some(app.credit_history),
            property_area: Some(app.property_area.as_ref().to_string()),
            total_income: Some(features.total_income),
            emi: Some(features.emi),
            emi_income_ratio: Some(features.emi_income_ratio),
            loan_income_ratio: Some(features.loan_income_ratio),
            loan_decision: Some(outcome.loan_decision.as_ref().to_string()),
            risk_score: Some(outcome.risk_score),
            risk_category: Some(outcome.risk_category.as_ref().to_string()),
            justification: Some(justification.clone()),
            recommendation: Some(outcome.recommendation.clone()),
            confidence_score: Some(outcome.confidence_score),
            prediction_method: Some(outcome.prediction_method.clone()),
            final_status: None,
            admin_notes: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };
        match LoanApplication::insert(self.rb.as_ref(), &entity).await {
            Ok(_) => log::info!("💾 申请已落库: application_id={}", application_id),
            Err(e) => log::error!(
                "❌ 申请落库失败: application_id={}, err={}",
                application_id,
                e
            ),
        }

        Ok(LoanPredictionDto {
            application_id,
            loan_decision: outcome.loan_decision.as_ref().to_string(),
            risk_score: outcome.risk_score,
            risk_category: outcome.risk_category.as_ref().to_string(),
            justification,
            recommendation: outcome.recommendation,
            confidence_score: outcome.confidence_score,
            key_positive_factors: outcome.key_positive_factors,
            key_risk_factors: outcome.key_risk_factors,
            total_income: features.total_income,
            emi: features.emi,
            emi_income_ratio: features.emi_income_ratio,
            loan_income_ratio: features.loan_income_ratio,
            prediction_method: outcome.prediction_method,
        })
    }

    /// 申请详情
    pub async fn get_application(&self, application_id: &str) -> AppResult<LoanApplication> {
        LoanApplication::select_by_application_id(self.rb.as_ref(), application_id)
            .await?
            .ok_or_else(|| AppError::not_found("Application not found"))
    }

    /// 人工终审
    pub async fn admin_decision(
        &self,
        ctx: &AuthContext,
        application_id: &str,
        req: &AdminDecisionRequest,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<()> {
        let decision = LoanDecision::parse(&req.final_status).ok_or_else(|| {
            AppError::validation("Field 'final_status' must be one of [\"Yes\", \"No\"]")
        })?;

        let application = LoanApplication::select_by_application_id(self.rb.as_ref(), application_id)
            .await?
            .ok_or_else(|| AppError::not_found("Application not found"))?;

        let mut updated = application;
        updated.final_status = Some(decision.as_ref().to_string());
        updated.admin_notes = req.admin_notes.clone();
        updated.reviewed_by = Some(ctx.user_id);
        updated.reviewed_at = Some(DateTime::now());
        updated.updated_at = Some(DateTime::now());

        let where_map = rbs::value! { "application_id": application_id };
        LoanApplication::update_by_map(self.rb.as_ref(), &updated, where_map).await?;

        self.audit
            .record(
                Some(ctx.user_id),
                audit_actions::ADMIN_DECISION_UPDATED,
                Some(resource_types::LOAN_APPLICATION),
                Some(application_id.to_string()),
                format!("Set final status to {} for {}", decision.as_ref(), application_id),
                ip,
                user_agent,
            )
            .await;
        log::info!(
            "✅ 人工终审完成: application_id={}, final_status={}",
            application_id,
            decision.as_ref()
        );
        Ok(())
    }

    /// 待人工复核队列: 尚无终审且风险分大于 60, 新的在前
    pub async fn pending_review(&self, limit: u64, offset: u64) -> AppResult<ReviewQueuePage> {
        let total_count: i64 = self
            .rb
            .query_decode(
                "select count(*) as total from loan_application \
                 where final_status is null and risk_score > 60",
                vec![],
            )
            .await?;

        let applications: Vec<LoanApplication> = self
            .rb
            .query_decode(
                "select * from loan_application \
                 where final_status is null and risk_score > 60 \
                 order by created_at desc limit ? offset ?",
                vec![limit.into(), offset.into()],
            )
            .await?;

        Ok(ReviewQueuePage {
            applications,
            total_count,
            has_more: total_count > (offset + limit) as i64,
        })
    }

    /// 模型表现指标: 数据库口径 + 预测器运行时口径
    pub async fn model_metrics(&self) -> ModelMetricsDto {
        let (database_metrics, database_accessible) = match self.decided_rows_within(30).await {
            Ok(rows) => (summarize_decided(&rows, 30), true),
            Err(e) => {
                log::warn!("⚠️  读取模型指标失败: {}", e);
                (summarize_decided(&[], 30), false)
            }
        };

        let stats = self.predictor.stats();
        let predictor_metrics = PredictorMetrics {
            predictor_loaded: self.predictor.is_model_loaded(),
            prediction_method: self.predictor.method(),
            total_predictions: stats.total_predictions,
            model_predictions: stats.model_predictions,
            fallback_predictions: stats.fallback_predictions,
        };

        ModelMetricsDto {
            database_metrics,
            predictor_metrics,
            system_health: SystemHealth {
                predictor_available: true,
                database_accessible,
            },
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// 近 N 天且已有人工终审的样本
    async fn decided_rows_within(&self, days: i64) -> AppResult<Vec<DecidedRow>> {
        let cutoff = cutoff_datetime(days);
        let rows: Vec<DecidedRow> = self
            .rb
            .query_decode(
                "select loan_decision, final_status, risk_category from loan_application \
                 where created_at >= ? and final_status is not null",
                vec![cutoff.into()],
            )
            .await?;
        Ok(rows)
    }

    /// 读取启用的权重; 存储不可用时回退为空表, 下游换用内置默认
    async fn active_weights(&self) -> HashMap<String, f64> {
        match FeatureWeight::select_active(self.rb.as_ref()).await {
            Ok(rows) => rows
                .into_iter()
                .filter_map(|w| Some((w.feature_name?, w.weight?)))
                .collect(),
            Err(e) => {
                log::warn!("⚠️  读取特征权重失败, 使用内置默认权重: {}", e);
                HashMap::new()
            }
        }
    }
}

/// N 天前的时间串, 供 SQL 比较
pub(crate) fn cutoff_datetime(days: i64) -> String {
    (chrono::Local::now() - chrono::Duration::days(days))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// 汇总已终审样本: 预测与终审一致即视为命中
pub(crate) fn summarize_decided(rows: &[DecidedRow], period_days: i64) -> DbMetrics {
    let total = rows.len() as i64;
    if total == 0 {
        return DbMetrics {
            accuracy: None,
            total_applications: 0,
            correct_predictions: 0,
            period_days,
            risk_distribution: RiskBuckets::default(),
        };
    }

    let correct = rows
        .iter()
        .filter(|r| r.loan_decision.is_some() && r.loan_decision == r.final_status)
        .count() as i64;

    let mut buckets = RiskBuckets::default();
    for row in rows {
        match row.risk_category.as_deref() {
            Some("Low") => buckets.low += 1,
            Some("Medium") => buckets.medium += 1,
            Some("High") => buckets.high += 1,
            _ => {}
        }
    }

    DbMetrics {
        accuracy: Some(correct as f64 / total as f64),
        total_applications: total,
        correct_predictions: correct,
        period_days,
        risk_distribution: buckets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(decision: &str, final_status: &str, category: &str) -> DecidedRow {
        DecidedRow {
            loan_decision: Some(decision.to_string()),
            final_status: Some(final_status.to_string()),
            risk_category: Some(category.to_string()),
        }
    }

    #[test]
    fn test_summarize_empty_has_no_accuracy() {
        let metrics = summarize_decided(&[], 30);
        assert_eq!(metrics.accuracy, None);
        assert_eq!(metrics.total_applications, 0);
        assert_eq!(metrics.period_days, 30);
    }

    #[test]
    fn test_summarize_counts_hits_and_buckets() {
        let rows = vec![
            row("Yes", "Yes", "Low"),
            row("Yes", "No", "Medium"),
            row("No", "No", "High"),
            row("No", "No", "High"),
        ];
        let metrics = summarize_decided(&rows, 30);
        println!("accuracy: {:?}", metrics.accuracy);
        assert_eq!(metrics.accuracy, Some(0.75));
        assert_eq!(metrics.total_applications, 4);
        assert_eq!(metrics.correct_predictions, 3);
        assert_eq!(metrics.risk_distribution.low, 1);
        assert_eq!(metrics.risk_distribution.medium, 1);
        assert_eq!(metrics.risk_distribution.high, 2);
    }

    #[test]
    fn test_cutoff_is_sql_comparable() {
        let cutoff = cutoff_datetime(30);
        println!("cutoff: {}", cutoff);
        // YYYY-MM-DD HH:MM:SS
        assert_eq!(cutoff.len(), 19);
        assert_eq!(&cutoff[4..5], "-");
        assert_eq!(&cutoff[10..11], " ");
    }
}
