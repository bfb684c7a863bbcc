use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Local};
use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;
use rbs::Value;
use serde::{Deserialize, Serialize};

use common::error::AppResult;

use super::loan_service::cutoff_datetime;

/// 看板核心统计
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_applications: i64,
    pub pending_applications: i64,
    pub approved_applications: i64,
    pub rejected_applications: i64,
    /// 已终审样本中的通过率, 百分比保留两位
    pub approval_rate: f64,
    pub average_risk_score: f64,
    pub total_loan_amount: f64,
    pub approved_loan_amount: f64,
    pub applications_today: i64,
    pub applications_this_week: i64,
    pub applications_this_month: i64,
}

/// 风险分布
#[derive(Debug, Serialize)]
pub struct RiskDistribution {
    pub low_risk: i64,
    pub medium_risk: i64,
    pub high_risk: i64,
}

/// 单日审批走势
#[derive(Debug, Serialize)]
pub struct ApprovalTrend {
    pub date: String,
    pub approved: i64,
    pub rejected: i64,
    pub total: i64,
}

/// 最近申请的精简行
#[derive(Debug, Serialize)]
pub struct RecentApplication {
    pub application_id: Option<String>,
    pub loan_amount: Option<f64>,
    pub risk_score: Option<i32>,
    pub risk_category: Option<String>,
    pub status: &'static str,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardDto {
    pub stats: DashboardStats,
    pub risk_distribution: RiskDistribution,
    pub approval_trends: Vec<ApprovalTrend>,
    pub recent_applications: Vec<RecentApplication>,
}

/// 按天聚合行
#[derive(Debug, Deserialize)]
struct DayCount {
    day: Option<String>,
    total: i64,
}

#[derive(Debug, Deserialize)]
struct RecentRow {
    application_id: Option<String>,
    loan_amount: Option<f64>,
    risk_score: Option<i32>,
    risk_category: Option<String>,
    final_status: Option<String>,
    created_at: Option<DateTime>,
}

/// 管理看板聚合
pub struct DashboardService {
    rb: Arc<RBatis>,
}

impl DashboardService {
    pub fn new(rb: Arc<RBatis>) -> Self {
        Self { rb }
    }

    pub async fn dashboard(&self) -> AppResult<DashboardDto> {
        let total_applications = self.count_where("", vec![]).await?;
        let pending_applications = self
            .count_where(" where final_status is null", vec![])
            .await?;
        let approved_applications = self
            .count_where(" where final_status = 'Yes'", vec![])
            .await?;
        let rejected_applications = self
            .count_where(" where final_status = 'No'", vec![])
            .await?;

        let total_processed = approved_applications + rejected_applications;
        let approval_rate = if total_processed > 0 {
            round2(approved_applications as f64 / total_processed as f64 * 100.0)
        } else {
            0.0
        };

        let average_risk_score: f64 = self
            .rb
            .query_decode(
                "select coalesce(avg(risk_score), 0) as val from loan_application",
                vec![],
            )
            .await?;
        let total_loan_amount: f64 = self
            .rb
            .query_decode(
                "select coalesce(sum(loan_amount), 0) as val from loan_application",
                vec![],
            )
            .await?;
        let approved_loan_amount: f64 = self
            .rb
            .query_decode(
                "select coalesce(sum(loan_amount), 0) as val from loan_application \
                 where final_status = 'Yes'",
                vec![],
            )
            .await?;

        let today_start = format!("{} 00:00:00", Local::now().format("%Y-%m-%d"));
        let applications_today = self
            .count_where(" where created_at >= ?", vec![today_start.into()])
            .await?;
        let applications_this_week = self
            .count_where(" where created_at >= ?", vec![cutoff_datetime(7).into()])
            .await?;
        let applications_this_month = self
            .count_where(" where created_at >= ?", vec![cutoff_datetime(30).into()])
            .await?;

        let risk_distribution = RiskDistribution {
            low_risk: self
                .count_where(" where risk_category = 'Low'", vec![])
                .await?,
            medium_risk: self
                .count_where(" where risk_category = 'Medium'", vec![])
                .await?,
            high_risk: self
                .count_where(" where risk_category = 'High'", vec![])
                .await?,
        };

        let approval_trends = self.recent_trend(7).await?;
        let recent_applications = self.recent_applications(10).await?;

        Ok(DashboardDto {
            stats: DashboardStats {
                total_applications,
                pending_applications,
                approved_applications,
                rejected_applications,
                approval_rate,
                average_risk_score: round2(average_risk_score),
                total_loan_amount,
                approved_loan_amount,
                applications_today,
                applications_this_week,
                applications_this_month,
            },
            risk_distribution,
            approval_trends,
            recent_applications,
        })
    }

    async fn count_where(&self, where_sql: &str, args: Vec<Value>) -> AppResult<i64> {
        let sql = format!("select count(*) as total from loan_application{}", where_sql);
        Ok(self.rb.query_decode(&sql, args).await?)
    }

    /// 近 N 天逐日审批走势, 无数据的日期补零, 今天在前
    async fn recent_trend(&self, days: i64) -> AppResult<Vec<ApprovalTrend>> {
        let cutoff = cutoff_datetime(days);
        let approved = self.decided_by_day("Yes", &cutoff).await?;
        let rejected = self.decided_by_day("No", &cutoff).await?;

        let day_keys: Vec<String> = (0..days)
            .map(|i| (Local::now() - Duration::days(i)).format("%Y-%m-%d").to_string())
            .collect();
        Ok(build_trend(&day_keys, &approved, &rejected))
    }

    async fn decided_by_day(
        &self,
        final_status: &str,
        cutoff: &str,
    ) -> AppResult<HashMap<String, i64>> {
        let rows: Vec<DayCount> = self
            .rb
            .query_decode(
                "select date_format(reviewed_at, '%Y-%m-%d') as day, count(*) as total \
                 from loan_application where reviewed_at >= ? and final_status = ? \
                 group by date_format(reviewed_at, '%Y-%m-%d')",
                vec![cutoff.into(), final_status.into()],
            )
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|r| Some((r.day?, r.total)))
            .collect())
    }

    async fn recent_applications(&self, limit: u64) -> AppResult<Vec<RecentApplication>> {
        let rows: Vec<RecentRow> = self
            .rb
            .query_decode(
                "select application_id, loan_amount, risk_score, risk_category, \
                 final_status, created_at from loan_application \
                 order by created_at desc limit ?",
                vec![limit.into()],
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| RecentApplication {
                application_id: r.application_id,
                loan_amount: r.loan_amount,
                risk_score: r.risk_score,
                risk_category: r.risk_category,
                status: display_status(r.final_status.as_deref()),
                created_at: r.created_at.map(|d| d.to_string()),
            })
            .collect())
    }
}

/// 终审结果转看板展示状态
fn display_status(final_status: Option<&str>) -> &'static str {
    match final_status {
        Some("Yes") => "approved",
        Some("No") => "rejected",
        _ => "pending",
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn build_trend(
    day_keys: &[String],
    approved: &HashMap<String, i64>,
    rejected: &HashMap<String, i64>,
) -> Vec<ApprovalTrend> {
    day_keys
        .iter()
        .map(|day| {
            let a = approved.get(day).copied().unwrap_or(0);
            let r = rejected.get(day).copied().unwrap_or(0);
            ApprovalTrend {
                date: day.clone(),
                approved: a,
                rejected: r,
                total: a + r,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_status() {
        assert_eq!(display_status(Some("Yes")), "approved");
        assert_eq!(display_status(Some("No")), "rejected");
        assert_eq!(display_status(None), "pending");
        assert_eq!(display_status(Some("Maybe")), "pending");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn test_build_trend_fills_missing_days() {
        let days = vec!["2026-08-21".to_string(), "2026-08-20".to_string()];
        let mut approved = HashMap::new();
        approved.insert("2026-08-21".to_string(), 3_i64);
        let mut rejected = HashMap::new();
        rejected.insert("2026-08-20".to_string(), 1_i64);

        let trend = build_trend(&days, &approved, &rejected);
        println!("trend: {:?}", trend);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].approved, 3);
        assert_eq!(trend[0].rejected, 0);
        assert_eq!(trend[0].total, 3);
        assert_eq!(trend[1].approved, 0);
        assert_eq!(trend[1].rejected, 1);
        assert_eq!(trend[1].total, 1);
    }
}
