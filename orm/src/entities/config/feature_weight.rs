use rbatis::{crud, impl_select};
use rbatis::rbdc::datetime::DateTime;
use serde::{Deserialize, Serialize};

/// 特征权重
///
/// 规则评分使用的特征权重表，后台可调整，取值范围 (0, 10]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub id: Option<i64>,
    pub feature_name: Option<String>,
    pub weight: Option<f64>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub updated_by: Option<i64>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

crud!(FeatureWeight {}, "feature_weight");
impl_select!(FeatureWeight{select_active() -> Vec => "`where is_active = true order by weight desc`"});
impl_select!(FeatureWeight{select_by_name(feature_name: &str) -> Option => "`where feature_name = #{feature_name} LIMIT 1`"});
impl_select!(FeatureWeight{select_all_ordered() -> Vec => "`order by weight desc`"});

impl FeatureWeight {
    pub const TABLE_NAME: &'static str = "feature_weight";
}
