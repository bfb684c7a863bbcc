use std::collections::HashMap;

use serde::Deserialize;

use common::{AppError, AppResult};

use crate::features::DerivedFeatures;
use crate::validator::ValidatedApplication;

/// 训练产物, 线性分类器 + 预处理元数据
///
/// 由离线训练脚本导出为 JSON, 启动时加载一次并常驻进程
#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub trained_at: Option<String>,
    pub intercept: f64,
    pub coefficients: HashMap<String, f64>,
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub feature_importance: HashMap<String, f64>,
    /// 分类特征取值 -> 序数编码
    #[serde(default)]
    pub categorical_mappings: HashMap<String, HashMap<String, f64>>,
    #[serde(default)]
    pub feature_categories: FeatureCategories,
    /// 可选的标准化参数
    #[serde(default)]
    pub scaler: Option<ScalerParams>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCategories {
    #[serde(default)]
    pub categorical: Vec<String>,
    #[serde(default)]
    pub numerical: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScalerParams {
    pub mean: HashMap<String, f64>,
    pub std: HashMap<String, f64>,
}

impl ModelArtifact {
    pub fn load(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::prediction(format!("Cannot read model file {}: {}", path, e)))?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::prediction(format!("Cannot parse model file {}: {}", path, e)))
    }

    /// 按训练时的特征顺序编码、标准化并线性打分, 输出批准概率 sigmoid(z)
    pub fn approval_probability(
        &self,
        app: &ValidatedApplication,
        features: &DerivedFeatures,
    ) -> f64 {
        let mut z = self.intercept;
        for name in &self.feature_names {
            let mut x = self.raw_feature(name, app, features);
            if let Some(scaler) = &self.scaler {
                if let (Some(mean), Some(std)) = (scaler.mean.get(name), scaler.std.get(name)) {
                    if *std > 0.0 {
                        x = (x - mean) / std;
                    }
                }
            }
            z += self.coefficients.get(name).copied().unwrap_or(0.0) * x;
        }
        sigmoid(z)
    }

    /// 编码前的特征值: 分类特征查映射表, 数值特征按名取值
    ///
    /// 映射表中不存在的取值编码为 0
    fn raw_feature(
        &self,
        name: &str,
        app: &ValidatedApplication,
        features: &DerivedFeatures,
    ) -> f64 {
        if let Some(mapping) = self.categorical_mappings.get(name) {
            let raw: &str = match name {
                "gender" => app.gender.as_ref(),
                "married" => app.married.as_ref(),
                "education" => app.education.as_ref(),
                "self_employed" => app.self_employed.as_ref(),
                "property_area" => app.property_area.as_ref(),
                _ => "",
            };
            return mapping.get(raw).copied().unwrap_or(0.0);
        }
        match name {
            "applicant_income" => app.applicant_income,
            "coapplicant_income" => app.coapplicant_income,
            "loan_amount" => app.loan_amount,
            "loan_amount_term" => app.loan_amount_term,
            "dependents" => f64::from(app.dependents),
            "credit_history" => f64::from(app.credit_history),
            "total_income" => features.total_income,
            "emi" => features.emi,
            "emi_income_ratio" => features.emi_income_ratio,
            "loan_income_ratio" => features.loan_income_ratio,
            _ => 0.0,
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
