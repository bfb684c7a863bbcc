use serde::Deserialize;

// DTO for feature weight update
#[derive(Debug, Deserialize)]
pub struct UpdateWeightRequest {
    pub feature_name: String,
    /// 取值范围 (0, 10]
    pub weight: f64,
    pub description: Option<String>,
}
