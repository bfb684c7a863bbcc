// 评分流水线
// 校验 -> 衍生特征 -> 预测 (模型/规则兜底) -> 解释

pub mod explainer;
pub mod features;
pub mod model;
pub mod predictor;
pub mod rules;
pub mod validator;
pub mod weights;

// 重新导出常用类型和函数
pub use explainer::LoanExplainer;
pub use features::{derive_features, DerivedFeatures};
pub use model::ModelArtifact;
pub use predictor::{PredictionOutcome, PredictionStats, Predictor, ScoringStrategy, StatsSnapshot};
pub use validator::{validate_application, ValidatedApplication};
pub use weights::{default_weight_rows, default_weights, validate_weight};
