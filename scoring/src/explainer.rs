use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use common::config::LlmConfig;
use common::{AppError, AppResult};

use crate::features::DerivedFeatures;
use crate::predictor::PredictionOutcome;
use crate::validator::ValidatedApplication;

const SYSTEM_PROMPT: &str = "You are a financial analyst expert at explaining loan approval decisions. Provide clear, concise explanations that are easy to understand.";

/// 贷款决定解释器
///
/// 配置了 api_key 时调用 OpenAI 兼容的 chat-completions 接口,
/// 未配置或调用失败时使用模板解释, 永远不向调用方抛错
pub struct LoanExplainer {
    client: Client,
    config: LlmConfig,
}

impl LoanExplainer {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    pub async fn explain(
        &self,
        app: &ValidatedApplication,
        features: &DerivedFeatures,
        outcome: &PredictionOutcome,
    ) -> String {
        if !self.is_enabled() {
            return template_explanation(app, features, outcome);
        }
        match self.request_explanation(app, features, outcome).await {
            Ok(text) => {
                debug!("✅ LLM 解释生成成功");
                text
            }
            Err(e) => {
                warn!("⚠️ LLM 解释生成失败: {}, 使用模板解释", e);
                template_explanation(app, features, outcome)
            }
        }
    }

    /// 单次调用, 不重试
    async fn request_explanation(
        &self,
        app: &ValidatedApplication,
        features: &DerivedFeatures,
        outcome: &PredictionOutcome,
    ) -> AppResult<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let body = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_prompt(app, features, outcome)}
            ],
            "max_tokens": 200,
            "temperature": 0.3
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::prediction(format!("LLM request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_else(|_| String::from(""));
            return Err(AppError::prediction(format!(
                "LLM returned {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletion = resp
            .json()
            .await
            .map_err(|e| AppError::prediction(format!("Cannot parse LLM response: {}", e)))?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AppError::prediction("LLM response has no choices"))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

fn build_prompt(
    app: &ValidatedApplication,
    features: &DerivedFeatures,
    outcome: &PredictionOutcome,
) -> String {
    format!(
        "Loan Application Analysis:\n\
         \n\
         Applicant Details:\n\
         - Gender: {}\n\
         - Marital Status: {}\n\
         - Education: {}\n\
         - Self Employed: {}\n\
         - Dependents: {}\n\
         - Property Area: {}\n\
         \n\
         Financial Information:\n\
         - Applicant Income: ${:.2}\n\
         - Co-applicant Income: ${:.2}\n\
         - Loan Amount: ${:.2}\n\
         - Loan Term: {} months\n\
         - Credit History: {}\n\
         - Total Income: ${:.2}\n\
         - EMI to Income Ratio: {:.4}\n\
         \n\
         AI Decision:\n\
         - Loan Decision: {}\n\
         - Risk Score: {}/100\n\
         - Risk Category: {}\n\
         - Recommendation: {}\n\
         - Confidence: {:.2}%\n\
         \n\
         Please provide a clear, professional explanation (2-3 sentences) for this loan decision that focuses on the key factors that influenced the outcome.",
        app.gender.as_ref(),
        app.married.as_ref(),
        app.education.as_ref(),
        app.self_employed.as_ref(),
        app.dependents,
        app.property_area.as_ref(),
        app.applicant_income,
        app.coapplicant_income,
        app.loan_amount,
        app.loan_amount_term,
        if app.credit_history == 1 { "Good" } else { "Poor" },
        features.total_income,
        features.emi_income_ratio,
        outcome.loan_decision.as_ref(),
        outcome.risk_score,
        outcome.risk_category.as_ref(),
        outcome.recommendation,
        outcome.confidence_score * 100.0,
    )
}

/// 模板解释, 决定 + 命中的关键因素 + 风险短语
fn template_explanation(
    app: &ValidatedApplication,
    features: &DerivedFeatures,
    outcome: &PredictionOutcome,
) -> String {
    let approved = outcome.loan_decision.is_approved();
    let base = if approved {
        "Loan approved based on"
    } else {
        "Loan rejected due to"
    };

    let mut factors: Vec<&'static str> = Vec::new();
    if approved {
        if app.credit_history == 1 {
            factors.push("good credit history");
        }
        if features.emi_income_ratio < 0.3 {
            factors.push("manageable EMI burden");
        }
        if features.total_income > 5000.0 {
            factors.push("adequate income level");
        }
    } else {
        if app.credit_history == 0 {
            factors.push("poor credit history");
        }
        if features.emi_income_ratio > 0.5 {
            factors.push("high EMI-to-income ratio");
        }
        if features.total_income < 3000.0 {
            factors.push("insufficient income");
        }
    }

    let suffix: Option<(&str, &str)> = if outcome.risk_score > 70 {
        Some(("and", "high financial risk"))
    } else if outcome.risk_score < 30 {
        Some(("with", "low financial risk"))
    } else {
        None
    };

    let tail = match (factors.as_slice(), suffix) {
        ([], None) => return format!("{} standard eligibility criteria.", base),
        ([], Some((_, phrase))) => phrase.to_string(),
        (listed, None) => join_factors(listed),
        (listed, Some((connective, phrase))) => {
            format!("{} {} {}", join_factors(listed), connective, phrase)
        }
    };
    format!("{} {}.", base, tail)
}

fn join_factors(factors: &[&'static str]) -> String {
    match factors {
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
        [] => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::derive_features;
    use crate::predictor::Predictor;
    use crate::weights::default_weights;
    use common::enums::{Education, Gender, LoanDecision, PropertyArea, RiskCategory, YesNo};

    fn approved_case() -> (ValidatedApplication, DerivedFeatures, PredictionOutcome) {
        let app = ValidatedApplication {
            gender: Gender::Male,
            married: YesNo::Yes,
            dependents: 0,
            education: Education::Graduate,
            self_employed: YesNo::No,
            applicant_income: 5849.0,
            coapplicant_income: 0.0,
            loan_amount: 128.0,
            loan_amount_term: 360.0,
            credit_history: 1,
            property_area: PropertyArea::Urban,
        };
        let features = derive_features(&app);
        let outcome = Predictor::rule_based().predict(&app, &features, &default_weights());
        (app, features, outcome)
    }

    fn rejected_case() -> (ValidatedApplication, DerivedFeatures, PredictionOutcome) {
        let app = ValidatedApplication {
            gender: Gender::Female,
            married: YesNo::No,
            dependents: 5,
            education: Education::NotGraduate,
            self_employed: YesNo::Yes,
            applicant_income: 2000.0,
            coapplicant_income: 0.0,
            loan_amount: 600.0,
            loan_amount_term: 12.0,
            credit_history: 0,
            property_area: PropertyArea::Rural,
        };
        let features = derive_features(&app);
        let outcome = Predictor::rule_based().predict(&app, &features, &default_weights());
        (app, features, outcome)
    }

    #[test]
    fn test_template_approved_branch() {
        let (app, features, outcome) = approved_case();
        let text = template_explanation(&app, &features, &outcome);
        println!("approved: {}", text);
        assert!(text.starts_with("Loan approved based on"));
        assert!(text.contains("good credit history"));
        assert!(text.contains("manageable EMI burden"));
        assert!(text.contains("adequate income level"));
        assert!(text.contains("low financial risk"));
        assert!(text.ends_with('.'));
    }

    #[test]
    fn test_template_rejected_branch() {
        let (app, features, outcome) = rejected_case();
        let text = template_explanation(&app, &features, &outcome);
        println!("rejected: {}", text);
        assert!(text.starts_with("Loan rejected due to"));
        assert!(text.contains("poor credit history"));
        assert!(text.contains("insufficient income"));
        assert!(text.contains("high financial risk"));
    }

    #[test]
    fn test_template_standard_eligibility() {
        let (mut app, mut features, mut outcome) = approved_case();
        // 没有任何因素命中且风险分不触发短语
        app.credit_history = 0;
        features.emi_income_ratio = 0.4;
        features.total_income = 4000.0;
        outcome.loan_decision = LoanDecision::Yes;
        outcome.risk_score = 45;
        outcome.risk_category = RiskCategory::Medium;
        let text = template_explanation(&app, &features, &outcome);
        assert_eq!(text, "Loan approved based on standard eligibility criteria.");
    }

    #[test]
    fn test_prompt_mentions_key_sections() {
        let (app, features, outcome) = approved_case();
        let prompt = build_prompt(&app, &features, &outcome);
        assert!(prompt.contains("Applicant Details:"));
        assert!(prompt.contains("Financial Information:"));
        assert!(prompt.contains("AI Decision:"));
        assert!(prompt.contains("- Credit History: Good"));
        assert!(prompt.contains("- Loan Decision: Yes"));
    }

    #[tokio::test]
    async fn test_unconfigured_key_uses_template() {
        let explainer = LoanExplainer::new(LlmConfig::default());
        assert!(!explainer.is_enabled());
        let (app, features, outcome) = approved_case();
        let text = explainer.explain(&app, &features, &outcome).await;
        assert!(text.starts_with("Loan approved based on"));
    }
}
