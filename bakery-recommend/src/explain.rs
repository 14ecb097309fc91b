//! Grounded explanation requests and response normalization.
//!
//! An [`ExplanationRequest`] carries the persona, the retrieved document as
//! grounding text, and the constraints the generator must follow. The
//! constraint wording lives in [`ExplanationConstraints`] so it can change
//! without touching how requests are assembled.

use std::sync::Arc;

use tracing::{debug, error};

use crate::error::{RecommendError, Result};
use crate::generation::{GenerationRequest, TextGenerator};

/// Label introducing the persona in the user turn.
const PERSONA_LABEL: &str = "사용자 성격:";
/// Label introducing the grounding document in the user turn.
const GROUNDING_LABEL: &str = "추천된 빵집 정보:";

/// Bounds and wording for generated explanations.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationConstraints {
    /// Fewest lines the explanation should have.
    pub min_lines: usize,
    /// Most lines kept after normalization.
    pub max_lines: usize,
}

impl Default for ExplanationConstraints {
    fn default() -> Self {
        Self { min_lines: 3, max_lines: 4 }
    }
}

/// Where a candidate sits among the bakeries recommended together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSlot {
    /// Zero-based position in the batch.
    pub position: usize,
    /// Number of bakeries recommended together.
    pub size: usize,
    /// Names of the bakeries ranked before this one.
    pub earlier_names: Vec<String>,
}

impl BatchSlot {
    /// The slot of the only candidate in a single recommendation.
    pub fn single() -> Self {
        Self { position: 0, size: 1, earlier_names: Vec::new() }
    }
}

impl ExplanationConstraints {
    /// The instruction lines sent to the generator.
    pub fn instructions(&self, bakery_name: Option<&str>, batch: &BatchSlot) -> Vec<String> {
        let opening = match bakery_name {
            Some(name) => format!("설명의 첫머리는 반드시 빵집 이름 '{name}'(으)로 시작해요."),
            None => "설명의 첫머리는 반드시 빵집 이름으로 시작해요.".to_string(),
        };
        let mut lines = vec![
            "'추천된 빵집 정보'에 적힌 내용만 근거로 삼고, 없는 사실은 지어내지 않아요.".to_string(),
            opening,
            format!("{}~{}줄로 짧게 설명해요.", self.min_lines, self.max_lines),
            "해당 빵집이 사용자 성격과 어떤 관계가 있는지, 말장난이나 빵집의 개성을 활용해 억지 같지만 나름 그럴듯하게 연결해요.".to_string(),
            "추론 과정이나 '논리적으로 보면' 같은 설명 방식에 대한 언급은 하지 않아요.".to_string(),
            "손님을 접대하듯 듣는 사람이 기분 좋게, 예쁜 ~해요 체로 말해요.".to_string(),
        ];
        if batch.size > 1 {
            lines.push(
                "여러 빵집을 함께 추천하고 있으니 다른 추천과 겹치지 않도록 이 빵집만의 이유를 말해요."
                    .to_string(),
            );
        }
        if batch.position > 0 {
            let earlier = if batch.earlier_names.is_empty() {
                "앞에서 추천한 빵집".to_string()
            } else {
                batch.earlier_names.iter().map(|name| format!("'{name}'")).collect::<Vec<_>>().join(", ")
            };
            lines.push(format!(
                "이번은 {}번째 추천이에요. {earlier}은(는) 이미 추천했으니 다시 언급하지 않아요.",
                batch.position + 1
            ));
        }
        lines
    }
}

/// A validated request for one candidate's explanation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationRequest {
    persona: String,
    grounding: String,
    bakery_name: Option<String>,
    batch: BatchSlot,
    temperature: Option<f32>,
    constraints: ExplanationConstraints,
}

impl ExplanationRequest {
    /// Create a new builder for constructing an [`ExplanationRequest`].
    pub fn builder() -> ExplanationRequestBuilder {
        ExplanationRequestBuilder::default()
    }

    /// The persona text.
    pub fn persona(&self) -> &str {
        &self.persona
    }

    /// The grounding document text.
    pub fn grounding(&self) -> &str {
        &self.grounding
    }

    /// The bakery name the explanation must open with, if known.
    pub fn bakery_name(&self) -> Option<&str> {
        self.bakery_name.as_deref()
    }

    /// This candidate's place in its batch.
    pub fn batch(&self) -> &BatchSlot {
        &self.batch
    }

    /// The constraints applied to this request.
    pub fn constraints(&self) -> &ExplanationConstraints {
        &self.constraints
    }

    /// Render into the generator's wire shape.
    pub fn to_generation_request(&self) -> GenerationRequest {
        let system = self
            .constraints
            .instructions(self.bakery_name.as_deref(), &self.batch)
            .iter()
            .map(|line| format!("- {line}"))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "{PERSONA_LABEL} {}\n\n{GROUNDING_LABEL}\n{}",
            self.persona.trim(),
            self.grounding
        );
        GenerationRequest { system, prompt, temperature: self.temperature }
    }
}

/// Builder for constructing a validated [`ExplanationRequest`].
#[derive(Debug, Clone, Default)]
pub struct ExplanationRequestBuilder {
    persona: Option<String>,
    grounding: Option<String>,
    bakery_name: Option<String>,
    batch: Option<BatchSlot>,
    temperature: Option<f32>,
    constraints: ExplanationConstraints,
}

impl ExplanationRequestBuilder {
    /// Set the persona text.
    pub fn persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    /// Set the grounding document text.
    pub fn grounding(mut self, grounding: impl Into<String>) -> Self {
        self.grounding = Some(grounding.into());
        self
    }

    /// Set the bakery name the explanation must open with.
    pub fn bakery_name(mut self, name: Option<String>) -> Self {
        self.bakery_name = name;
        self
    }

    /// Set the candidate's place in its batch. Defaults to
    /// [`BatchSlot::single`].
    pub fn batch(mut self, batch: BatchSlot) -> Self {
        self.batch = Some(batch);
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the constraints.
    pub fn constraints(mut self, constraints: ExplanationConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Build the [`ExplanationRequest`].
    ///
    /// # Errors
    ///
    /// Returns [`RecommendError::InvalidRequest`] if:
    /// - persona or grounding is missing or blank
    /// - `min_lines` is zero or greater than `max_lines`
    pub fn build(self) -> Result<ExplanationRequest> {
        let persona = non_blank(self.persona, "persona")?;
        let grounding = non_blank(self.grounding, "grounding text")?;
        let constraints = self.constraints;
        if constraints.min_lines == 0 || constraints.min_lines > constraints.max_lines {
            return Err(RecommendError::InvalidRequest(format!(
                "line bounds {}..={} are not a valid range",
                constraints.min_lines, constraints.max_lines
            )));
        }
        Ok(ExplanationRequest {
            persona,
            grounding,
            bakery_name: self.bakery_name.filter(|n| !n.trim().is_empty()),
            batch: self.batch.unwrap_or_else(BatchSlot::single),
            temperature: self.temperature,
            constraints,
        })
    }
}

fn non_blank(value: Option<String>, what: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RecommendError::InvalidRequest(format!("{what} must not be empty"))),
    }
}

/// Clean up a generated explanation.
///
/// Trims every line, drops blank lines, keeps at most `max_lines`, and makes
/// sure the text opens with `bakery_name` when one is known.
///
/// # Errors
///
/// Returns [`RecommendError::GenerationError`] if nothing is left.
pub fn normalize_explanation(
    raw: &str,
    bakery_name: Option<&str>,
    max_lines: usize,
    provider: &str,
) -> Result<String> {
    let lines: Vec<&str> = raw
        .lines()
        .map(|line| line.trim().trim_matches('"').trim())
        .filter(|line| !line.is_empty())
        .take(max_lines)
        .collect();
    if lines.is_empty() {
        return Err(RecommendError::GenerationError {
            provider: provider.to_string(),
            message: "generator returned an empty explanation".to_string(),
        });
    }

    let text = lines.join("\n");
    match bakery_name {
        Some(name) if !text.starts_with(name) => Ok(format!("{name}: {text}")),
        _ => Ok(text),
    }
}

/// Requests one explanation per candidate from a [`TextGenerator`].
pub struct ExplanationRequester {
    generator: Arc<dyn TextGenerator>,
    constraints: ExplanationConstraints,
    temperature: Option<f32>,
}

impl ExplanationRequester {
    /// Create a requester with default constraints and no temperature.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator, constraints: ExplanationConstraints::default(), temperature: None }
    }

    /// Set the explanation constraints.
    pub fn with_constraints(mut self, constraints: ExplanationConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Explain why the bakery in `document_text` suits `personality`.
    ///
    /// `batch` places the candidate among the bakeries recommended with it.
    ///
    /// # Errors
    ///
    /// Returns [`RecommendError::InvalidRequest`] if the request does not
    /// validate, or [`RecommendError::GenerationError`] if generation fails
    /// or yields an empty text. No retry is attempted.
    pub async fn explain(
        &self,
        personality: &str,
        document_text: &str,
        batch: BatchSlot,
    ) -> Result<String> {
        let bakery_name = bakery_rag::extract_name(document_text);
        let index = batch.position;
        let request = ExplanationRequest::builder()
            .persona(personality)
            .grounding(document_text)
            .bakery_name(bakery_name.clone())
            .batch(batch)
            .temperature(self.temperature)
            .constraints(self.constraints.clone())
            .build()?;

        let provider = self.generator.name();
        debug!(provider, index, bakery = ?bakery_name, "requesting explanation");

        let raw = self
            .generator
            .generate(&request.to_generation_request())
            .await
            .inspect_err(|e| error!(provider, index, error = %e, "explanation request failed"))?;

        normalize_explanation(&raw, bakery_name.as_deref(), self.constraints.max_lines, provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_persona_grounding_and_constraints() {
        let request = ExplanationRequest::builder()
            .persona("새로운 곳을 좋아해")
            .grounding("빵집 이름: Bread A\n평점: 총점 9.0")
            .bakery_name(Some("Bread A".into()))
            .batch(BatchSlot { position: 1, size: 3, earlier_names: vec!["동네 식빵집".into()] })
            .temperature(Some(0.7))
            .build()
            .unwrap();
        let wire = request.to_generation_request();

        assert!(wire.prompt.starts_with("사용자 성격: 새로운 곳을 좋아해"));
        assert!(wire.prompt.ends_with("추천된 빵집 정보:\n빵집 이름: Bread A\n평점: 총점 9.0"));
        assert!(wire.system.contains("'Bread A'"));
        assert!(wire.system.contains("3~4줄"));
        assert!(wire.system.contains("2번째 추천"));
        assert!(wire.system.contains("'동네 식빵집'은(는) 이미 추천했으니"));
        assert!(wire.system.contains("여러 빵집을 함께 추천"));
        assert_eq!(wire.temperature, Some(0.7));
    }

    #[test]
    fn single_recommendation_has_no_batch_notes() {
        let request =
            ExplanationRequest::builder().persona("p").grounding("g").build().unwrap();
        let system = request.to_generation_request().system;
        assert!(!system.contains("번째 추천"));
        assert!(!system.contains("여러 빵집"));
    }

    #[test]
    fn first_of_a_batch_mentions_the_batch_only() {
        let request = ExplanationRequest::builder()
            .persona("p")
            .grounding("g")
            .batch(BatchSlot { position: 0, size: 3, earlier_names: Vec::new() })
            .build()
            .unwrap();
        let system = request.to_generation_request().system;
        assert!(system.contains("여러 빵집"));
        assert!(!system.contains("번째 추천"));
    }

    #[test]
    fn blank_inputs_are_rejected() {
        let err = ExplanationRequest::builder().persona("  ").grounding("g").build().unwrap_err();
        assert!(matches!(err, RecommendError::InvalidRequest(_)));
        let err = ExplanationRequest::builder().persona("p").build().unwrap_err();
        assert!(matches!(err, RecommendError::InvalidRequest(_)));
    }

    #[test]
    fn inverted_line_bounds_are_rejected() {
        let err = ExplanationRequest::builder()
            .persona("p")
            .grounding("g")
            .constraints(ExplanationConstraints { min_lines: 5, max_lines: 2 })
            .build()
            .unwrap_err();
        assert!(matches!(err, RecommendError::InvalidRequest(_)));
    }

    #[test]
    fn normalization_trims_bounds_and_prefixes_the_name() {
        let raw = "\n  \"따뜻한 분위기가 어울려요.\"  \n\n둘째 줄\n셋째 줄\n넷째 줄\n다섯째 줄\n";
        let text = normalize_explanation(raw, Some("Bread A"), 4, "test").unwrap();
        assert_eq!(text, "Bread A: 따뜻한 분위기가 어울려요.\n둘째 줄\n셋째 줄\n넷째 줄");

        let text = normalize_explanation("Bread A는 좋아요", Some("Bread A"), 4, "test").unwrap();
        assert_eq!(text, "Bread A는 좋아요");
    }

    #[test]
    fn empty_generation_is_an_error() {
        let err = normalize_explanation(" \n \n", None, 4, "test").unwrap_err();
        assert!(matches!(err, RecommendError::GenerationError { .. }));
    }
}
