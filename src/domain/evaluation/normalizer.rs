//! Response normalizer - turns raw model text into an evaluation payload.
//!
//! Models return the evaluation as free text around (often malformed or
//! truncated) JSON. The normalizer extracts the JSON candidate, repairs it,
//! rescales 1-5 scores to the 0-100 scale, validates the shape, and hands a
//! structured result back. It never panics on malformed input; irrecoverable
//! text yields `None` and the caller substitutes the default evaluation.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::evaluation::aggregator::EvaluationAggregator;
use crate::domain::evaluation::criteria::{
    CriterionSpec, Dimension, DimensionScore, EvaluationCriterion, EvaluationResult,
    CRITERION_COUNT, DIMENSION_COUNT,
};
use crate::domain::foundation::{Score, Timestamp};

/// Overall scores at or below this are treated as a 1-5 scale and rescaled.
/// A genuine 0-100 score this low is indistinguishable; resolved by
/// convention, not certainty.
const SCALE_DETECTION_THRESHOLD: f64 = 5.0;

/// Factor applied when a 1-5 scale is detected.
const SCALE_FACTOR: f64 = 20.0;

/// Length of the raw-text sample included in diagnostics.
const DIAGNOSTIC_SAMPLE_CHARS: usize = 120;

/// How thoroughly the parsed payload is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Exact field presence and the exact 14-criteria / 5-dimension shape.
    /// Used by conformance tests.
    Strict,
    /// Object shape, overall bounds, and a non-empty dimension list with
    /// name + numeric score. Live traffic tolerates minor schema drift.
    #[default]
    Relaxed,
}

#[derive(Debug, Error)]
enum NormalizeError {
    #[error("no JSON object found in response")]
    NoJson,

    #[error("JSON parse failed after repair: {0}")]
    Parse(String),

    #[error("payload shape invalid: {0}")]
    Shape(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

/// Extracts, repairs, rescales, and validates evaluation JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseNormalizer {
    mode: ValidationMode,
    aggregator: EvaluationAggregator,
}

impl ResponseNormalizer {
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            aggregator: EvaluationAggregator::new(),
        }
    }

    /// Relaxed-mode normalizer for live traffic.
    pub fn relaxed() -> Self {
        Self::new(ValidationMode::Relaxed)
    }

    /// Strict-mode normalizer for conformance checks.
    pub fn strict() -> Self {
        Self::new(ValidationMode::Strict)
    }

    /// Normalizes raw model text into an evaluation result.
    ///
    /// `None` means the text was irrecoverable and the caller should
    /// substitute the default evaluation.
    pub fn normalize(&self, raw: &str) -> Option<EvaluationResult> {
        match self.try_normalize(raw) {
            Ok(result) => Some(result),
            Err(err) => {
                let sample: String = raw.chars().take(DIAGNOSTIC_SAMPLE_CHARS).collect();
                warn!(error = %err, sample = %sample, "model output not normalizable");
                None
            }
        }
    }

    fn try_normalize(&self, raw: &str) -> Result<EvaluationResult, NormalizeError> {
        let candidate = extract_json(raw).ok_or(NormalizeError::NoJson)?;
        let repaired = repair(&candidate);

        let mut value: Value = serde_json::from_str(&repaired)
            .map_err(|e| NormalizeError::Parse(e.to_string()))?;

        if overall_of(&value).is_some_and(|overall| overall <= SCALE_DETECTION_THRESHOLD) {
            debug!("overall score <= 5, rescaling tree as 1-5 scale");
            rescale_scores(&mut value);
        }

        let payload: RawEvaluation = serde_json::from_value(value)
            .map_err(|e| NormalizeError::Shape(e.to_string()))?;

        self.validate(&payload)?;
        self.build_result(payload)
    }

    fn validate(&self, payload: &RawEvaluation) -> Result<(), NormalizeError> {
        let overall = payload.overall_score;
        if !(0.0..=100.0).contains(&overall) {
            return Err(NormalizeError::Validation(format!(
                "overall score {overall} out of bounds"
            )));
        }
        if payload.dimensions.is_empty() {
            return Err(NormalizeError::Validation("no dimensions present".into()));
        }
        for dimension in &payload.dimensions {
            if dimension.name.trim().is_empty() {
                return Err(NormalizeError::Validation("dimension without a name".into()));
            }
        }

        if self.mode == ValidationMode::Strict {
            self.validate_strict(payload)?;
        }
        Ok(())
    }

    fn validate_strict(&self, payload: &RawEvaluation) -> Result<(), NormalizeError> {
        if payload.dimensions.len() != DIMENSION_COUNT {
            return Err(NormalizeError::Validation(format!(
                "expected {DIMENSION_COUNT} dimensions, got {}",
                payload.dimensions.len()
            )));
        }

        let mut total_criteria = 0;
        for raw_dimension in &payload.dimensions {
            let dimension = Dimension::from_name(&raw_dimension.name).ok_or_else(|| {
                NormalizeError::Validation(format!("unknown dimension {:?}", raw_dimension.name))
            })?;
            if !(0.0..=100.0).contains(&raw_dimension.score) {
                return Err(NormalizeError::Validation(format!(
                    "dimension {dimension} score out of bounds"
                )));
            }
            if raw_dimension.criteria.len() != dimension.criterion_ids().len() {
                return Err(NormalizeError::Validation(format!(
                    "dimension {dimension} expects {} criteria, got {}",
                    dimension.criterion_ids().len(),
                    raw_dimension.criteria.len()
                )));
            }
            for criterion in &raw_dimension.criteria {
                let spec = resolve_criterion(criterion).ok_or_else(|| {
                    NormalizeError::Validation(format!("unknown criterion {:?}", criterion.name))
                })?;
                if spec.dimension != dimension {
                    return Err(NormalizeError::Validation(format!(
                        "criterion {} not a member of {dimension}",
                        spec.id
                    )));
                }
                if !(0.0..=100.0).contains(&criterion.score) {
                    return Err(NormalizeError::Validation(format!(
                        "criterion {} score out of bounds",
                        spec.id
                    )));
                }
                if criterion.feedback.trim().is_empty() {
                    return Err(NormalizeError::Validation(format!(
                        "criterion {} missing feedback",
                        spec.id
                    )));
                }
            }
            total_criteria += raw_dimension.criteria.len();
        }

        if total_criteria != CRITERION_COUNT {
            return Err(NormalizeError::Validation(format!(
                "expected {CRITERION_COUNT} criteria, got {total_criteria}"
            )));
        }
        Ok(())
    }

    /// Builds the result. With all 14 criteria resolvable the scores are
    /// re-aggregated from the leaves, which enforces the rounded-mean
    /// invariants regardless of what the model claimed per dimension.
    fn build_result(&self, payload: RawEvaluation) -> Result<EvaluationResult, NormalizeError> {
        let mut resolved: Vec<EvaluationCriterion> = Vec::new();
        for raw_dimension in &payload.dimensions {
            for criterion in &raw_dimension.criteria {
                if let Some(spec) = resolve_criterion(criterion) {
                    let mut built = EvaluationCriterion::from_spec(
                        spec,
                        Score::from_f64(criterion.score),
                        criterion.feedback.clone(),
                    );
                    if let Some(ref evidence) = criterion.evidence {
                        built = built.with_evidence(evidence.clone());
                    }
                    resolved.push(built);
                }
            }
        }

        if resolved.len() == CRITERION_COUNT {
            let mut result = self.aggregator.aggregate(resolved);
            if !payload.suggestions.is_empty() {
                result.suggestions = payload.suggestions;
            }
            if !payload.strengths.is_empty() {
                result.strengths = payload.strengths;
            }
            return Ok(result);
        }

        // Drifted shape on the relaxed path: keep whatever maps onto the
        // fixed dimensions so the result stays displayable.
        let dimensions: Vec<DimensionScore> = payload
            .dimensions
            .iter()
            .filter_map(|raw_dimension| {
                let dimension = Dimension::from_name(&raw_dimension.name)?;
                let criteria = raw_dimension
                    .criteria
                    .iter()
                    .filter_map(|criterion| {
                        let spec = resolve_criterion(criterion)?;
                        Some(EvaluationCriterion::from_spec(
                            spec,
                            Score::from_f64(criterion.score),
                            criterion.feedback.clone(),
                        ))
                    })
                    .collect();
                Some(DimensionScore {
                    dimension,
                    score: Score::from_f64(raw_dimension.score),
                    feedback: raw_dimension.feedback.clone(),
                    criteria,
                })
            })
            .collect();

        // Nothing mapped onto the fixed dimension set; a blank scorecard
        // is not displayable, so the caller must fall back to the default.
        if dimensions.is_empty() {
            return Err(NormalizeError::Validation(
                "no dimension maps onto the fixed dimension set".into(),
            ));
        }

        Ok(EvaluationResult {
            overall_score: Score::from_f64(payload.overall_score),
            dimensions,
            suggestions: payload.suggestions,
            strengths: payload.strengths,
            evaluated_at: Timestamp::now(),
        })
    }
}

fn resolve_criterion(criterion: &RawCriterion) -> Option<&'static CriterionSpec> {
    criterion
        .id
        .and_then(CriterionSpec::by_id)
        .or_else(|| CriterionSpec::by_name(&criterion.name))
}

// ----- Raw payload shape -----

#[derive(Debug, Deserialize)]
struct RawEvaluation {
    #[serde(rename = "overallScore", alias = "overall_score", alias = "overall")]
    overall_score: f64,
    dimensions: Vec<RawDimension>,
    #[serde(default)]
    suggestions: Vec<String>,
    #[serde(default)]
    strengths: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawDimension {
    name: String,
    score: f64,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    criteria: Vec<RawCriterion>,
}

#[derive(Debug, Deserialize)]
struct RawCriterion {
    #[serde(default)]
    id: Option<u8>,
    #[serde(default)]
    name: String,
    score: f64,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    evidence: Option<String>,
}

// ----- Extraction -----

/// Pulls the JSON candidate out of the raw text.
///
/// Order: fenced ```json block, then the same marker without a closing
/// fence (truncated responses), then the first `{...}` span. A fence that
/// carries no object (a bare code block trailing unfenced JSON) falls back
/// to scanning the whole text.
fn extract_json(raw: &str) -> Option<String> {
    let body = if let Some(start) = raw.find("```json") {
        fence_body(&raw[start + "```json".len()..])
    } else if let Some(start) = raw.find("```") {
        fence_body(&raw[start + "```".len()..])
    } else {
        raw
    };
    let source = if body.contains('{') { body } else { raw };

    let start = source.find('{')?;
    Some(balanced_span(&source[start..]))
}

/// Content of a fence, tolerating a missing closing marker.
fn fence_body(after_marker: &str) -> &str {
    match after_marker.find("```") {
        Some(end) => &after_marker[..end],
        None => after_marker,
    }
}

/// The span from the opening brace to its balanced closer, or to the end
/// of input when the text is truncated mid-object (repair closes it).
fn balanced_span(s: &str) -> String {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (index, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match c {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return s[..=index].to_string();
                }
            }
            _ => {}
        }
    }
    s.to_string()
}

// ----- Repair -----

/// Best-effort repair applied unconditionally before parsing.
///
/// Recovers output truncated mid-generation; must never panic however
/// mangled the input is.
fn repair(candidate: &str) -> String {
    let stripped = strip_fence_markers(candidate);
    let quoted = normalize_smart_quotes(&stripped);
    let cleaned = strip_control_chars(&quoted);
    let keyless = strip_dangling_key(&cleaned);
    let closed = close_unbalanced(&keyless);
    strip_trailing_commas(&closed)
}

fn strip_fence_markers(s: &str) -> String {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix("```json").unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix("```").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim().to_string()
}

fn normalize_smart_quotes(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}

fn strip_control_chars(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
        .collect()
}

/// Removes an incomplete trailing key left by mid-generation truncation,
/// e.g. `{"a": 1, "feedb` or `{"a": 1, "feedback":`.
fn strip_dangling_key(s: &str) -> String {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escape = false;
    // Index of the ',' or '{' preceding the current object-level string.
    let mut cut_point: Option<usize> = None;
    let mut pending_cut: Option<usize> = None;

    for (index, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                // Only object-level strings following ',' or '{' are keys.
                cut_point = pending_cut;
            }
            '{' | '[' => {
                stack.push(c);
                pending_cut = (c == '{').then_some(index + c.len_utf8());
            }
            '}' | ']' => {
                stack.pop();
                pending_cut = None;
            }
            ',' if stack.last() == Some(&'{') => pending_cut = Some(index),
            ':' => pending_cut = None,
            c if c.is_whitespace() => {}
            _ => {}
        }
    }

    // Truncated inside an object key: cut back to the separator before it.
    if in_string && stack.last() == Some(&'{') {
        if let Some(cut) = cut_point {
            return s[..cut].to_string();
        }
    }

    // Complete key with no value at end of input (`..., "feedback":`).
    let trimmed_end = s.trim_end();
    if !in_string && trimmed_end.ends_with(':') && stack.last() == Some(&'{') {
        if let Some(cut) = last_separator_at_object_level(trimmed_end) {
            return s[..cut].to_string();
        }
    }

    s.to_string()
}

/// Position of the last ',' (or just after '{') at the current object level,
/// used to drop a trailing `"key":` fragment.
fn last_separator_at_object_level(s: &str) -> Option<usize> {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escape = false;
    let mut last: Option<usize> = None;

    for (index, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => {
                stack.push(c);
                last = Some(index + 1);
            }
            '[' => stack.push(c),
            '}' | ']' => {
                stack.pop();
            }
            ',' if stack.len() == 1 || stack.last() == Some(&'{') => last = Some(index),
            _ => {}
        }
    }
    last
}

/// Closes an unterminated string and appends missing `}`/`]` closers in
/// reverse nesting order.
fn close_unbalanced(s: &str) -> String {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escape = false;

    for c in s.chars() {
        if escape {
            escape = false;
            continue;
        }
        match c {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => stack.push(c),
            '}' if !in_string => {
                if stack.last() == Some(&'{') {
                    stack.pop();
                }
            }
            ']' if !in_string => {
                if stack.last() == Some(&'[') {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    let mut out = s.trim_end().to_string();
    if in_string {
        out.push('"');
    }
    // A value may have been cut right after its separator.
    if out.ends_with(':') || out.ends_with(',') {
        out.pop();
    }
    while let Some(open) = stack.pop() {
        out.push(if open == '{' { '}' } else { ']' });
    }
    out
}

/// Removes commas directly before a closing bracket, outside strings.
fn strip_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape = false;

    for (index, &c) in chars.iter().enumerate() {
        if escape {
            escape = false;
            out.push(c);
            continue;
        }
        if in_string {
            if c == '\\' {
                escape = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[index + 1..].iter().find(|ch| !ch.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

// ----- Scale normalization -----

/// Reads the overall score from the parsed tree, accepting field aliases.
fn overall_of(value: &Value) -> Option<f64> {
    ["overallScore", "overall_score", "overall"]
        .iter()
        .find_map(|key| value.get(*key))
        .and_then(Value::as_f64)
}

/// Multiplies every score-bearing field by 20, recursively.
fn rescale_scores(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if is_score_key(key) {
                    if let Some(number) = child.as_f64() {
                        *child = scaled_number(number);
                        continue;
                    }
                }
                rescale_scores(child);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                rescale_scores(item);
            }
        }
        _ => {}
    }
}

fn is_score_key(key: &str) -> bool {
    matches!(key, "score" | "overallScore" | "overall_score" | "overall")
}

fn scaled_number(number: f64) -> Value {
    let scaled = (number * SCALE_FACTOR).round();
    Value::from(scaled as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload(score: u8) -> String {
        let dimensions: Vec<String> = Dimension::ALL
            .iter()
            .map(|dimension| {
                let criteria: Vec<String> = dimension
                    .criterion_ids()
                    .iter()
                    .map(|id| {
                        format!(
                            r#"{{"id":{id},"name":"{}","score":{score},"feedback":"点评{id}"}}"#,
                            CriterionSpec::by_id(*id).unwrap().name
                        )
                    })
                    .collect();
                format!(
                    r#"{{"name":"{}","score":{score},"feedback":"整体点评","criteria":[{}]}}"#,
                    dimension.display_name(),
                    criteria.join(",")
                )
            })
            .collect();
        format!(
            r#"{{"overallScore":{score},"dimensions":[{}],"suggestions":["多练习"],"strengths":["开场"]}}"#,
            dimensions.join(",")
        )
    }

    #[test]
    fn normalizes_clean_full_payload() {
        let result = ResponseNormalizer::strict()
            .normalize(&full_payload(80))
            .unwrap();

        assert_eq!(result.overall_score.value(), 80);
        assert!(result.has_full_shape());
        assert_eq!(result.suggestions, vec!["多练习".to_string()]);
    }

    #[test]
    fn extracts_from_fenced_block() {
        let raw = format!("评估如下:\n```json\n{}\n```\n以上。", full_payload(80));
        let result = ResponseNormalizer::relaxed().normalize(&raw).unwrap();
        assert_eq!(result.overall_score.value(), 80);
    }

    #[test]
    fn tolerates_missing_closing_fence() {
        let raw = format!("```json\n{}", full_payload(80));
        let result = ResponseNormalizer::relaxed().normalize(&raw).unwrap();
        assert_eq!(result.overall_score.value(), 80);
    }

    #[test]
    fn empty_fence_after_unfenced_json_does_not_mask_it() {
        let raw = format!("{}\n补充说明:\n```\n无\n```", full_payload(80));
        let result = ResponseNormalizer::relaxed().normalize(&raw).unwrap();
        assert_eq!(result.overall_score.value(), 80);
    }

    #[test]
    fn extracts_first_object_span_from_prose() {
        let raw = format!("下面是JSON {} 谢谢", full_payload(80));
        let result = ResponseNormalizer::relaxed().normalize(&raw).unwrap();
        assert_eq!(result.overall_score.value(), 80);
    }

    #[test]
    fn plain_prose_yields_none() {
        assert!(ResponseNormalizer::relaxed().normalize("抱歉,我无法评估。").is_none());
        assert!(ResponseNormalizer::relaxed().normalize("").is_none());
    }

    #[test]
    fn repair_closes_two_objects_and_one_array() {
        let truncated = r#"{"overallScore": 80, "dimensions": [{"name": "沟通能力", "score": 80"#;
        let repaired = repair(truncated);
        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["overallScore"], 80);
        assert_eq!(value["dimensions"][0]["score"], 80);
    }

    #[test]
    fn repair_strips_trailing_commas() {
        let raw = r#"{"overallScore": 80, "dimensions": [{"name": "沟通能力", "score": 80,},],}"#;
        let repaired = repair(raw);
        assert!(serde_json::from_str::<Value>(&repaired).is_ok());
    }

    #[test]
    fn repair_drops_dangling_incomplete_key() {
        let truncated = r#"{"overallScore": 80, "dimensions": [], "sugge"#;
        let repaired = repair(truncated);
        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["overallScore"], 80);
        assert!(value.get("sugge").is_none());
    }

    #[test]
    fn repair_drops_key_with_missing_value() {
        let truncated = r#"{"overallScore": 80, "dimensions": [], "suggestions":"#;
        let repaired = repair(truncated);
        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["overallScore"], 80);
        assert!(value.get("suggestions").is_none());
    }

    #[test]
    fn repair_normalizes_smart_quotes() {
        let raw = "{\u{201C}overallScore\u{201D}: 80, \u{201C}dimensions\u{201D}: []}";
        let repaired = repair(raw);
        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["overallScore"], 80);
    }

    #[test]
    fn repair_strips_control_characters() {
        let raw = "{\"overallScore\":\u{0000} 80, \"dimensions\": []}";
        let repaired = repair(raw);
        assert!(serde_json::from_str::<Value>(&repaired).is_ok());
    }

    #[test]
    fn low_overall_rescales_whole_tree() {
        let raw = r#"{"overallScore": 4, "dimensions": [{"name": "沟通能力", "score": 4.5, "criteria": [{"id": 1, "score": 3, "feedback": "一般"}]}]}"#;
        let result = ResponseNormalizer::relaxed().normalize(raw).unwrap();

        assert_eq!(result.overall_score.value(), 80);
        assert_eq!(result.dimensions[0].score.value(), 90);
        assert_eq!(result.dimensions[0].criteria[0].score.value(), 60);
    }

    #[test]
    fn high_overall_is_not_rescaled() {
        let raw = r#"{"overallScore": 82, "dimensions": [{"name": "沟通能力", "score": 82}]}"#;
        let result = ResponseNormalizer::relaxed().normalize(raw).unwrap();
        assert_eq!(result.overall_score.value(), 82);
        assert_eq!(result.dimensions[0].score.value(), 82);
    }

    #[test]
    fn full_shape_is_reaggregated_from_leaves() {
        // Model claims an inconsistent overall; the leaf mean wins.
        let mut payload = full_payload(80);
        payload = payload.replacen(r#""overallScore":80"#, r#""overallScore":55"#, 1);

        let result = ResponseNormalizer::relaxed().normalize(&payload).unwrap();
        assert_eq!(result.overall_score.value(), 80);
    }

    #[test]
    fn relaxed_accepts_drifted_shape() {
        let raw = r#"{"overallScore": 70, "dimensions": [{"name": "沟通能力", "score": 72}, {"name": "本品知识", "score": 68}]}"#;
        let result = ResponseNormalizer::relaxed().normalize(raw).unwrap();

        assert_eq!(result.overall_score.value(), 70);
        assert_eq!(result.dimensions.len(), 2);
        assert_eq!(result.dimensions[0].dimension, Dimension::Communication);
    }

    #[test]
    fn relaxed_rejects_drift_with_only_unknown_dimensions() {
        // Valid JSON, but no dimension name maps onto the fixed set; a
        // scorecard with zero dimensions is not displayable.
        let raw = r#"{"overallScore": 70, "dimensions": [{"name": "Presentation", "score": 72}, {"name": "Empathy", "score": 68}]}"#;
        assert!(ResponseNormalizer::relaxed().normalize(raw).is_none());
    }

    #[test]
    fn strict_rejects_drifted_shape() {
        let raw = r#"{"overallScore": 70, "dimensions": [{"name": "沟通能力", "score": 72}]}"#;
        assert!(ResponseNormalizer::strict().normalize(raw).is_none());
    }

    #[test]
    fn strict_rejects_out_of_bounds_scores() {
        let payload = full_payload(80).replacen(r#""score":80"#, r#""score":130"#, 2);
        assert!(ResponseNormalizer::strict().normalize(&payload).is_none());
    }

    #[test]
    fn relaxed_rejects_empty_dimensions() {
        let raw = r#"{"overallScore": 70, "dimensions": []}"#;
        assert!(ResponseNormalizer::relaxed().normalize(raw).is_none());
    }

    #[test]
    fn normalize_is_idempotent_on_own_output() {
        let first = ResponseNormalizer::relaxed()
            .normalize(&full_payload(80))
            .unwrap();
        let serialized = serde_json::to_string(&first).unwrap();
        let second = ResponseNormalizer::relaxed().normalize(&serialized).unwrap();

        assert_eq!(second.overall_score, first.overall_score);
        assert_eq!(second.suggestions, first.suggestions);
        assert_eq!(second.strengths, first.strengths);
        let first_scores: Vec<_> = first.dimensions.iter().map(|d| (d.dimension, d.score)).collect();
        let second_scores: Vec<_> = second.dimensions.iter().map(|d| (d.dimension, d.score)).collect();
        assert_eq!(second_scores, first_scores);
    }

    #[test]
    fn never_panics_on_garbage() {
        let normalizer = ResponseNormalizer::relaxed();
        for garbage in [
            "{{{{[[[",
            "```json",
            "{\"a\": \u{201C}",
            "}}}]]",
            "{\"overallScore\":",
            "null",
        ] {
            let _ = normalizer.normalize(garbage);
        }
    }
}
