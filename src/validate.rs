use crate::draft::ScoreCard;
use crate::error::BackendError;
use serde_json::Value;

/// The exact numeric fields a score response must carry, in wire spelling.
pub const SCORE_FIELDS: [&str; 5] = [
    "subjectLine",
    "writingStyle",
    "content",
    "structure",
    "personalization",
];

/// Inclusive bounds every score must fall within.
pub const SCORE_RANGE: (f64, f64) = (0.0, 10.0);

fn malformed(reason: impl Into<String>) -> BackendError {
    BackendError::Malformed(reason.into())
}

/// Validate a decoded score response into a [`ScoreCard`].
///
/// `value` must hold `{ "scores": { five numeric fields }, "suggestions": text }`.
/// Missing fields and out-of-range values are rejected outright; nothing is
/// ever defaulted into place.
pub fn score_card_from_value(value: &Value) -> Result<ScoreCard, BackendError> {
    let scores = value
        .get("scores")
        .ok_or_else(|| malformed("missing `scores` object"))?;
    let suggestions = value
        .get("suggestions")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("missing `suggestions` text"))?;
    if suggestions.trim().is_empty() {
        return Err(malformed("`suggestions` is empty"));
    }

    Ok(ScoreCard {
        subject_line: bounded_score(scores, "subjectLine")?,
        writing_style: bounded_score(scores, "writingStyle")?,
        content: bounded_score(scores, "content")?,
        structure: bounded_score(scores, "structure")?,
        personalization: bounded_score(scores, "personalization")?,
        suggestions: suggestions.to_string(),
    })
}

/// Recover a score card from free-form model text.
///
/// Direct-provider replies are prose that should contain one JSON object;
/// this extracts the outermost `{ ... }` span and validates it like any
/// structured response. Accepts both the nested `{"scores": {...}}` shape
/// and a flat object carrying the five fields alongside `suggestions` —
/// models prompted for the nested shape occasionally flatten it.
pub fn score_card_from_text(text: &str) -> Result<ScoreCard, BackendError> {
    let value = extract_json_object(text)?;

    if value.get("scores").is_some() {
        return score_card_from_value(&value);
    }

    let nested = serde_json::json!({
        "scores": value,
        "suggestions": value.get("suggestions").cloned().unwrap_or(Value::Null),
    });
    score_card_from_value(&nested)
}

fn bounded_score(scores: &Value, field: &str) -> Result<f64, BackendError> {
    let n = scores
        .get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| malformed(format!("missing numeric field `{field}`")))?;
    let (lo, hi) = SCORE_RANGE;
    if !(lo..=hi).contains(&n) {
        return Err(malformed(format!("field `{field}` out of range: {n}")));
    }
    Ok(n)
}

fn extract_json_object(text: &str) -> Result<Value, BackendError> {
    let start = text
        .find('{')
        .ok_or_else(|| malformed("no JSON object in model reply"))?;
    let end = text
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| malformed("no JSON object in model reply"))?;

    serde_json::from_str(&text[start..=end])
        .map_err(|e| malformed(format!("could not parse model reply as JSON: {e}")))
}
