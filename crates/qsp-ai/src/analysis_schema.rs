//! Prompt text and the structured-output schema for QSP analyses.

use crate::llm_provider::{JsonSchema, ResponseFormat};
use qsp_core::StabilityStatus;
use serde_json::{json, Map, Value};

pub const SCHEMA_NAME: &str = "qsp_analysis";

/// Fixed instruction block describing the analytical framework and tone.
pub const QSP_SYSTEM_PROMPT: &str = r#"You are the QSP (Quranic Symbolic Prognostics) engine.
You study civilizational phenomena through the divine laws of history and society (sunan),
reasoning the way a scholar of usul al-fiqh reasons about causes, outcomes and corrective paths.

Framework:
- Treat every input (a verse, a surah or a civilizational phenomenon) as a system whose state H
  moves between stability and collapse under the governing laws S.
- Express the governing relations as short symbolic equations using the notation
  H (state), S (sunan), ⊥ (ruin), ↑ (empowerment), ∧, ∨, ¬, ⇒.
- Quantify the decisive variables as normalized scores between 0 and 100.
- Classify the overall state as exactly one of: Safe, Warning, Critical, Collapse.

Output rules:
- Write every narrative field in formal classical Arabic, in the register of juristic scholarship.
- The article has four parts: an introduction, a forecasting analysis of consequences (fiqh al-maalat),
  a modeling of causal relations explained in language (fiqh al-asbab), and corrective paths (fiqh al-istidrak).
  Separate paragraphs inside each part with line breaks.
- Cite one core verse that anchors the analysis.
- Never claim knowledge of the unseen; close with a disclaimer stating that the analysis reads
  the laws of God in history and does not foretell the future.
- Respond with a single JSON object that matches the provided schema and nothing else."#;

/// Task instruction wrapped around the user's literal input.
pub fn task_instruction(input_text: &str) -> String {
    format!(
        "قم بإجراء تحليل QSP معمق ومفصل جداً للمدخل التالي، مع كتابة مقال فقهي شرعي رصين يتجاوز 3500 حرف في مجمله، مع الالتزام التام باللغة الأصولية: \"{}\"",
        input_text
    )
}

/// JSON Schema (draft 2020-12 subset accepted by strict structured outputs)
/// for [`qsp_core::AnalysisResult`].
pub fn analysis_response_schema() -> Value {
    let string = || json!({ "type": "string" });
    let strings = || json!({ "type": "array", "items": { "type": "string" } });

    json!({
        "type": "object",
        "properties": {
            "title": string(),
            "coreVerse": string(),
            "analysisText": string(),
            "algebra": strings(),
            "variables": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "symbol": string(),
                        "name": string(),
                        "value": { "type": "number" },
                        "description": string()
                    },
                    "required": ["symbol", "name", "value", "description"],
                    "additionalProperties": false
                }
            },
            "article": {
                "type": "object",
                "properties": {
                    "intro": string(),
                    "forecasting": string(),
                    "modeling": string(),
                    "remedies": string()
                },
                "required": ["intro", "forecasting", "modeling", "remedies"],
                "additionalProperties": false
            },
            "status": { "type": "string", "enum": StabilityStatus::KNOWN },
            "recommendations": strings(),
            "disclaimer": string()
        },
        "required": [
            "title", "coreVerse", "analysisText", "algebra", "variables",
            "article", "status", "recommendations", "disclaimer"
        ],
        "additionalProperties": false
    })
}

pub fn analysis_response_format() -> ResponseFormat {
    ResponseFormat::JsonSchema {
        json_schema: JsonSchema {
            name: SCHEMA_NAME.to_string(),
            schema: analysis_response_schema(),
            strict: true,
        },
    }
}

/// Translate a JSON Schema into Gemini's OpenAPI-style `responseSchema`:
/// upper-case type names and no `additionalProperties`.
pub fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, value) in map {
                match (key.as_str(), value) {
                    ("additionalProperties", _) => {}
                    ("type", Value::String(t)) => {
                        out.insert(key.clone(), Value::String(t.to_uppercase()));
                    }
                    // property names must not be rewritten, only their schemas
                    ("properties", Value::Object(props)) => {
                        let props = props
                            .iter()
                            .map(|(name, sub)| (name.clone(), to_gemini_schema(sub)))
                            .collect();
                        out.insert(key.clone(), Value::Object(props));
                    }
                    _ => {
                        out.insert(key.clone(), to_gemini_schema(value));
                    }
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

/// Strip one surrounding Markdown code fence, if present.
pub fn strip_code_fence(payload: &str) -> &str {
    let trimmed = payload.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // drop the info string ("json") on the opening fence line
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}
