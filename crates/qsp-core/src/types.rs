use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Structured document returned by the analysis provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub title: String,
    pub core_verse: String,
    pub analysis_text: String,
    #[serde(default)]
    pub algebra: Vec<String>,
    #[serde(default)]
    pub variables: Vec<AnalysisVariable>,
    #[serde(default)]
    pub article: Article,
    pub status: StabilityStatus,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub disclaimer: String,
}

impl AnalysisResult {
    /// Parse a provider payload.
    pub fn from_json(payload: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// A named symbolic variable with a normalized score.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisVariable {
    pub symbol: String,
    pub name: String,
    /// Normalized 0-100 score
    pub value: f64,
    pub description: String,
}

/// Long-form article in four sections. Line breaks inside a section separate
/// paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    pub intro: String,
    pub forecasting: String,
    pub modeling: String,
    pub remedies: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArticleSection {
    Intro,
    Forecasting,
    Modeling,
    Remedies,
}

impl ArticleSection {
    pub const ALL: [ArticleSection; 4] = [
        ArticleSection::Intro,
        ArticleSection::Forecasting,
        ArticleSection::Modeling,
        ArticleSection::Remedies,
    ];
}

impl Article {
    pub fn section(&self, section: ArticleSection) -> &str {
        match section {
            ArticleSection::Intro => &self.intro,
            ArticleSection::Forecasting => &self.forecasting,
            ArticleSection::Modeling => &self.modeling,
            ArticleSection::Remedies => &self.remedies,
        }
    }

    /// Sections in reading order.
    pub fn sections(&self) -> impl Iterator<Item = (ArticleSection, &str)> {
        ArticleSection::ALL
            .into_iter()
            .map(move |s| (s, self.section(s)))
    }

    /// Non-blank paragraphs of one section.
    pub fn paragraphs(&self, section: ArticleSection) -> Vec<&str> {
        self.section(section)
            .lines()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sections().all(|(_, text)| text.trim().is_empty())
    }
}

/// Overall stability tag. Values outside the four known tags are kept
/// verbatim as `Undetermined` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StabilityStatus {
    Safe,
    Warning,
    Critical,
    Collapse,
    Undetermined(String),
}

impl StabilityStatus {
    pub const KNOWN: [&'static str; 4] = ["Safe", "Warning", "Critical", "Collapse"];

    pub fn as_str(&self) -> &str {
        match self {
            StabilityStatus::Safe => "Safe",
            StabilityStatus::Warning => "Warning",
            StabilityStatus::Critical => "Critical",
            StabilityStatus::Collapse => "Collapse",
            StabilityStatus::Undetermined(raw) => raw,
        }
    }

    pub fn is_determined(&self) -> bool {
        !matches!(self, StabilityStatus::Undetermined(_))
    }
}

impl FromStr for StabilityStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Safe" => StabilityStatus::Safe,
            "Warning" => StabilityStatus::Warning,
            "Critical" => StabilityStatus::Critical,
            "Collapse" => StabilityStatus::Collapse,
            other => StabilityStatus::Undetermined(other.to_string()),
        })
    }
}

impl From<String> for StabilityStatus {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

impl From<StabilityStatus> for String {
    fn from(value: StabilityStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for StabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalysisErrorKind;

    fn sample_json() -> serde_json::Value {
        serde_json::json!({
            "title": "سنة التدافع",
            "coreVerse": "وَلَوْلَا دَفْعُ اللَّهِ النَّاسَ",
            "analysisText": "summary",
            "algebra": ["H = S ∧ ¬⊥", "↑ ⇒ H"],
            "variables": [
                {"symbol": "H", "name": "Stability", "value": 42.0, "description": "state"},
                {"symbol": "S", "name": "Sunan", "value": 77.5, "description": "law"}
            ],
            "article": {
                "intro": "first\nsecond",
                "forecasting": "f",
                "modeling": "m",
                "remedies": "r"
            },
            "status": "Warning",
            "recommendations": ["one", "two"],
            "disclaimer": "not a prophecy"
        })
    }

    #[test]
    fn parses_schema_conforming_payload_field_for_field() {
        let payload = serde_json::to_string(&sample_json()).unwrap();
        let result = AnalysisResult::from_json(&payload).unwrap();

        assert_eq!(result.title, "سنة التدافع");
        assert_eq!(result.core_verse, "وَلَوْلَا دَفْعُ اللَّهِ النَّاسَ");
        assert_eq!(result.analysis_text, "summary");
        assert_eq!(result.algebra, vec!["H = S ∧ ¬⊥", "↑ ⇒ H"]);
        assert_eq!(result.variables.len(), 2);
        assert_eq!(result.variables[0].symbol, "H");
        assert_eq!(result.variables[0].value, 42.0);
        assert_eq!(result.variables[1].value, 77.5);
        assert_eq!(result.article.intro, "first\nsecond");
        assert_eq!(result.article.remedies, "r");
        assert_eq!(result.status, StabilityStatus::Warning);
        assert_eq!(result.recommendations, vec!["one", "two"]);
        assert_eq!(result.disclaimer, "not a prophecy");

        // serializing back yields the same document
        assert_eq!(serde_json::to_value(&result).unwrap(), sample_json());
    }

    #[test]
    fn unknown_status_is_kept_as_undetermined() {
        let mut json = sample_json();
        json["status"] = "Thriving".into();
        let result: AnalysisResult = serde_json::from_value(json).unwrap();
        assert_eq!(
            result.status,
            StabilityStatus::Undetermined("Thriving".to_string())
        );
        assert!(!result.status.is_determined());
        assert_eq!(result.status.to_string(), "Thriving");
    }

    #[test]
    fn missing_sequences_default_to_empty() {
        let json = serde_json::json!({
            "title": "t",
            "coreVerse": "v",
            "analysisText": "a",
            "status": "Safe",
            "disclaimer": "d"
        });
        let result: AnalysisResult = serde_json::from_value(json).unwrap();
        assert!(result.algebra.is_empty());
        assert!(result.variables.is_empty());
        assert!(result.recommendations.is_empty());
        assert!(result.article.is_empty());
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let mut json = sample_json();
        json.as_object_mut().unwrap().remove("title");
        let err = AnalysisResult::from_json(&json.to_string()).unwrap_err();
        assert_eq!(err.kind(), AnalysisErrorKind::MalformedResponse);
    }

    #[test]
    fn non_numeric_variable_value_is_malformed() {
        let mut json = sample_json();
        json["variables"][0]["value"] = "high".into();
        let err = AnalysisResult::from_json(&json.to_string()).unwrap_err();
        assert_eq!(err.kind(), AnalysisErrorKind::MalformedResponse);
    }

    #[test]
    fn paragraphs_skip_blank_lines() {
        let article = Article {
            intro: "first\n\n  second  \n".to_string(),
            ..Default::default()
        };
        assert_eq!(
            article.paragraphs(ArticleSection::Intro),
            vec!["first", "second"]
        );
        assert!(article.paragraphs(ArticleSection::Remedies).is_empty());
    }
}
