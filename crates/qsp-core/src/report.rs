//! Presentation helpers over a validated [`AnalysisResult`].
//!
//! Everything here is total: missing or odd data produces an empty-state text
//! or a neutral badge, never an error.

use crate::locale::Locale;
use crate::types::{AnalysisResult, AnalysisVariable, ArticleSection, StabilityStatus};
use serde::Serialize;

pub const CHART_MIN: f64 = 0.0;
pub const CHART_MAX: f64 = 100.0;

/// Visual weight of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Caution,
    Severe,
    Fatal,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: &'static str,
    pub tone: Tone,
}

impl StatusBadge {
    pub fn for_status(status: &StabilityStatus, locale: Locale) -> Self {
        let (ar, en, tone) = match status {
            StabilityStatus::Safe => (
                "نطاق الأمان السنني (Safe)",
                "Safe zone (Safe)",
                Tone::Positive,
            ),
            StabilityStatus::Warning => (
                "اضطراب متوسط (Warning)",
                "Moderate disturbance (Warning)",
                Tone::Caution,
            ),
            StabilityStatus::Critical => (
                "اضطراب حرج (Critical)",
                "Critical disturbance (Critical)",
                Tone::Severe,
            ),
            StabilityStatus::Collapse => (
                "جوار الهلاك (Collapse)",
                "Verge of collapse (Collapse)",
                Tone::Fatal,
            ),
            StabilityStatus::Undetermined(_) => ("غير محدد", "Undetermined", Tone::Neutral),
        };
        let label = match locale {
            Locale::Arabic => ar,
            Locale::English => en,
        };
        Self { label, tone }
    }
}

/// One spoke of the radial variable chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub symbol: String,
    pub name: String,
    pub value: f64,
}

/// Map variables onto the chart's fixed 0-100 radius domain.
pub fn chart_points(variables: &[AnalysisVariable]) -> Vec<ChartPoint> {
    variables
        .iter()
        .map(|v| ChartPoint {
            symbol: v.symbol.clone(),
            name: v.name.clone(),
            value: if v.value.is_nan() {
                CHART_MIN
            } else {
                v.value.clamp(CHART_MIN, CHART_MAX)
            },
        })
        .collect()
}

pub fn no_chart_data(locale: Locale) -> &'static str {
    match locale {
        Locale::Arabic => "لا توجد بيانات متاحة للتمثيل البياني",
        Locale::English => "No data available for the chart",
    }
}

pub fn no_equations(locale: Locale) -> &'static str {
    match locale {
        Locale::Arabic => "لم يتم توليد معادلات جبرية لهذا التحليل",
        Locale::English => "No algebraic equations were generated for this analysis",
    }
}

pub fn section_heading(section: ArticleSection, locale: Locale) -> &'static str {
    match (section, locale) {
        (ArticleSection::Intro, Locale::Arabic) => "مقدمة",
        (ArticleSection::Forecasting, Locale::Arabic) => "1. التحليل الاستشرافي (فقه المآلات)",
        (ArticleSection::Modeling, Locale::Arabic) => "2. النمذجة السننية (فقه الأسباب والعلل)",
        (ArticleSection::Remedies, Locale::Arabic) => "3. المسارات التصحيحية (فقه الاستدراك)",
        (ArticleSection::Intro, Locale::English) => "Introduction",
        (ArticleSection::Forecasting, Locale::English) => "1. Forecasting (consequences)",
        (ArticleSection::Modeling, Locale::English) => "2. Modeling (causes and effects)",
        (ArticleSection::Remedies, Locale::English) => "3. Corrective paths (remedies)",
    }
}

struct CopyLabels {
    report: &'static str,
    status: &'static str,
    core_verse: &'static str,
    summary: &'static str,
    article: &'static str,
    recommendations: &'static str,
    disclaimer: &'static str,
    attribution: &'static str,
}

const AR_LABELS: CopyLabels = CopyLabels {
    report: "تقرير QSP",
    status: "الحالة",
    core_verse: "الآية المحورية",
    summary: "[الملخص التحليلي]",
    article: "[المقال العلمي الشرعي كاملاً]",
    recommendations: "التوصيات والمسارات",
    disclaimer: "إخلاء مسؤولية",
    attribution: "تم الاستخراج والتحليل بواسطة مشروع الاستشراف القرآني المرمّز (QSP)",
};

const EN_LABELS: CopyLabels = CopyLabels {
    report: "QSP Report",
    status: "Status",
    core_verse: "Core verse",
    summary: "[Analytical summary]",
    article: "[Full article]",
    recommendations: "Recommendations",
    disclaimer: "Disclaimer",
    attribution: "Extracted and analyzed by the Quranic Symbolic Prognostics project (QSP)",
};

/// Serialize a result into the fixed plain-text report used by "copy report".
pub fn render_plain_text(result: &AnalysisResult, locale: Locale) -> String {
    let labels = match locale {
        Locale::Arabic => &AR_LABELS,
        Locale::English => &EN_LABELS,
    };

    let mut out = String::new();
    out.push_str(&format!("=== {}: {} ===\n", labels.report, result.title));
    out.push_str(&format!("{}: {}\n", labels.status, result.status));
    out.push_str(&format!("{}: {}\n\n", labels.core_verse, result.core_verse));
    out.push_str(&format!("{}\n{}\n\n", labels.summary, result.analysis_text));
    out.push_str(labels.article);
    out.push('\n');
    for (section, text) in result.article.sections() {
        out.push_str(&format!(
            "-- {}:\n{}\n\n",
            section_heading(section, locale),
            text
        ));
    }
    out.push_str(&format!(
        "-- {}:\n{}\n\n",
        labels.recommendations,
        result.recommendations.join("\n")
    ));
    out.push_str(&format!(
        "-- {}:\n{}\n\n",
        labels.disclaimer, result.disclaimer
    ));
    out.push_str(labels.attribution);

    out.trim().to_string()
}
