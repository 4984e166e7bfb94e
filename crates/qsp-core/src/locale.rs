use crate::error::FailureClass;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language of user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "en")]
    English,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Arabic => "ar",
            Locale::English => "en",
        }
    }

    /// Message shown in the error region for a failed analysis.
    pub fn failure_message(&self, class: FailureClass) -> &'static str {
        match (self, class) {
            (Locale::Arabic, FailureClass::Network) => {
                "عذراً، تعذر الاتصال بخوادم QSP (خطأ في الشبكة). يرجى التأكد من اتصالك والمحاولة مرة أخرى."
            }
            (Locale::Arabic, FailureClass::Generic) => {
                "حدث خطأ أثناء معالجة القوانين السننية. يرجى المحاولة لاحقاً."
            }
            (Locale::English, FailureClass::Network) => {
                "Sorry, the QSP servers could not be reached (network error). Check your connection and try again."
            }
            (Locale::English, FailureClass::Generic) => {
                "An error occurred while processing the analysis. Please try again later."
            }
        }
    }

    pub fn error_title(&self) -> &'static str {
        match self {
            Locale::Arabic => "تعذر استكمال التحليل السنني",
            Locale::English => "The analysis could not be completed",
        }
    }

    pub fn loading_message(&self) -> &'static str {
        match self {
            Locale::Arabic => "جاري استنباط القوانين السننية ومعايرة الميزان...",
            Locale::English => "Deriving the governing laws and calibrating the balance...",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ar" | "arabic" => Ok(Locale::Arabic),
            "en" | "english" => Ok(Locale::English),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}
