use colored::{ColoredString, Colorize};
use qsp_core::report::{no_chart_data, no_equations, section_heading, CHART_MAX};
use qsp_core::{chart_points, AnalysisResult, Locale, StatusBadge, Tone, ViewState};

const BAR_WIDTH: usize = 30;

struct Headings {
    verse: &'static str,
    summary: &'static str,
    variables: &'static str,
    equations: &'static str,
    recommendations: &'static str,
}

fn headings(locale: Locale) -> Headings {
    match locale {
        Locale::Arabic => Headings {
            verse: "الآية المحورية",
            summary: "الملخص التحليلي",
            variables: "المتغيرات السننية",
            equations: "المعادلات الجبرية",
            recommendations: "التوصيات والمسارات",
        },
        Locale::English => Headings {
            verse: "Core verse",
            summary: "Analytical summary",
            variables: "Variables",
            equations: "Equations",
            recommendations: "Recommendations",
        },
    }
}

fn paint_badge(badge: &StatusBadge) -> ColoredString {
    let label = format!(" {} ", badge.label);
    match badge.tone {
        Tone::Positive => label.black().on_green(),
        Tone::Caution => label.black().on_yellow(),
        Tone::Severe => label.white().on_red(),
        Tone::Fatal => label.white().on_black().bold(),
        Tone::Neutral => label.dimmed(),
    }
}

fn bar(value: f64) -> String {
    let filled = ((value / CHART_MAX) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Full colored report on stdout.
pub fn print_pretty(result: &AnalysisResult, locale: Locale) {
    let h = headings(locale);
    let badge = StatusBadge::for_status(&result.status, locale);

    println!("{}", result.title.bold().underline());
    println!("{}", paint_badge(&badge));
    println!();
    println!("{} {}", format!("{}:", h.verse).cyan().bold(), result.core_verse.italic());
    println!();
    println!("{}", h.summary.cyan().bold());
    println!("{}", result.analysis_text);

    println!();
    println!("{}", h.variables.cyan().bold());
    let points = chart_points(&result.variables);
    if points.is_empty() {
        println!("  {}", no_chart_data(locale).dimmed());
    }
    for point in points {
        println!(
            "  {:>4} {} {:>5.1}  {}",
            point.symbol.yellow(),
            bar(point.value).blue(),
            point.value,
            point.name
        );
    }

    println!();
    println!("{}", h.equations.cyan().bold());
    if result.algebra.is_empty() {
        println!("  {}", no_equations(locale).dimmed());
    }
    for equation in &result.algebra {
        println!("  {}", equation.green());
    }

    for (section, _) in result.article.sections() {
        println!();
        println!("{}", section_heading(section, locale).magenta().bold());
        for paragraph in result.article.paragraphs(section) {
            println!("  {}", paragraph);
        }
    }

    println!();
    println!("{}", h.recommendations.cyan().bold());
    for (i, rec) in result.recommendations.iter().enumerate() {
        println!("  {}. {}", (i + 1).to_string().yellow(), rec);
    }

    println!();
    println!("{}", result.disclaimer.dimmed().italic());
}

/// Localized failure block on stderr.
pub fn print_error(message: &str, locale: Locale) {
    eprintln!("{}", locale.error_title().red().bold());
    eprintln!("{}", message.red());
}

/// One-line description of the current phase for `:status`.
pub fn describe(state: &ViewState) -> String {
    match state {
        ViewState::Idle => "IDLE".to_string(),
        ViewState::Loading { token } => format!("LOADING {}", token),
        ViewState::Success(result) => format!("SUCCESS: {} ({})", result.title, result.status),
        ViewState::Error { class, .. } => format!("ERROR ({:?})", class),
    }
}
