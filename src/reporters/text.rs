//! Text (terminal) reporter with colors and formatting

use crate::dataset::ResolveSummary;
use crate::stats::DatasetStats;
use crate::validate::{Level, ValidationReport};
use console::style;

/// Violations listed before the output is truncated
const MAX_LISTED: usize = 50;

/// Duplicate-code groups listed before the output is truncated
const MAX_DUPLICATE_GROUPS: usize = 10;

fn level_tag(level: Level) -> String {
    match level {
        Level::Error => style("[E]").red().bold().to_string(),
        Level::Warning => style("[W]").yellow().to_string(),
    }
}

fn rule() -> String {
    format!("{}\n", style("──────────────────────────────────────").dim())
}

/// Render a validation report as formatted terminal output
pub fn render_validation(report: &ValidationReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", style("Validation").bold()));
    out.push_str(&rule());
    out.push_str(&format!(
        "Kind: {}  Records: {}  Smell policy: {}\n",
        report.kind, report.total_records, report.smell_policy
    ));
    out.push_str(&format!(
        "Errors: {}  Warnings: {}  Affected records: {}\n\n",
        style(report.error_count()).red(),
        style(report.warning_count()).yellow(),
        report.records_with_violations()
    ));

    if report.violations.is_empty() {
        out.push_str(&format!("{} All records valid\n", style("✓").green()));
        return out;
    }

    out.push_str(&format!(
        "{}\n",
        style("       #  SAMPLE  RULE                    MESSAGE").dim()
    ));
    for v in report.violations.iter().take(MAX_LISTED) {
        out.push_str(&format!(
            "  {} {:>4}  {:>6}  {:<22}  {}\n",
            level_tag(v.level),
            v.index,
            v.sample_id,
            v.rule.name(),
            v.message
        ));
    }
    if report.violations.len() > MAX_LISTED {
        out.push_str(&format!(
            "  {}\n",
            style(format!(
                "... and {} more (use --format json for the full list)",
                report.violations.len() - MAX_LISTED
            ))
            .dim()
        ));
    }

    out
}

/// Render dataset statistics as formatted terminal output
pub fn render_stats(stats: &DatasetStats) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", style("Dataset Statistics").bold()));
    out.push_str(&rule());
    out.push_str(&format!(
        "Kind: {}  Records: {}  With code text: {}\n\n",
        stats.kind, stats.total, stats.with_code_text
    ));

    out.push_str(&format!("{}\n", style("SMELLS").bold()));
    out.push_str(&format!(
        "  HasSmell: {} ({:.1}%)\n",
        stats.smells.has_smell,
        stats.smell_rate() * 100.0
    ));
    out.push_str(&format!("  ComplexMethod: {}\n", stats.smells.complex_method));
    out.push_str(&format!(
        "  LongParameterList: {}\n",
        stats.smells.long_parameter_list
    ));
    out.push_str(&format!(
        "  MultifacetedAbstraction: {}\n",
        stats.smells.multifaceted_abstraction
    ));
    if stats.smells.inconsistent > 0 {
        out.push_str(&format!(
            "  {} {} record(s) where HasSmell disagrees with the specific flags\n",
            style("!").yellow(),
            stats.smells.inconsistent
        ));
    }

    if !stats.languages.is_empty() {
        out.push_str(&format!("\n{}\n", style("LANGUAGES").bold()));
        for (language, count) in &stats.languages {
            let name = if language.is_empty() {
                "(empty)"
            } else {
                language.as_str()
            };
            out.push_str(&format!("  {}: {}\n", name, count));
        }
    }

    if !stats.metrics.is_empty() {
        out.push_str(&format!("\n{}\n", style("METRICS").bold()));
        out.push_str(&format!(
            "{}\n",
            style(format!(
                "  {:<26} {:>10} {:>10} {:>10}",
                "NAME", "MIN", "MAX", "MEAN"
            ))
            .dim()
        ));
        for (name, summary) in &stats.metrics {
            out.push_str(&format!(
                "  {:<26} {:>10} {:>10} {:>10.2}\n",
                name,
                format_number(summary.min),
                format_number(summary.max),
                summary.mean
            ));
        }
    }

    if !stats.duplicate_code.is_empty() {
        out.push_str(&format!("\n{}\n", style("DUPLICATE CODE").bold()));
        for group in stats.duplicate_code.iter().take(MAX_DUPLICATE_GROUPS) {
            let ids: Vec<String> = group.iter().map(u32::to_string).collect();
            out.push_str(&format!(
                "  {} SampleIds {} share identical code text\n",
                style("!").yellow(),
                ids.join(", ")
            ));
        }
        if stats.duplicate_code.len() > MAX_DUPLICATE_GROUPS {
            out.push_str(&format!(
                "  {}\n",
                style(format!(
                    "... and {} more group(s)",
                    stats.duplicate_code.len() - MAX_DUPLICATE_GROUPS
                ))
                .dim()
            ));
        }
    }

    out
}

/// Render the outcome of resolving code references
pub fn render_resolve(summary: &ResolveSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} Filled code text for {} record(s), {} already present\n",
        style("✓").green(),
        summary.filled,
        summary.already_present
    ));
    if !summary.missing.is_empty() {
        let ids: Vec<String> = summary.missing.iter().take(20).map(u32::to_string).collect();
        let more = if summary.missing.len() > 20 { ", ..." } else { "" };
        out.push_str(&format!(
            "{} {} reference id(s) not found: {}{}\n",
            style("!").yellow(),
            summary.missing.len(),
            ids.join(", "),
            more
        ));
    }
    out
}

/// Integers without a fractional part, everything else to 3 places
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.3}", value)
    }
}
