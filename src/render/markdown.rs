use std::sync::OnceLock;

use minijinja::{Environment, context};

use crate::error::OrangeBookError;
use crate::pipeline::{MatchSummary, RunSummary};
use crate::sources::orange_book::LoadReport;

static ENV: OnceLock<Environment<'static>> = OnceLock::new();

fn env() -> Result<&'static Environment<'static>, OrangeBookError> {
    if let Some(env) = ENV.get() {
        return Ok(env);
    }

    let mut env = Environment::new();
    env.add_filter("truncate", |s: String, max_chars: usize| -> String {
        if s.chars().count() <= max_chars {
            return s;
        }
        let mut out: String = s.chars().take(max_chars).collect();
        out = out.trim_end().to_string();
        out.push('…');
        out
    });
    env.add_template(
        "run_summary.md.j2",
        include_str!("../../templates/run_summary.md.j2"),
    )?;
    env.add_template("match.md.j2", include_str!("../../templates/match.md.j2"))?;

    let _ = ENV.set(env);
    Ok(ENV
        .get()
        .expect("ENV should be initialized by the time this is reached"))
}

fn load_warnings(label: &str, report: &LoadReport, out: &mut Vec<String>) {
    if report.skipped_malformed > 0 {
        out.push(format!(
            "{label}: skipped {} malformed line(s)",
            report.skipped_malformed
        ));
    }
    if report.approval_date_fallbacks > 0 {
        out.push(format!(
            "{label}: {} approval date(s) unreadable, set to 1982-01-01",
            report.approval_date_fallbacks
        ));
    }
    if report.duplicate_keys > 0 {
        out.push(format!(
            "{label}: {} duplicate application/product key(s)",
            report.duplicate_keys
        ));
    }
}

pub fn run_summary_markdown(summary: &RunSummary) -> Result<String, OrangeBookError> {
    let mut warnings = Vec::new();
    load_warnings("product file", &summary.product_file, &mut warnings);
    load_warnings("patent file", &summary.patent_file, &mut warnings);
    load_warnings("exclusivity file", &summary.exclusivity_file, &mut warnings);

    let tmpl = env()?.get_template("run_summary.md.j2")?;
    Ok(tmpl.render(context! {
        output => &summary.output,
        rows_written => summary.rows_written,
        targets => summary.targets,
        bad_words => summary.bad_words,
        product_file => &summary.product_file,
        matched => summary.matched,
        excluded => summary.excluded,
        essential => summary.essential,
        patent_annotations => &summary.patent_annotations,
        exclusivity_annotations => &summary.exclusivity_annotations,
        generics_absorbed => summary.generics_absorbed,
        warnings => warnings,
    })?)
}

pub fn match_markdown(summary: &MatchSummary) -> Result<String, OrangeBookError> {
    let mut warnings = Vec::new();
    load_warnings("product file", &summary.product_file, &mut warnings);

    let tmpl = env()?.get_template("match.md.j2")?;
    Ok(tmpl.render(context! {
        count => summary.rows.len(),
        targets => summary.targets,
        excluded => summary.excluded,
        rows => &summary.rows,
        warnings => warnings,
    })?)
}
