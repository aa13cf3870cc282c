//! The batch run: load, match, annotate, condense, write.

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::entities::drug::ProtectionKind;
use crate::entities::essential::{EssentialTarget, normalize_essential_list};
use crate::error::{FileRole, OrangeBookError};
use crate::render::report::{report_rows, to_csv};
use crate::sources::orange_book::{load_products, load_side_file};
use crate::transform::annotate::annotate;
use crate::transform::condense::condense_generics;
use crate::transform::matcher::{MatchOutcome, keep_essential};

pub use crate::render::report::ReportRow;
pub use crate::sources::orange_book::{LoadReport, MalformedPolicy, TableFormat};
pub use crate::transform::annotate::AnnotateReport;

/// What counts as essential, and where the product table lives.
#[derive(Debug, Clone, Default)]
pub struct EssentialSelection {
    pub products: PathBuf,
    pub format: TableFormat,
    /// Combination strings such as `abacavir+lamivudine`.
    pub essential: Vec<String>,
    pub bad_words: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub selection: EssentialSelection,
    pub patents: PathBuf,
    pub exclusivity: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub output: String,
    pub targets: usize,
    pub bad_words: usize,
    pub product_file: LoadReport,
    pub patent_file: LoadReport,
    pub exclusivity_file: LoadReport,
    pub matched: usize,
    pub excluded: usize,
    pub essential: usize,
    pub patent_annotations: AnnotateReport,
    pub exclusivity_annotations: AnnotateReport,
    pub generics_absorbed: usize,
    pub rows_written: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub targets: usize,
    pub bad_words: usize,
    pub product_file: LoadReport,
    pub matched: usize,
    pub excluded: usize,
    pub rows: Vec<ReportRow>,
}

fn prepare_lists(
    selection: &EssentialSelection,
) -> Result<(Vec<EssentialTarget>, Vec<String>), OrangeBookError> {
    let targets = normalize_essential_list(&selection.essential)?;
    if targets.is_empty() {
        return Err(OrangeBookError::InvalidArgument(
            "At least one essential drug is required (--essential or --essential-file)".into(),
        ));
    }
    Ok((targets, normalize_bad_words(&selection.bad_words)))
}

pub(crate) fn normalize_bad_words<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .map(|word| word.as_ref().trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

/// Loads the product table and keeps only the essential records.
pub async fn run_match(selection: &EssentialSelection) -> Result<MatchSummary, OrangeBookError> {
    let (targets, bad_words) = prepare_lists(selection)?;
    let (drugs, product_file) = load_products(&selection.products, selection.format).await?;
    let outcome = keep_essential(drugs, &targets, &bad_words);

    Ok(MatchSummary {
        targets: targets.len(),
        bad_words: bad_words.len(),
        product_file,
        matched: outcome.matched,
        excluded: outcome.excluded,
        rows: report_rows(&outcome.essential),
    })
}

/// Runs the full pipeline and writes the report to `config.output`.
pub async fn run_pipeline(config: &PipelineConfig) -> Result<RunSummary, OrangeBookError> {
    let selection = &config.selection;
    let (targets, bad_words) = prepare_lists(selection)?;
    let format = selection.format;

    let ((drugs, product_file), (patent_rows, patent_file), (exclusivity_rows, exclusivity_file)) =
        tokio::try_join!(
            load_products(&selection.products, format),
            load_side_file(&config.patents, FileRole::Patents, format),
            load_side_file(&config.exclusivity, FileRole::Exclusivity, format),
        )?;
    info!(
        products = product_file.rows,
        patents = patent_file.rows,
        exclusivity = exclusivity_file.rows,
        "input files loaded"
    );

    let MatchOutcome {
        essential: mut drugs,
        matched,
        excluded,
    } = keep_essential(drugs, &targets, &bad_words);
    let essential = drugs.len();

    let patent_annotations = annotate(
        &mut drugs,
        &patent_rows,
        ProtectionKind::Patent,
        FileRole::Patents,
    )?;
    let exclusivity_annotations = annotate(
        &mut drugs,
        &exclusivity_rows,
        ProtectionKind::Exclusivity,
        FileRole::Exclusivity,
    )?;

    let (drugs, generics_absorbed) = condense_generics(drugs);

    let rows = report_rows(&drugs);
    let bytes = to_csv(&rows)?;
    crate::utils::fs::write_atomic(&config.output, &bytes).await?;
    info!(rows = rows.len(), output = %config.output.display(), "report written");

    Ok(RunSummary {
        output: config.output.display().to_string(),
        targets: targets.len(),
        bad_words: bad_words.len(),
        product_file,
        patent_file,
        exclusivity_file,
        matched,
        excluded,
        essential,
        patent_annotations,
        exclusivity_annotations,
        generics_absorbed,
        rows_written: rows.len(),
    })
}
