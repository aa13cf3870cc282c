use std::collections::HashMap;

use serde::Serialize;
use time::Date;
use tracing::info;

use crate::entities::drug::{DrugRecord, ProtectionKind};
use crate::error::{FileRole, OrangeBookError};
use crate::sources::orange_book::SideRecord;
use crate::utils::date::parse_orange_book_date;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotateReport {
    pub matched_rows: usize,
    pub annotated_records: usize,
}

/// Folds patent or exclusivity rows into the records sharing their
/// `(application number, product number)` key.
///
/// Dates of matching rows must parse; a bad one fails the pass before any
/// record is touched.
pub fn annotate(
    drugs: &mut [DrugRecord],
    rows: &[SideRecord],
    kind: ProtectionKind,
    role: FileRole,
) -> Result<AnnotateReport, OrangeBookError> {
    let mut updates: Vec<(usize, Date)> = Vec::new();
    let mut report = AnnotateReport::default();
    {
        let mut by_key: HashMap<(&str, &str), Vec<usize>> = HashMap::new();
        for (idx, drug) in drugs.iter().enumerate() {
            by_key.entry(drug.key()).or_default().push(idx);
        }

        for row in rows {
            let key = (row.application_number.as_str(), row.product_number.as_str());
            let Some(targets) = by_key.get(&key) else {
                continue;
            };
            let date = parse_orange_book_date(&row.date_text).ok_or_else(|| {
                OrangeBookError::DateParse {
                    file: role,
                    line: row.line,
                    value: row.date_text.clone(),
                }
            })?;
            report.matched_rows += 1;
            updates.extend(targets.iter().map(|&idx| (idx, date)));
        }
    }

    for (idx, date) in updates {
        kind.record(&mut drugs[idx], date);
    }
    report.annotated_records = drugs
        .iter()
        .filter(|drug| match kind {
            ProtectionKind::Patent => drug.under_patent.is_some(),
            ProtectionKind::Exclusivity => drug.has_exclusivity.is_some(),
        })
        .count();

    info!(
        kind = kind.label(),
        matched_rows = report.matched_rows,
        annotated = report.annotated_records,
        "annotation pass done"
    );
    Ok(report)
}
