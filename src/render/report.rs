//! The essential-drug report file (comma-separated).
//!
//! List-valued columns are joined with `"; "`. Generic forms are written as
//! `APPLICANT FULL NAME (YYYY-MM-DD, STATUS)`. Unset flags and dates are empty.

use serde::Serialize;

use crate::entities::drug::DrugRecord;
use crate::error::OrangeBookError;

pub const REPORT_HEADER: [&str; 13] = [
    "Ingredient",
    "DF_Route",
    "Trade_Name",
    "Strength",
    "Approval_Date",
    "Type",
    "Application_Type",
    "Applicant_Full_Name",
    "Under_Patent",
    "Latest_Patent_Date",
    "Exclusivity_Agreement",
    "Latest_Exclusivity_Date",
    "Generic_Forms",
];

const LIST_SEPARATOR: &str = "; ";

/// One output row; field order matches [`REPORT_HEADER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "Ingredient")]
    pub ingredient: String,
    #[serde(rename = "DF_Route")]
    pub df_route: String,
    #[serde(rename = "Trade_Name")]
    pub trade_name: String,
    #[serde(rename = "Strength")]
    pub strength: String,
    #[serde(rename = "Approval_Date")]
    pub approval_date: String,
    #[serde(rename = "Type")]
    pub market_status: String,
    #[serde(rename = "Application_Type")]
    pub application_type: String,
    #[serde(rename = "Applicant_Full_Name")]
    pub applicant_full_name: String,
    #[serde(rename = "Under_Patent")]
    pub under_patent: String,
    #[serde(rename = "Latest_Patent_Date")]
    pub latest_patent_date: String,
    #[serde(rename = "Exclusivity_Agreement")]
    pub exclusivity_agreement: String,
    #[serde(rename = "Latest_Exclusivity_Date")]
    pub latest_exclusivity_date: String,
    #[serde(rename = "Generic_Forms")]
    pub generic_forms: String,
}

fn flag(value: Option<bool>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn date_or_empty(value: Option<time::Date>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

impl From<&DrugRecord> for ReportRow {
    fn from(drug: &DrugRecord) -> Self {
        Self {
            ingredient: drug.ingredients.join(LIST_SEPARATOR),
            df_route: drug.dosage_form_route.clone(),
            trade_name: drug.trade_name.clone(),
            strength: drug.strength.clone(),
            approval_date: drug.approval_date.to_string(),
            market_status: drug.market_status.clone(),
            application_type: drug.application_type.to_string(),
            applicant_full_name: drug.applicant_full_name.clone(),
            under_patent: flag(drug.under_patent),
            latest_patent_date: date_or_empty(drug.latest_patent_date),
            exclusivity_agreement: flag(drug.has_exclusivity),
            latest_exclusivity_date: date_or_empty(drug.latest_exclusivity_date),
            generic_forms: drug
                .generic_forms
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
        }
    }
}

pub fn report_rows(drugs: &[DrugRecord]) -> Vec<ReportRow> {
    drugs.iter().map(ReportRow::from).collect()
}

/// Comma-separated report with a header line, even when there are no rows.
pub fn to_csv(rows: &[ReportRow]) -> Result<Vec<u8>, OrangeBookError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(REPORT_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|err| OrangeBookError::Io(err.into_error()))
}
