//! Readers for the Orange Book data files (`products.txt`, `patent.txt`,
//! `exclusivity.txt`).
//!
//! Each file is a delimited table with a one-line header. Columns are read by
//! fixed position; the layout matches the FDA download current when this was
//! written and is not validated against the header.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::entities::drug::{
    ApplicationType, DrugRecord, clean_strength, normalize_ingredients,
};
use crate::error::{FileRole, OrangeBookError};
use crate::utils::date::{ApprovalDateSource, parse_approval_date};

pub const DEFAULT_DELIMITER: char = '~';

mod product_col {
    pub const INGREDIENT: usize = 0;
    pub const DF_ROUTE: usize = 1;
    pub const TRADE_NAME: usize = 2;
    pub const APPLICANT: usize = 3;
    pub const STRENGTH: usize = 4;
    pub const APPL_TYPE: usize = 5;
    pub const APPL_NO: usize = 6;
    pub const PRODUCT_NO: usize = 7;
    pub const APPROVAL_DATE: usize = 9;
    pub const MARKET_STATUS: usize = 12;
    pub const APPLICANT_FULL_NAME: usize = 13;
}

mod side_col {
    pub const APPL_NO: usize = 1;
    pub const PRODUCT_NO: usize = 2;
    pub const DATE: usize = 4;
}

pub const PRODUCT_FIELDS: usize = product_col::APPLICANT_FULL_NAME + 1;
pub const SIDE_FIELDS: usize = side_col::DATE + 1;

/// What to do with a line that is too short for the fixed column offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    #[default]
    Skip,
    FailFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFormat {
    pub delimiter: char,
    pub malformed: MalformedPolicy,
}

impl Default for TableFormat {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            malformed: MalformedPolicy::Skip,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows: usize,
    pub skipped_malformed: usize,
    pub approval_date_fallbacks: usize,
    pub duplicate_keys: usize,
}

/// A patent or exclusivity row: the product key and its date text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideRecord {
    pub line: usize,
    pub application_number: String,
    pub product_number: String,
    pub date_text: String,
}

/// Data lines with 1-based line numbers; the header and blank lines are dropped.
fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .skip(1)
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
}

/// Splits `line`, returning `None` when the line is short and the policy says skip.
fn split_fields<'a>(
    line: &'a str,
    line_no: usize,
    expected: usize,
    role: FileRole,
    format: TableFormat,
    report: &mut LoadReport,
) -> Result<Option<Vec<&'a str>>, OrangeBookError> {
    let fields: Vec<&str> = line.split(format.delimiter).map(str::trim).collect();
    if fields.len() >= expected {
        return Ok(Some(fields));
    }

    let err = OrangeBookError::MalformedRecord {
        file: role,
        line: line_no,
        expected,
        found: fields.len(),
    };
    match format.malformed {
        MalformedPolicy::FailFast => Err(err),
        MalformedPolicy::Skip => {
            warn!(file = %role, line = line_no, "skipping record: {err}");
            report.skipped_malformed += 1;
            Ok(None)
        }
    }
}

pub fn parse_products(
    text: &str,
    format: TableFormat,
) -> Result<(Vec<DrugRecord>, LoadReport), OrangeBookError> {
    let role = FileRole::Products;
    let mut report = LoadReport::default();
    let mut drugs = Vec::new();
    let mut seen_keys: HashSet<(String, String)> = HashSet::new();

    for (line_no, line) in data_lines(text) {
        let Some(fields) = split_fields(line, line_no, PRODUCT_FIELDS, role, format, &mut report)?
        else {
            continue;
        };

        let raw_type = fields[product_col::APPL_TYPE];
        let Some(application_type) = ApplicationType::from_code(raw_type) else {
            let err = OrangeBookError::InvalidField {
                file: role,
                line: line_no,
                field: "Appl_Type",
                value: raw_type.to_string(),
            };
            if format.malformed == MalformedPolicy::FailFast {
                return Err(err);
            }
            warn!(file = %role, line = line_no, "skipping record: {err}");
            report.skipped_malformed += 1;
            continue;
        };

        let raw_date = fields[product_col::APPROVAL_DATE];
        let (approval_date, date_source) = parse_approval_date(raw_date);
        if date_source == ApprovalDateSource::Fallback {
            warn!(
                file = %role,
                line = line_no,
                value = raw_date,
                "unparsable approval date, using {approval_date}"
            );
            report.approval_date_fallbacks += 1;
        }

        let drug = DrugRecord {
            ingredients: normalize_ingredients(fields[product_col::INGREDIENT]),
            dosage_form_route: fields[product_col::DF_ROUTE].to_string(),
            trade_name: fields[product_col::TRADE_NAME].to_string(),
            applicant: fields[product_col::APPLICANT].to_string(),
            applicant_full_name: fields[product_col::APPLICANT_FULL_NAME].to_string(),
            strength: clean_strength(fields[product_col::STRENGTH]),
            application_type,
            application_number: fields[product_col::APPL_NO].to_string(),
            product_number: fields[product_col::PRODUCT_NO].to_string(),
            approval_date,
            market_status: fields[product_col::MARKET_STATUS].to_string(),
            under_patent: None,
            latest_patent_date: None,
            has_exclusivity: None,
            latest_exclusivity_date: None,
            generic_forms: Vec::new(),
            is_essential: false,
        };

        let key = (drug.application_number.clone(), drug.product_number.clone());
        if !seen_keys.insert(key) {
            warn!(
                file = %role,
                line = line_no,
                application_number = %drug.application_number,
                product_number = %drug.product_number,
                "duplicate product key"
            );
            report.duplicate_keys += 1;
        }

        drugs.push(drug);
    }

    report.rows = drugs.len();
    debug!(file = %role, rows = report.rows, "parsed product table");
    Ok((drugs, report))
}

pub fn parse_side_file(
    text: &str,
    role: FileRole,
    format: TableFormat,
) -> Result<(Vec<SideRecord>, LoadReport), OrangeBookError> {
    let mut report = LoadReport::default();
    let mut rows = Vec::new();

    for (line_no, line) in data_lines(text) {
        let Some(fields) = split_fields(line, line_no, SIDE_FIELDS, role, format, &mut report)?
        else {
            continue;
        };
        rows.push(SideRecord {
            line: line_no,
            application_number: fields[side_col::APPL_NO].to_string(),
            product_number: fields[side_col::PRODUCT_NO].to_string(),
            date_text: fields[side_col::DATE].to_string(),
        });
    }

    report.rows = rows.len();
    debug!(file = %role, rows = report.rows, "parsed side table");
    Ok((rows, report))
}

pub async fn load_products(
    path: &Path,
    format: TableFormat,
) -> Result<(Vec<DrugRecord>, LoadReport), OrangeBookError> {
    let text = crate::utils::fs::read_to_string(path, FileRole::Products).await?;
    parse_products(&text, format)
}

pub async fn load_side_file(
    path: &Path,
    role: FileRole,
    format: TableFormat,
) -> Result<(Vec<SideRecord>, LoadReport), OrangeBookError> {
    let text = crate::utils::fs::read_to_string(path, role).await?;
    parse_side_file(&text, role, format)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::utils::date::APPROVAL_DATE_FLOOR;
    use time::macros::date;

    pub(crate) const PRODUCT_HEADER: &str = "Ingredient~DF;Route~Trade_Name~Applicant~Strength~Appl_Type~Appl_No~Product_No~TE_Code~Approval_Date~RLD~RS~Type~Applicant_Full_Name";
    pub(crate) const PATENT_HEADER: &str = "Appl_Type~Appl_No~Product_No~Patent_No~Patent_Expire_Date_Text~Drug_Substance_Flag~Drug_Product_Flag~Patent_Use_Code~Delist_Flag~Submission_Date";
    pub(crate) const EXCLUSIVITY_HEADER: &str =
        "Appl_Type~Appl_No~Product_No~Exclusivity_Code~Exclusivity_Date";

    #[test]
    fn parses_product_rows_by_fixed_offset() {
        let text = format!(
            "{PRODUCT_HEADER}\n\
             ATAZANAVIR SULFATE~CAPSULE;ORAL~REYATAZ~BMS~EQ 300MG BASE~N~021567~003~AB~Jun 20, 2003~RLD~RS~RX~BRISTOL MYERS SQUIBB CO\r\n\
             ACYCLOVIR~TABLET;ORAL~ACYCLOVIR~APOTEX~400MG~A~074556~001~AB~Approved Prior to Jan 1, 1982~~~RX~APOTEX INC\n"
        );

        let (drugs, report) = parse_products(&text, TableFormat::default()).expect("parse");

        assert_eq!(report.rows, 2);
        assert_eq!(report.skipped_malformed, 0);
        assert_eq!(report.approval_date_fallbacks, 0);

        let first = &drugs[0];
        assert_eq!(first.ingredients, vec!["atazanavir sulfate"]);
        assert_eq!(first.dosage_form_route, "CAPSULE;ORAL");
        assert_eq!(first.trade_name, "REYATAZ");
        assert_eq!(first.strength, "EQ 300MG BASE");
        assert_eq!(first.application_type, ApplicationType::New);
        assert_eq!(first.key(), ("021567", "003"));
        assert_eq!(first.approval_date, date!(2003 - 06 - 20));
        assert_eq!(first.market_status, "RX");
        assert_eq!(first.applicant_full_name, "BRISTOL MYERS SQUIBB CO");
        assert!(first.under_patent.is_none());
        assert!(!first.is_essential);

        assert_eq!(drugs[1].application_type, ApplicationType::Abbreviated);
        assert_eq!(drugs[1].approval_date, APPROVAL_DATE_FLOOR);
    }

    #[test]
    fn counts_approval_date_fallbacks() {
        let text = format!(
            "{PRODUCT_HEADER}\n\
             ACYCLOVIR~TABLET;ORAL~ZOVIRAX~GSK~400MG~N~020089~001~~pending~~~DISCN~GLAXOSMITHKLINE\n"
        );

        let (drugs, report) = parse_products(&text, TableFormat::default()).expect("parse");
        assert_eq!(report.approval_date_fallbacks, 1);
        assert_eq!(drugs[0].approval_date, APPROVAL_DATE_FLOOR);
    }

    #[test]
    fn skips_short_lines_by_default() {
        let text = format!(
            "{PRODUCT_HEADER}\n\
             ACYCLOVIR~TABLET;ORAL~ZOVIRAX\n\
             \n\
             ACYCLOVIR~TABLET;ORAL~ZOVIRAX~GSK~400MG~N~020089~001~~Mar 29, 1985~~~DISCN~GLAXOSMITHKLINE\n"
        );

        let (drugs, report) = parse_products(&text, TableFormat::default()).expect("parse");
        assert_eq!(drugs.len(), 1);
        assert_eq!(report.skipped_malformed, 1);
    }

    #[test]
    fn fail_fast_rejects_short_lines() {
        let text = format!("{PRODUCT_HEADER}\nACYCLOVIR~TABLET;ORAL~ZOVIRAX\n");
        let format = TableFormat {
            malformed: MalformedPolicy::FailFast,
            ..TableFormat::default()
        };

        let err = parse_products(&text, format).expect_err("short line should fail");
        assert!(matches!(
            err,
            OrangeBookError::MalformedRecord {
                file: FileRole::Products,
                line: 2,
                expected: PRODUCT_FIELDS,
                found: 3,
            }
        ));
    }

    #[test]
    fn skips_unknown_application_type() {
        let text = format!(
            "{PRODUCT_HEADER}\n\
             ACYCLOVIR~TABLET;ORAL~ZOVIRAX~GSK~400MG~B~020089~001~~Mar 29, 1985~~~DISCN~GLAXOSMITHKLINE\n"
        );

        let (drugs, report) = parse_products(&text, TableFormat::default()).expect("parse");
        assert!(drugs.is_empty());
        assert_eq!(report.skipped_malformed, 1);
    }

    #[test]
    fn counts_duplicate_keys() {
        let row = "ACYCLOVIR~TABLET;ORAL~ZOVIRAX~GSK~400MG~N~020089~001~~Mar 29, 1985~~~DISCN~GLAXOSMITHKLINE";
        let text = format!("{PRODUCT_HEADER}\n{row}\n{row}\n");

        let (drugs, report) = parse_products(&text, TableFormat::default()).expect("parse");
        assert_eq!(drugs.len(), 2);
        assert_eq!(report.duplicate_keys, 1);
    }

    #[test]
    fn honours_pipe_delimiter() {
        let text = "header\nN|021567|003|7838532|Jun 21, 2027|Y|Y|U-1||\n";
        let format = TableFormat {
            delimiter: '|',
            ..TableFormat::default()
        };

        let (rows, report) = parse_side_file(text, FileRole::Patents, format).expect("parse");
        assert_eq!(report.rows, 1);
        assert_eq!(rows[0].application_number, "021567");
        assert_eq!(rows[0].product_number, "003");
        assert_eq!(rows[0].date_text, "Jun 21, 2027");
        assert_eq!(rows[0].line, 2);
    }

    #[test]
    fn side_file_header_only_is_empty() {
        let (rows, report) =
            parse_side_file(EXCLUSIVITY_HEADER, FileRole::Exclusivity, TableFormat::default())
                .expect("parse");
        assert!(rows.is_empty());
        assert_eq!(report, LoadReport::default());
    }

    #[tokio::test]
    async fn load_products_reads_from_disk() {
        let path = crate::utils::fs::tests::temp_path("orangebook-products", ".txt");
        let text = format!(
            "{PRODUCT_HEADER}\n\
             ABACAVIR SULFATE~TABLET;ORAL~ZIAGEN~VIIV HLTHCARE~EQ 300MG BASE~N~020977~001~AB~Dec 17, 1998~RLD~RS~RX~VIIV HEALTHCARE CO\n"
        );
        std::fs::write(&path, text).expect("write products");

        let loaded = load_products(&path, TableFormat::default()).await;
        std::fs::remove_file(&path).expect("cleanup");

        let (drugs, _) = loaded.expect("load");
        assert_eq!(drugs.len(), 1);
        assert_eq!(drugs[0].trade_name, "ZIAGEN");
    }
}
