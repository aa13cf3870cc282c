use std::fmt;

use time::Date;

/// Boilerplate the Orange Book appends to the strength of some discontinued products.
const FEDERAL_REGISTER_NOTE: &str = "**Federal Register determination that product was not discontinued or withdrawn for safety or efficacy reasons**";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationType {
    /// `N`: new drug application.
    New,
    /// `A`: abbreviated (generic) application.
    Abbreviated,
}

impl ApplicationType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "N" | "n" => Some(Self::New),
            "A" | "a" => Some(Self::Abbreviated),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::New => "N",
            Self::Abbreviated => "A",
        }
    }
}

impl fmt::Display for ApplicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An abbreviated-application product folded into its brand record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericForm {
    pub applicant: String,
    pub applicant_full_name: String,
    pub approval_date: Date,
    pub market_status: String,
}

impl fmt::Display for GenericForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.applicant_full_name, self.approval_date, self.market_status
        )
    }
}

/// One product row from the Orange Book product file, plus annotations
/// attached as it moves through the pipeline.
#[derive(Debug, Clone)]
pub struct DrugRecord {
    pub ingredients: Vec<String>,
    pub dosage_form_route: String,
    pub trade_name: String,
    pub applicant: String,
    pub applicant_full_name: String,
    pub strength: String,
    pub application_type: ApplicationType,
    pub application_number: String,
    pub product_number: String,
    pub approval_date: Date,
    pub market_status: String,

    pub under_patent: Option<bool>,
    pub latest_patent_date: Option<Date>,
    pub has_exclusivity: Option<bool>,
    pub latest_exclusivity_date: Option<Date>,
    pub generic_forms: Vec<GenericForm>,
    pub is_essential: bool,
}

impl DrugRecord {
    /// `(application number, product number)`, unique within a product file.
    pub fn key(&self) -> (&str, &str) {
        (&self.application_number, &self.product_number)
    }

    /// Brand records with no patent or exclusivity on file.
    pub fn is_unprotected(&self) -> bool {
        self.under_patent.is_none() && self.has_exclusivity.is_none()
    }

    /// Same ingredients, dosage form/route, and strength.
    pub fn is_same_product_as(&self, other: &DrugRecord) -> bool {
        self.ingredients == other.ingredients
            && self.dosage_form_route == other.dosage_form_route
            && self.strength == other.strength
    }
}

impl fmt::Display for DrugRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.trade_name)
    }
}

/// Splits a `;`-separated ingredient column into lower-cased, trimmed names.
pub fn normalize_ingredients(value: &str) -> Vec<String> {
    value
        .to_lowercase()
        .split(';')
        .map(|part| part.trim().to_string())
        .collect()
}

pub fn clean_strength(value: &str) -> String {
    value.replace(FEDERAL_REGISTER_NOTE, "")
}

/// Which side file an annotation pass reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionKind {
    Patent,
    Exclusivity,
}

impl ProtectionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Patent => "patent",
            Self::Exclusivity => "exclusivity",
        }
    }

    /// Sets the flag and folds `date` into the running maximum.
    pub(crate) fn record(self, drug: &mut DrugRecord, date: Date) {
        let (flag, latest) = match self {
            Self::Patent => (&mut drug.under_patent, &mut drug.latest_patent_date),
            Self::Exclusivity => (&mut drug.has_exclusivity, &mut drug.latest_exclusivity_date),
        };
        *flag = Some(true);
        *latest = Some(match *latest {
            Some(existing) if existing >= date => existing,
            _ => date,
        });
    }
}
