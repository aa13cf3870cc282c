use crate::error::OrangeBookError;

/// Separates the components of a fixed-dose combination, e.g. `artemether+lumefantrine`.
pub const COMBINATOR: char = '+';

/// One essential medicine: the lower-cased ingredient names it is made of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EssentialTarget {
    pub name: String,
    pub components: Vec<String>,
}

impl EssentialTarget {
    pub fn parse(raw: &str) -> Result<Self, OrangeBookError> {
        let name = raw.trim().to_lowercase();
        let mut components: Vec<String> = Vec::new();
        for part in name.split(COMBINATOR) {
            let part = part.trim();
            if part.is_empty() {
                return Err(OrangeBookError::InvalidArgument(format!(
                    "Essential drug '{}' has an empty component",
                    raw.trim()
                )));
            }
            if !components.iter().any(|existing| existing == part) {
                components.push(part.to_string());
            }
        }
        Ok(Self { name, components })
    }
}

pub fn normalize_essential_list<S: AsRef<str>>(
    raw: &[S],
) -> Result<Vec<EssentialTarget>, OrangeBookError> {
    raw.iter()
        .map(|entry| EssentialTarget::parse(entry.as_ref()))
        .collect()
}
