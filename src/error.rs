use std::fmt;
use std::path::PathBuf;

/// Which of the run's files an I/O failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Products,
    Patents,
    Exclusivity,
    EssentialList,
    BadWords,
    Config,
    Output,
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Products => "product file",
            Self::Patents => "patent file",
            Self::Exclusivity => "exclusivity file",
            Self::EssentialList => "essential list file",
            Self::BadWords => "bad words file",
            Self::Config => "config file",
            Self::Output => "output file",
        };
        f.write_str(label)
    }
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum OrangeBookError {
    #[error("Malformed record in {file} line {line}: expected at least {expected} fields, found {found}")]
    MalformedRecord {
        file: FileRole,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid {field} in {file} line {line}: '{value}'")]
    InvalidField {
        file: FileRole,
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Unparsable date in {file} line {line}: '{value}'")]
    DateParse {
        file: FileRole,
        line: usize,
        value: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read {role} {}: {source}", path.display())]
    FileRead {
        role: FileRole,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output file {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::{FileRole, OrangeBookError};

    #[test]
    fn malformed_record_display_names_file_and_line() {
        let err = OrangeBookError::MalformedRecord {
            file: FileRole::Products,
            line: 17,
            expected: 14,
            found: 9,
        };

        let msg = err.to_string();
        assert!(msg.contains("product file line 17"));
        assert!(msg.contains("expected at least 14 fields, found 9"));
    }

    #[test]
    fn file_read_display_identifies_which_input_failed() {
        let err = OrangeBookError::FileRead {
            role: FileRole::Exclusivity,
            path: "data/exclusivity.txt".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };

        let msg = err.to_string();
        assert!(msg.contains("exclusivity file"));
        assert!(msg.contains("data/exclusivity.txt"));
        assert!(msg.contains("No such file"));
    }

    #[test]
    fn date_parse_display_includes_value() {
        let err = OrangeBookError::DateParse {
            file: FileRole::Patents,
            line: 3,
            value: "Someday".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("patent file line 3"));
        assert!(msg.contains("'Someday'"));
    }
}
