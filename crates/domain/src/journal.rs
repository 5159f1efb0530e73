use folio_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Maximum length of a journal URL path.
pub const JOURNAL_PATH_MAX_LENGTH: usize = 32;

/// URL path segment identifying a journal, for example `jtik`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JournalPath(String);

impl JournalPath {
    /// Creates a validated journal path.
    ///
    /// Paths are lowercased and may only contain `a-z`, `0-9`, `-` and `_`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into().trim().to_lowercase();

        if value.is_empty() {
            return Err(AppError::Validation(
                "journal path must not be empty".to_owned(),
            ));
        }

        if value.chars().count() > JOURNAL_PATH_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "journal path must not exceed {JOURNAL_PATH_MAX_LENGTH} characters"
            )));
        }

        if let Some(invalid) = value
            .chars()
            .find(|character| !matches!(character, 'a'..='z' | '0'..='9' | '-' | '_'))
        {
            return Err(AppError::Validation(format!(
                "journal path contains invalid character '{invalid}'"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the validated path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<JournalPath> for String {
    fn from(value: JournalPath) -> Self {
        value.0
    }
}

/// Settings seeded for every new journal with their default values.
pub const DEFAULT_JOURNAL_SETTINGS: &[(&str, &str)] = &[("contactEmail", ""), ("itemsPerPage", "25")];
