//! Validation verdicts returned by every rule.

use serde::{Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Underlying error attached to an invalid result for diagnostics.
pub type Cause = Arc<dyn Error + Send + Sync + 'static>;

/// Outcome of a single rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Validity {
    Valid,
    Invalid,
}

/// Category of an invalid result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A required key is absent.
    Missing,
    /// A value is disallowed or has the wrong type.
    InvalidValue,
    /// Zero or several mutually exclusive keys are present.
    MutualExclusion,
    /// A required nested sub-field is missing.
    Structural,
    /// An embedded schema literal could not be parsed.
    LiteralParse,
    /// An embedded schema literal could not be converted to a typed record.
    LiteralConversion,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Missing => "missing",
            Self::InvalidValue => "invalid value",
            Self::MutualExclusion => "mutual exclusion",
            Self::Structural => "structure",
            Self::LiteralParse => "literal parse",
            Self::LiteralConversion => "literal conversion",
        };
        f.write_str(label)
    }
}

/// Verdict plus a human-readable message, present for valid and invalid outcomes alike.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    validity: Validity,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<IssueKind>,
    message: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_cause"
    )]
    cause: Option<Cause>,
}

impl ValidationResult {
    /// A passing result.
    pub fn valid(message: impl Into<String>) -> Self {
        Self {
            validity: Validity::Valid,
            kind: None,
            message: message.into(),
            cause: None,
        }
    }

    /// A failing result of the given kind.
    pub fn invalid(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            validity: Validity::Invalid,
            kind: Some(kind),
            message: message.into(),
            cause: None,
        }
    }

    /// Attach the originating error.
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.cause = Some(Arc::new(cause));
        self
    }

    pub fn validity(&self) -> Validity {
        self.validity
    }

    pub fn is_valid(&self) -> bool {
        self.validity == Validity::Valid
    }

    pub fn kind(&self) -> Option<IssueKind> {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

// Causes compare by rendered message so repeated runs produce equal results.
impl PartialEq for ValidationResult {
    fn eq(&self, other: &Self) -> bool {
        self.validity == other.validity
            && self.kind == other.kind
            && self.message == other.message
            && self.cause.as_ref().map(ToString::to_string)
                == other.cause.as_ref().map(ToString::to_string)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.validity {
            Validity::Valid => write!(f, "VALID: {}", self.message)?,
            Validity::Invalid => write!(f, "INVALID: {}", self.message)?,
        }
        if let Some(cause) = &self.cause {
            write!(f, " (cause: {cause})")?;
        }
        Ok(())
    }
}

fn serialize_cause<S>(cause: &Option<Cause>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match cause {
        Some(cause) => serializer.serialize_some(&cause.to_string()),
        None => serializer.serialize_none(),
    }
}
