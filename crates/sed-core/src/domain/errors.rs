use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SedResult<T> = Result<T, SedError>;

/// Failure classes; each maps to a distinct process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SedErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl SedErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SedError {
    category: SedErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl SedError {
    pub fn new(
        category: SedErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(SedErrorCategory::InputValidationError, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(SedErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(SedErrorCategory::ComputationError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(SedErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> SedErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    /// `ERROR: [CODE] message`, the line the CLI prints on stderr.
    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: {self}")
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

impl Display for SedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.placeholder, self.message)
    }
}

impl Error for SedError {}

#[cfg(test)]
mod tests {
    use super::{SedError, SedErrorCategory};

    #[test]
    fn exit_codes_are_distinct_per_category() {
        let cases = [
            (SedErrorCategory::InputValidationError, 2),
            (SedErrorCategory::IoSystemError, 3),
            (SedErrorCategory::ComputationError, 4),
            (SedErrorCategory::InternalError, 5),
        ];
        for (category, exit_code) in cases {
            assert_eq!(category.exit_code(), exit_code);
        }
    }

    #[test]
    fn error_renders_diagnostic_lines() {
        let error =
            SedError::input_validation("INPUT.SED_NDIM", "grid must have at least one axis");

        assert_eq!(error.exit_code(), 2);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [INPUT.SED_NDIM] grid must have at least one axis"
        );
        assert_eq!(error.fatal_exit_line(), "FATAL EXIT CODE: 2");

        let error = SedError::computation("COMPUTE.SED_NON_FINITE", "bin 0 is NaN");
        assert_eq!(error.category(), SedErrorCategory::ComputationError);
        assert_eq!(error.exit_code(), 4);
    }
}
