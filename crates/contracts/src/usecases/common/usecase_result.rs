use serde::{Deserialize, Serialize};

/// Ошибка выполнения UseCase в виде, пригодном для ответа API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UseCaseError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl UseCaseError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn pipeline(message: impl Into<String>) -> Self {
        Self::new("PIPELINE_ERROR", message)
    }

    pub fn is_validation(&self) -> bool {
        self.code == "VALIDATION_ERROR"
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, ": {}", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for UseCaseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_details() {
        let err = UseCaseError::pipeline("prediction failed").with_details("model file missing");
        assert_eq!(
            err.to_string(),
            "[PIPELINE_ERROR] prediction failed: model file missing"
        );
        assert!(!err.is_validation());
        assert!(UseCaseError::validation("bad columns").is_validation());
    }
}
