use smartdoc_core::AppError;
use std::path::Path;

/// Local file header signature every ZIP-based Office document starts with.
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// Validation errors for uploaded documents
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("File content does not match a .docx document")]
    InvalidSignature,

    #[error("Empty file")]
    EmptyFile,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { max, .. } => AppError::PayloadTooLarge(format!(
                "File size exceeds maximum allowed size of {} MB",
                max / 1024 / 1024
            )),
            ValidationError::InvalidExtension { allowed, .. } => AppError::InvalidInput(format!(
                "File type not allowed. Allowed extensions: {}",
                allowed.join(", ")
            )),
            other => AppError::InvalidInput(other.to_string()),
        }
    }
}

/// Upload validator
///
/// Checks size, extension and file signature before anything is written to storage.
#[derive(Debug, Clone)]
pub struct DocumentValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
}

impl DocumentValidator {
    pub fn new(max_file_size: usize, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate file extension
    pub fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(())
    }

    /// Reject content that is not a ZIP container, whatever its name says.
    pub fn validate_signature(&self, data: &[u8]) -> Result<(), ValidationError> {
        if !data.starts_with(ZIP_SIGNATURE) {
            return Err(ValidationError::InvalidSignature);
        }
        Ok(())
    }

    /// Run every check in order: name, size, signature.
    pub fn validate(&self, filename: &str, data: &[u8]) -> Result<(), ValidationError> {
        self.validate_extension(filename)?;
        self.validate_file_size(data.len())?;
        self.validate_signature(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> DocumentValidator {
        DocumentValidator::new(1024, vec!["DOCX".to_string()])
    }

    #[test]
    fn test_accepts_docx() {
        let data = b"PK\x03\x04rest-of-archive";
        assert!(validator().validate("Report.DocX", data).is_ok());
    }

    #[test]
    fn test_rejects_wrong_extension() {
        let err = validator().validate("notes.txt", b"PK\x03\x04").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidExtension { .. }));
        assert!(matches!(AppError::from(err), AppError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_missing_extension() {
        let err = validator().validate("README", b"PK\x03\x04").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFilename(_)));
    }

    #[test]
    fn test_rejects_empty_and_oversized() {
        assert!(matches!(
            validator().validate("a.docx", b""),
            Err(ValidationError::EmptyFile)
        ));

        let big = [b'P'; 2048];
        let err = validator().validate("a.docx", &big).unwrap_err();
        assert!(matches!(err, ValidationError::FileTooLarge { size: 2048, max: 1024 }));
        assert!(matches!(AppError::from(err), AppError::PayloadTooLarge(_)));
    }

    #[test]
    fn test_rejects_non_zip_content() {
        let err = validator()
            .validate("fake.docx", b"%PDF-1.7 not a docx")
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidSignature));
    }
}
