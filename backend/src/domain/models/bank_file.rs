/// Document types accepted as a loan's bank file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankFileKind {
    Pdf,
    Csv,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Only PDF and CSV files are allowed! (got {0})")]
pub struct UnsupportedBankFileType(pub String);

impl BankFileKind {
    /// Resolve the allowlisted kind for a MIME type, ignoring parameters
    /// such as `; charset=utf-8`
    pub fn from_content_type(content_type: &str) -> Result<Self, UnsupportedBankFileType> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/pdf" => Ok(BankFileKind::Pdf),
            "text/csv" => Ok(BankFileKind::Csv),
            _ => Err(UnsupportedBankFileType(content_type.to_string())),
        }
    }

    /// File extension used when storing the document (the MIME subtype)
    pub fn extension(&self) -> &'static str {
        match self {
            BankFileKind::Pdf => "pdf",
            BankFileKind::Csv => "csv",
        }
    }
}

/// An uploaded document that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct BankFileUpload {
    pub kind: BankFileKind,
    pub contents: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowlisted_content_types() {
        assert_eq!(BankFileKind::from_content_type("application/pdf"), Ok(BankFileKind::Pdf));
        assert_eq!(BankFileKind::from_content_type("text/csv"), Ok(BankFileKind::Csv));
        assert_eq!(
            BankFileKind::from_content_type("Text/CSV; charset=utf-8"),
            Ok(BankFileKind::Csv)
        );
    }

    #[test]
    fn test_rejected_content_types() {
        for content_type in ["image/png", "application/json", "text/plain", ""] {
            let err = BankFileKind::from_content_type(content_type).unwrap_err();
            assert!(err.to_string().starts_with("Only PDF and CSV files are allowed!"));
        }
    }

    #[test]
    fn test_extension_is_mime_subtype() {
        assert_eq!(BankFileKind::Pdf.extension(), "pdf");
        assert_eq!(BankFileKind::Csv.extension(), "csv");
    }
}
