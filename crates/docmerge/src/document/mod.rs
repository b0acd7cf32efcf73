//! Office Open XML documents: package I/O, XML tree, and per-format field
//! locators.

pub mod docx;
mod error;
mod package;
pub mod xlsx;
mod xml;

pub use error::{DocumentError, XmlError};
pub use package::Package;
pub use xml::{Element, Node, NodePath, XmlDocument};

/// Document families the engine can merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// WordprocessingML (`.docx` and relatives).
    Word,
    /// SpreadsheetML (`.xlsx` and relatives).
    Spreadsheet,
}

impl DocumentKind {
    /// Detect the document kind from a file extension, case-insensitively.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "docx" | "docm" | "dotx" | "dotm" => Some(DocumentKind::Word),
            "xlsx" | "xlsm" | "xltx" | "xltm" => Some(DocumentKind::Spreadsheet),
            _ => None,
        }
    }
}
