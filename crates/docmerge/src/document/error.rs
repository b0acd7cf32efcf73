//! Error types for document loading and saving.

use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

use quick_xml::escape::EscapeError;
use quick_xml::events::attributes::AttrError;
use thiserror::Error;
use zip::result::ZipError;

/// Errors that occur while reading or writing a document package.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// File I/O error on the template or output path.
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not a readable zip package.
    #[error("invalid package: {0}")]
    Package(#[from] ZipError),

    /// A required part is absent from the package.
    #[error("package has no part '{part}'")]
    MissingPart { part: String },

    /// A part is not UTF-8 text.
    #[error("part '{part}' is not valid UTF-8")]
    Encoding { part: String },

    /// A part is not well-formed XML.
    #[error("malformed XML in '{part}': {source}")]
    Xml {
        part: String,
        #[source]
        source: XmlError,
    },

    /// The file extension names no supported document kind.
    #[error("unsupported document type: '{path}'")]
    UnsupportedFormat { path: PathBuf },
}

/// Errors from parsing or serializing an XML part.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error(transparent)]
    Syntax(#[from] quick_xml::Error),

    #[error(transparent)]
    Attribute(#[from] AttrError),

    #[error(transparent)]
    Escape(#[from] EscapeError),

    #[error(transparent)]
    Write(#[from] io::Error),

    #[error(transparent)]
    Utf8(#[from] FromUtf8Error),

    /// Structure quick-xml accepts but a document tree cannot hold.
    #[error("{message}")]
    Malformed { message: String },
}
