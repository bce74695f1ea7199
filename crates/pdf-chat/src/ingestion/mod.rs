//! Document ingestion: bounded upload reading, PDF extraction, and text normalization

pub mod multipart;
mod parser;
mod size_guard;
pub mod text;

pub use multipart::{read_file_field, UploadedFile};
pub use parser::PdfExtractor;
pub use size_guard::{SizeGuard, MIB};
pub use text::{detect_language, normalize};
