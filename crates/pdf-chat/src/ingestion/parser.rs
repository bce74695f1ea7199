//! PDF text and metadata extraction

use lopdf::{Dictionary, Document, Object};

use super::text::{detect_language, normalize};
use crate::error::{Error, Result};
use crate::types::DocumentMetadata;

/// Extracts normalized text and info-dictionary metadata from PDF bytes
pub struct PdfExtractor;

impl PdfExtractor {
    /// Extract metadata and normalized text from a complete PDF buffer
    ///
    /// Pages are read in order and joined with a newline before normalization.
    /// Encrypted documents are opened with the empty user password, which covers
    /// owner-password-only files. Fails with `UnsupportedOrEmptyDocument` when the
    /// bytes are not a readable PDF, when a user password is required, or when no
    /// text survives normalization (scanned or image-only pages).
    pub fn extract(filename: &str, data: &[u8]) -> Result<(DocumentMetadata, String)> {
        let mut doc = Document::load_mem(data)
            .map_err(|e| Error::unsupported_document(format!("failed to load PDF: {}", e)))?;

        if doc.is_encrypted() {
            doc.decrypt("")
                .map_err(|e| Error::unsupported_document(format!("cannot decrypt PDF: {}", e)))?;
            tracing::debug!("Decrypted '{}' with the empty user password", filename);
        }

        let pages = doc.get_pages();
        let mut raw = String::new();
        for &page_number in pages.keys() {
            match doc.extract_text(&[page_number]) {
                Ok(page_text) => raw.push_str(&page_text),
                Err(e) => tracing::debug!("Could not extract text from page {}: {}", page_number, e),
            }
            raw.push('\n');
        }

        let mut text = normalize(&raw);
        if text.is_empty() {
            // Fonts lopdf cannot decode (CID, custom encodings) often still work here
            tracing::debug!("Page extraction found no text in '{}', trying pdf-extract", filename);
            text = normalize(&Self::extract_whole_document(data));
        }

        if text.is_empty() {
            return Err(Error::unsupported_document(format!(
                "no extractable text in {} page(s)",
                pages.len()
            )));
        }

        let info = Self::info_dictionary(&doc);
        let metadata = DocumentMetadata {
            title: Self::info_field(&doc, info, b"Title"),
            author: Self::info_field(&doc, info, b"Author"),
            subject: Self::info_field(&doc, info, b"Subject"),
            keywords: Self::info_field(&doc, info, b"Keywords"),
            filename: filename.to_string(),
            page_count: pages.len() as u32,
            language: detect_language(&text),
        };

        tracing::info!(
            "Extracted '{}': {} pages, {} chars, language {}",
            filename,
            metadata.page_count,
            text.len(),
            metadata.language
        );

        Ok((metadata, text))
    }

    /// Whole-document extraction with pdf-extract; empty on failure
    fn extract_whole_document(data: &[u8]) -> String {
        // pdf-extract panics on some malformed font programs
        match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data)) {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                tracing::debug!("pdf-extract failed: {}", e);
                String::new()
            }
            Err(_) => {
                tracing::warn!("pdf-extract panicked while reading document");
                String::new()
            }
        }
    }

    /// The trailer's `Info` dictionary, inline or by reference
    fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
        let info = doc.trailer.get(b"Info").ok()?;
        Self::resolve(doc, info)?.as_dict().ok()
    }

    /// A text field of the info dictionary; missing or non-string values read as empty
    fn info_field(doc: &Document, info: Option<&Dictionary>, key: &[u8]) -> String {
        info.and_then(|dict| dict.get(key).ok())
            .and_then(|obj| Self::resolve(doc, obj))
            .and_then(|obj| obj.as_str().ok())
            .map(decode_text_string)
            .unwrap_or_default()
    }

    fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => doc.get_object(*id).ok(),
            other => Some(other),
        }
    }
}

/// Decode a PDF text string (UTF-16BE with BOM, UTF-8 with BOM, or PDFDocEncoding)
fn decode_text_string(bytes: &[u8]) -> String {
    let decoded = match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        // PDFDocEncoding agrees with Latin-1 for printable text
        _ => bytes.iter().map(|&b| b as char).collect(),
    };
    decoded.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EMPTY_DOCUMENT_MESSAGE;
    use lopdf::content::{Content, Operation};
    use lopdf::encryption::{decrypt_object, get_encryption_key};
    use lopdf::{dictionary, Stream, StringFormat};

    /// Build a PDF with one page per entry; empty entries produce pages with no text
    fn build_pdf(pages: &[&str], info: Option<Dictionary>) -> Vec<u8> {
        let mut buffer = Vec::new();
        build_document(pages, info).save_to(&mut buffer).unwrap();
        buffer
    }

    /// RC4-40 encrypt a document behind an owner password, leaving the user password
    /// empty. `U` is omitted, so the reader skips the password check.
    fn encrypt_document(doc: &mut Document) {
        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
            "Length" => 40,
            "O" => Object::String(vec![0x5A; 32], StringFormat::Hexadecimal),
            "P" => -3904,
        });
        doc.trailer.set("Encrypt", encrypt_id);
        let file_id = Object::String(b"0123456789abcdef".to_vec(), StringFormat::Hexadecimal);
        doc.trailer.set("ID", vec![file_id.clone(), file_id]);

        let key = get_encryption_key(&*doc, "", false).unwrap();
        let info_id = doc.trailer.get(b"Info").and_then(Object::as_reference).ok();

        // RC4 is symmetric, so the decryption routine also seals
        for (&id, obj) in doc.objects.iter_mut() {
            if id == encrypt_id {
                continue;
            }
            if let Object::Stream(stream) = obj {
                let sealed = decrypt_object(&key, id, &Object::Stream(stream.clone())).unwrap();
                stream.set_content(sealed);
            } else if Some(id) == info_id {
                if let Object::Dictionary(dict) = obj {
                    for (_, value) in dict.iter_mut() {
                        if let Ok(sealed) = decrypt_object(&key, id, &*value) {
                            *value = Object::String(sealed, StringFormat::Hexadecimal);
                        }
                    }
                }
            }
        }
    }

    fn build_document(pages: &[&str], info: Option<Dictionary>) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for text in pages {
            let operations = if text.is_empty() {
                Vec::new()
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ]
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        if let Some(info) = info {
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", info_id);
        }
        doc
    }

    #[test]
    fn test_extracts_text_and_metadata() {
        let info = dictionary! {
            "Title" => Object::string_literal("Quarterly Report"),
            "Author" => Object::string_literal("Finance Team"),
        };
        let data = build_pdf(
            &["The quarterly revenue grew steadily", "Operating costs were reduced"],
            Some(info),
        );

        let (metadata, text) = PdfExtractor::extract("report.pdf", &data).unwrap();

        assert!(text.contains("quarterly revenue"));
        assert!(text.contains("Operating costs"));
        assert_eq!(metadata.page_count, 2);
        assert_eq!(metadata.filename, "report.pdf");
        assert_eq!(metadata.title, "Quarterly Report");
        assert_eq!(metadata.author, "Finance Team");
        assert_eq!(metadata.subject, "");
        assert_eq!(metadata.keywords, "");
        assert!(!metadata.language.is_empty());
    }

    #[test]
    fn test_missing_info_dictionary_gives_empty_fields() {
        let data = build_pdf(&["Some text on a page"], None);
        let (metadata, _) = PdfExtractor::extract("plain.pdf", &data).unwrap();
        assert_eq!(metadata.title, "");
        assert_eq!(metadata.author, "");
        assert_eq!(metadata.page_count, 1);
    }

    #[test]
    fn test_textless_pdf_is_rejected() {
        let data = build_pdf(&["", ""], None);
        let err = PdfExtractor::extract("scan.pdf", &data).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOrEmptyDocument { .. }));
        assert_eq!(err.to_string(), EMPTY_DOCUMENT_MESSAGE);
    }

    #[test]
    fn test_non_pdf_bytes_are_rejected() {
        let jpeg_header = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
        let err = PdfExtractor::extract("photo.pdf", &jpeg_header).unwrap_err();
        assert_eq!(err.to_string(), EMPTY_DOCUMENT_MESSAGE);
    }

    #[test]
    fn test_owner_password_only_pdf_is_decrypted() {
        let info = dictionary! { "Title" => Object::string_literal("Restricted Memo") };
        let mut doc = build_document(&["Printing of this memo is restricted"], Some(info));
        encrypt_document(&mut doc);
        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();

        let reloaded = Document::load_mem(&data).unwrap();
        assert!(reloaded.is_encrypted());

        let (metadata, text) = PdfExtractor::extract("memo.pdf", &data).unwrap();
        assert!(text.contains("memo is restricted"), "got {text:?}");
        assert_eq!(metadata.title, "Restricted Memo");
        assert_eq!(metadata.page_count, 1);
    }

    #[test]
    fn test_user_password_pdf_is_rejected() {
        let mut doc = build_document(&["Confidential figures"], None);
        encrypt_document(&mut doc);
        // A `U` entry the empty password cannot reproduce means a user password is set
        let encrypt_id = doc.trailer.get(b"Encrypt").and_then(Object::as_reference).unwrap();
        doc.get_object_mut(encrypt_id)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set("U", Object::String(vec![0u8; 32], StringFormat::Hexadecimal));
        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();

        let err = PdfExtractor::extract("secret.pdf", &data).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOrEmptyDocument { .. }));
    }

    #[test]
    fn test_decode_text_string() {
        assert_eq!(decode_text_string(b"  Plain title "), "Plain title");
        assert_eq!(
            decode_text_string(&[0xFE, 0xFF, 0x00, b'H', 0x00, b'i']),
            "Hi"
        );
        assert_eq!(decode_text_string(&[0xEF, 0xBB, 0xBF, b'o', b'k']), "ok");
        assert_eq!(decode_text_string(&[b'K', 0xF6, b'l', b'n']), "K\u{f6}ln");
    }
}
