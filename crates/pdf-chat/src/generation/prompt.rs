//! Prompt templates for document-grounded chat

use crate::types::DocumentMetadata;

/// Fixed instruction preamble shared by every conversation
pub const INSTRUCTION_PREAMBLE: &str = r#"You are an assistant that answers questions using only the content of one PDF document.
The document's extracted text and its metadata are included below.
If a question is unrelated to the document, reply with "I can only answer questions related to the document."
Keep the conversation professional and respectful.
Reply in plain text only.
"#;

/// Build the grounding context: preamble, document text, then metadata
pub fn grounding_context(metadata: &DocumentMetadata, text: &str) -> String {
    let mut context = String::with_capacity(INSTRUCTION_PREAMBLE.len() + text.len() + 256);
    context.push_str(INSTRUCTION_PREAMBLE);

    context.push_str("\n## Document Text\n\n");
    context.push_str(text);
    context.push_str("\n\n## Document Metadata\n\n");
    context.push_str(&format_metadata(metadata));

    context
}

fn format_metadata(metadata: &DocumentMetadata) -> String {
    let fields = [
        ("Title", metadata.title.as_str()),
        ("Author", metadata.author.as_str()),
        ("Subject", metadata.subject.as_str()),
        ("Keywords", metadata.keywords.as_str()),
        ("Filename", metadata.filename.as_str()),
        ("Language", metadata.language.as_str()),
    ];

    let mut out = String::new();
    for (label, value) in fields {
        out.push_str(&format!("{}: {}\n", label, value));
    }
    out.push_str(&format!("Pages: {}\n", metadata.page_count));
    out
}
