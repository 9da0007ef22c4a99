//! Prompt assembler — renders matched documents and conversation history
//! into one instruction-formatted prompt string.
//!
//! The output shape follows the Mistral instruction convention: a fixed
//! preamble, a `<Context>` block of formatted documents, and a
//! `<Conversation>` block of alternating `User:` / `You:` lines, all wrapped
//! in `[INST] ... [/INST]`. Assembly is deterministic for identical inputs.

use emberchat_core::document::{ContextDocument, DocumentContent};
use emberchat_core::history::ConversationHistory;

pub struct PromptAssembler {
    preamble: String,
}

impl PromptAssembler {
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
        }
    }

    /// Build the full prompt from the buffered context entries and turns.
    pub fn assemble(&self, history: &ConversationHistory) -> String {
        let context_block = history
            .context_entries()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut conversation = String::new();
        for (i, input) in history.user_inputs().enumerate() {
            conversation.push_str("User: ");
            conversation.push_str(input);
            conversation.push('\n');
            if let Some(response) = history.response_for(i) {
                conversation.push_str("You: ");
                conversation.push_str(response);
                conversation.push('\n');
            }
        }

        format!(
            "[INST] {}\n<Context>\n{}\n<Conversation>\n{}[/INST]",
            self.preamble, context_block, conversation
        )
    }
}

/// Format matched documents as context blocks joined by a blank line.
pub fn format_documents(docs: &[ContextDocument]) -> String {
    docs.iter()
        .map(format_document)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_document(doc: &ContextDocument) -> String {
    let mut lines = vec![
        format!("Source: {}", doc.source),
        format!("ID: {}", doc.id),
    ];

    if let Some(title) = &doc.title {
        lines.push(format!("Title: {title}"));
    }
    if let Some(date) = &doc.date {
        lines.push(format!("Date: {date}"));
    }
    if !doc.tags.is_empty() {
        lines.push(format!("Tags: {}", doc.tags.join(", ")));
    }
    if let Some(category) = &doc.category {
        lines.push(format!("Category: {category}"));
    }
    if let Some(description) = &doc.description {
        lines.push(format!("Description: {description}"));
    }
    if let Some(info) = &doc.info {
        lines.push(format!("Info: {info}"));
    }

    lines.push(format!("Content: {}", resolve_content(doc)));
    lines.join("\n")
}

/// Resolve the document body: segments joined by newline, then plain text,
/// then the `info` field, then a literal placeholder.
fn resolve_content(doc: &ContextDocument) -> String {
    match &doc.content {
        DocumentContent::Segments(segments) => segments
            .iter()
            .map(|s| s.value.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        // An empty string is treated the same as an absent field.
        DocumentContent::PlainText(text) if !text.is_empty() => text.clone(),
        _ => doc.info.clone().unwrap_or_else(|| "No content".into()),
    }
}
