//! Prompt assembler — pure construction of the system prompt.
//!
//! Byte-deterministic: identical inputs always produce the identical
//! string. Three fixed parts in order: the grounding header, the
//! evidence block, the persona text.

use ragline_core::knowledge::RetrievedSnippet;

/// Instructs the model to reason from the supplied evidence before
/// anything else.
const GROUNDING_HEADER: &str = "You are a knowledgeable assistant. Answer \
using the reference material below when it is relevant. Ground your claims \
in the provided sources and reason in a measured, step-by-step way. When \
the sources do not cover the question, say so plainly rather than guessing.";

/// Rendered in place of the evidence block when retrieval found nothing.
pub const NO_EVIDENCE_NOTICE: &str =
    "No reference material was found for this query. Answer from general \
knowledge and say that no sources were available.";

/// Build the system prompt for one turn.
///
/// Snippets are rendered in retrieval order, one `[Source: <file>]:` entry
/// per unit, separated by blank lines. The persona text comes last so it
/// reads as the closing instruction.
pub fn assemble(persona: &str, snippets: &[RetrievedSnippet]) -> String {
    let evidence = if snippets.is_empty() {
        NO_EVIDENCE_NOTICE.to_string()
    } else {
        snippets
            .iter()
            .map(|s| format!("[Source: {}]: {}", s.unit.source_file, s.unit.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!("{GROUNDING_HEADER}\n\n{evidence}\n\n{persona}")
}
