//! Semantic tokens: engine highlighting shown on the original document.

use crate::base::{DocumentId, LineIndex};
use crate::mapping::Capabilities;

use super::analysis::Analysis;
use super::engine::CheckingEngine;

/// Token type for semantic highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Namespace,
    Type,
    Class,
    Function,
    Variable,
    Parameter,
    Property,
    Keyword,
    String,
    Comment,
}

impl TokenType {
    /// Convert to LSP token type index.
    pub fn to_lsp_index(self) -> u32 {
        match self {
            TokenType::Namespace => 0,
            TokenType::Type => 1,
            TokenType::Class => 2,
            TokenType::Function => 3,
            TokenType::Variable => 4,
            TokenType::Parameter => 5,
            TokenType::Property => 6,
            TokenType::Keyword => 7,
            TokenType::String => 8,
            TokenType::Comment => 9,
        }
    }
}

/// A semantic token for syntax highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticToken {
    /// Line number (0-indexed)
    pub line: u32,
    /// Column number (0-indexed)
    pub col: u32,
    /// Length of the token in bytes
    pub length: u32,
    /// The token type
    pub token_type: TokenType,
}

/// Get semantic tokens for a document.
///
/// Tokens that do not map back through a mapping allowing semantic tokens,
/// or that would span lines in the source, are skipped. Returns tokens
/// sorted by position, one per start position.
pub fn semantic_tokens(
    analysis: &Analysis,
    engine: &dyn CheckingEngine,
    document: DocumentId,
) -> Vec<SemanticToken> {
    let Some(generation) = analysis.generation(document) else {
        return Vec::new();
    };
    let line_index = LineIndex::new(generation.snapshot.text());

    let mut tokens = Vec::new();
    for synthetic in generation.synthetic_documents() {
        for found in engine.semantic_tokens(synthetic) {
            let Some(location) = analysis
                .map_to_original_with(synthetic.id, found.range, Capabilities::SEMANTIC_TOKENS)
                .into_iter()
                .next()
            else {
                continue;
            };
            let position = line_index.line_col_range(location.range);
            if position.start.line != position.end.line || location.range.is_empty() {
                continue;
            }
            tokens.push(SemanticToken {
                line: position.start.line,
                col: position.start.col,
                length: location.range.len().into(),
                token_type: found.token_type,
            });
        }
    }

    // Sort tokens by position (line, then column)
    tokens.sort_by_key(|t| (t.line, t.col));
    tokens.dedup_by_key(|t| (t.line, t.col));
    tokens
}
