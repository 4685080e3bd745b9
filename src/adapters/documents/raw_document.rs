use crate::core::errors::{PgpError, Result};
use crate::core::traits::document::DocumentParser;

/// Hands the decrypted bytes back unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDocumentParser;

impl DocumentParser for RawDocumentParser {
    type Document = Vec<u8>;

    fn parse(&self, content: &[u8]) -> Result<Vec<u8>> {
        Ok(content.to_vec())
    }
}

/// Reads the decrypted bytes as UTF-8 text, e.g. a mail body part.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDocumentParser;

impl DocumentParser for TextDocumentParser {
    type Document = String;

    fn parse(&self, content: &[u8]) -> Result<String> {
        String::from_utf8(content.to_vec()).map_err(|e| PgpError::Document {
            reason: e.to_string(),
        })
    }
}
