use crate::core::errors::Result;

/// Port for re-parsing decrypted bytes into the enclosing document model.
///
/// The decryptor treats the result as opaque.
pub trait DocumentParser {
    type Document;

    fn parse(&self, content: &[u8]) -> Result<Self::Document>;
}
