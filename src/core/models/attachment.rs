/// Content type of an exported key bundle.
pub const PGP_KEYS_CONTENT_TYPE: &str = "application/pgp-keys";

/// Content type of signed or encrypted output.
pub const OPAQUE_CONTENT_TYPE: &str = "application/octet-stream";

/// File name given to encrypted output.
pub const ENCRYPTED_FILE_NAME: &str = "encrypted.asc";

/// File name given to detached signatures.
pub const SIGNATURE_FILE_NAME: &str = "signature.asc";

/// File name given to exported key bundles.
pub const KEYS_FILE_NAME: &str = "keys.asc";

/// A payload framed for inclusion in a mail message as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub content_type: String,
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

impl Attachment {
    /// An armored key bundle (`application/pgp-keys`).
    pub fn pgp_keys(data: Vec<u8>) -> Self {
        Self {
            content_type: PGP_KEYS_CONTENT_TYPE.into(),
            file_name: Some(KEYS_FILE_NAME.into()),
            data,
        }
    }

    /// Opaque binary output with a fixed file name.
    pub fn opaque(file_name: &str, data: Vec<u8>) -> Self {
        Self {
            content_type: OPAQUE_CONTENT_TYPE.into(),
            file_name: Some(file_name.into()),
            data,
        }
    }
}
