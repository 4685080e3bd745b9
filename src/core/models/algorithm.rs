use serde::{Deserialize, Serialize};

/// Message digest algorithms a signature can be computed with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    RipeMd160,
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA1",
            Self::RipeMd160 => "RIPEMD160",
            Self::Sha224 => "SHA224",
            Self::Sha256 => "SHA256",
            Self::Sha384 => "SHA384",
            Self::Sha512 => "SHA512",
        };
        f.write_str(name)
    }
}

/// Public-key algorithms a key or signature can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublicKeyAlgorithm {
    RsaGeneral,
    RsaEncrypt,
    RsaSign,
    ElGamalEncrypt,
    Dsa,
    Ecdh,
    Ecdsa,
    ElGamalGeneral,
    EdDsa,
}

/// Symmetric ciphers used for the encrypted-data layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymmetricAlgorithm {
    Aes128,
    Aes192,
    Aes256,
}

/// Compression algorithms used for the compressed-data layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionAlgorithm {
    Uncompressed,
    Zip,
    Zlib,
    Bzip2,
}

/// Signature types this crate emits or inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureType {
    Binary,
    CanonicalText,
}
