//! Translation between this crate's algorithm enums and OpenPGP wire tags
//! (RFC 4880 §9.1 and §9.4).

use crate::core::errors::{PgpError, Result};
use crate::core::models::algorithm::{DigestAlgorithm, PublicKeyAlgorithm};

pub fn digest_to_tag(algorithm: DigestAlgorithm) -> u8 {
    match algorithm {
        DigestAlgorithm::Md5 => 1,
        DigestAlgorithm::Sha1 => 2,
        DigestAlgorithm::RipeMd160 => 3,
        DigestAlgorithm::Sha256 => 8,
        DigestAlgorithm::Sha384 => 9,
        DigestAlgorithm::Sha512 => 10,
        DigestAlgorithm::Sha224 => 11,
    }
}

pub fn digest_from_tag(tag: u8) -> Result<DigestAlgorithm> {
    match tag {
        1 => Ok(DigestAlgorithm::Md5),
        2 => Ok(DigestAlgorithm::Sha1),
        3 => Ok(DigestAlgorithm::RipeMd160),
        8 => Ok(DigestAlgorithm::Sha256),
        9 => Ok(DigestAlgorithm::Sha384),
        10 => Ok(DigestAlgorithm::Sha512),
        11 => Ok(DigestAlgorithm::Sha224),
        _ => Err(PgpError::UnsupportedAlgorithm {
            kind: "digest",
            tag,
        }),
    }
}

pub fn public_key_to_tag(algorithm: PublicKeyAlgorithm) -> u8 {
    match algorithm {
        PublicKeyAlgorithm::RsaGeneral => 1,
        PublicKeyAlgorithm::RsaEncrypt => 2,
        PublicKeyAlgorithm::RsaSign => 3,
        PublicKeyAlgorithm::ElGamalEncrypt => 16,
        PublicKeyAlgorithm::Dsa => 17,
        PublicKeyAlgorithm::Ecdh => 18,
        PublicKeyAlgorithm::Ecdsa => 19,
        PublicKeyAlgorithm::ElGamalGeneral => 20,
        PublicKeyAlgorithm::EdDsa => 22,
    }
}

pub fn public_key_from_tag(tag: u8) -> Result<PublicKeyAlgorithm> {
    match tag {
        1 => Ok(PublicKeyAlgorithm::RsaGeneral),
        2 => Ok(PublicKeyAlgorithm::RsaEncrypt),
        3 => Ok(PublicKeyAlgorithm::RsaSign),
        16 => Ok(PublicKeyAlgorithm::ElGamalEncrypt),
        17 => Ok(PublicKeyAlgorithm::Dsa),
        18 => Ok(PublicKeyAlgorithm::Ecdh),
        19 => Ok(PublicKeyAlgorithm::Ecdsa),
        20 => Ok(PublicKeyAlgorithm::ElGamalGeneral),
        22 => Ok(PublicKeyAlgorithm::EdDsa),
        _ => Err(PgpError::UnsupportedAlgorithm {
            kind: "public-key",
            tag,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_is_tag_8() {
        assert_eq!(digest_to_tag(DigestAlgorithm::Sha256), 8);
        assert_eq!(digest_from_tag(8).unwrap(), DigestAlgorithm::Sha256);
    }

    #[test]
    fn every_digest_maps_back_to_itself() {
        for algorithm in [
            DigestAlgorithm::Md5,
            DigestAlgorithm::Sha1,
            DigestAlgorithm::RipeMd160,
            DigestAlgorithm::Sha224,
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
        ] {
            assert_eq!(digest_from_tag(digest_to_tag(algorithm)).unwrap(), algorithm);
        }
    }

    #[test]
    fn unknown_digest_tag_is_unsupported() {
        let err = digest_from_tag(4).unwrap_err();
        assert!(matches!(
            err,
            PgpError::UnsupportedAlgorithm {
                kind: "digest",
                tag: 4
            }
        ));
    }

    #[test]
    fn rsa_and_eddsa_tags() {
        assert_eq!(public_key_to_tag(PublicKeyAlgorithm::RsaGeneral), 1);
        assert_eq!(public_key_from_tag(22).unwrap(), PublicKeyAlgorithm::EdDsa);
    }

    #[test]
    fn unknown_public_key_tag_is_unsupported() {
        assert!(matches!(
            public_key_from_tag(99),
            Err(PgpError::UnsupportedAlgorithm {
                kind: "public-key",
                ..
            })
        ));
    }
}
