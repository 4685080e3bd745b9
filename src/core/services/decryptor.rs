use crate::core::errors::{PgpError, Result};
use crate::core::models::packet::{EncryptedDataList, OnePassSignature, PacketObject, Signature};
use crate::core::models::signature_result::SignatureResult;
use crate::core::services::key_selector::KeySelector;
use crate::core::services::verifier::Verifier;
use crate::core::traits::document::DocumentParser;
use crate::core::traits::engine::{PacketStream, PgpEngine};
use crate::core::traits::passphrase::PassphraseProvider;

/// Decrypted content re-parsed as a document, plus signature verdicts.
#[derive(Debug)]
pub struct Decrypted<D> {
    pub document: D,
    pub signatures: Vec<SignatureResult>,
}

/// Where the reader is in the inbound packet structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitEncryptedList,
    Decrypting,
    Compressed,
    Literal,
    Done,
}

impl State {
    /// Move to `to`, rejecting any step the message grammar does not allow.
    fn advance(self, to: State) -> Result<State> {
        use State::*;

        let allowed = matches!(
            (self, to),
            (AwaitEncryptedList, Decrypting)
                | (Decrypting, Compressed | Literal | Done)
                | (Compressed, Literal | Done)
                | (Literal, Literal | Done)
        );
        tracing::trace!(from = ?self, ?to, allowed, "decrypt state");
        match (self, to) {
            _ if allowed => Ok(to),
            (Compressed, Compressed) => Err(PgpError::RecursiveCompression),
            _ => Err(PgpError::OutOfOrderPacket {
                found: to.label().to_string(),
                after: self.label().to_string(),
            }),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::AwaitEncryptedList => "start of message",
            Self::Decrypting => "encrypted data list",
            Self::Compressed => "compressed data",
            Self::Literal => "literal data",
            Self::Done => "end of message",
        }
    }
}

/// What the inner packet walk collected.
#[derive(Default)]
struct Collected {
    plaintext: Vec<u8>,
    one_pass: Vec<OnePassSignature>,
    trailing: Option<Vec<Signature>>,
}

/// Walks an inbound encrypted message and recovers its content.
pub struct Decryptor<'a, E: PgpEngine + ?Sized> {
    engine: &'a E,
    selector: KeySelector<'a>,
    passphrase: &'a dyn PassphraseProvider,
}

impl<'a, E: PgpEngine + ?Sized> Decryptor<'a, E> {
    pub fn new(
        engine: &'a E,
        selector: KeySelector<'a>,
        passphrase: &'a dyn PassphraseProvider,
    ) -> Self {
        Self {
            engine,
            selector,
            passphrase,
        }
    }

    /// Decrypt, verify trailing signatures, and re-parse the plaintext.
    pub fn decrypt<P: DocumentParser>(
        &self,
        encrypted: &[u8],
        parser: &P,
    ) -> Result<Decrypted<P::Document>> {
        let (plaintext, signatures) = self.decrypt_bytes(encrypted)?;
        let document = parser.parse(&plaintext)?;
        Ok(Decrypted {
            document,
            signatures,
        })
    }

    /// Decrypt to raw bytes. Nothing is returned unless the whole walk succeeds.
    pub fn decrypt_bytes(&self, encrypted: &[u8]) -> Result<(Vec<u8>, Vec<SignatureResult>)> {
        let binary = self.engine.dearmor(encrypted)?;
        let mut outer = self.engine.read_packets(binary)?;
        let list = await_encrypted_list(&mut outer)?;

        let mut state = State::AwaitEncryptedList.advance(State::Decrypting)?;
        let entry = list
            .first_public_key_entry()
            .ok_or(PgpError::NoEncryptedData)?;
        let private = self
            .selector
            .select_private_key(self.engine, entry.key_id, self.passphrase)?;
        let inner = self.engine.decrypt_data(&list, entry, &private)?;
        drop(private);

        let collected = self.walk(self.engine.read_packets(inner)?, &mut state)?;
        state.advance(State::Done)?;

        if !collected.one_pass.is_empty() {
            tracing::debug!(
                count = collected.one_pass.len(),
                "message carries one-pass signatures"
            );
        }

        let signatures = match &collected.trailing {
            Some(list) => Verifier::new(self.engine, self.selector.public_bundle())
                .verify_signatures(list, &collected.plaintext)?,
            None => Vec::new(),
        };

        tracing::debug!(
            bytes = collected.plaintext.len(),
            signatures = signatures.len(),
            "decrypted message"
        );
        Ok((collected.plaintext, signatures))
    }

    fn walk(&self, mut stream: PacketStream, state: &mut State) -> Result<Collected> {
        let mut collected = Collected::default();

        while let Some(object) = stream.next().transpose()? {
            match object {
                PacketObject::CompressedData(data) => {
                    *state = state.advance(State::Compressed)?;
                    stream = self.engine.read_packets(self.engine.decompress(&data)?)?;
                }
                PacketObject::OnePassSignatureList(list) => collected.one_pass.extend(list),
                PacketObject::SignatureList(list) => {
                    collected.trailing.get_or_insert_with(Vec::new).extend(list);
                }
                PacketObject::LiteralData(literal) => {
                    *state = state.advance(State::Literal)?;
                    collected.plaintext.extend_from_slice(&literal.body);
                }
                PacketObject::Marker => {}
                other @ PacketObject::EncryptedDataList(_) => {
                    return Err(PgpError::UnexpectedPacket {
                        found: other.kind().to_string(),
                    });
                }
            }
        }

        Ok(collected)
    }
}

/// Read up to two objects looking for the encrypted data list; a leading
/// marker (or any one other object) is tolerated.
fn await_encrypted_list(stream: &mut PacketStream) -> Result<EncryptedDataList> {
    let mut last_kind = "end of stream";
    for _ in 0..2 {
        match stream.next().transpose()? {
            Some(PacketObject::EncryptedDataList(list)) => return Ok(list),
            Some(other) => last_kind = other.kind(),
            None => break,
        }
    }
    Err(PgpError::UnexpectedPacket {
        found: last_kind.to_string(),
    })
}
