use std::io::Write;

use zeroize::Zeroizing;

use crate::core::errors::Result;
use crate::core::models::algorithm::{CompressionAlgorithm, SymmetricAlgorithm};
use crate::core::models::key::PublicKey;
use crate::core::models::packet::{ArmorKind, LiteralHeader};
use crate::core::traits::engine::PgpEngine;

/// A packet layer that wraps everything written inside it.
#[derive(Debug, Clone)]
pub enum Layer {
    Armor(ArmorKind),
    Encrypted {
        cipher: SymmetricAlgorithm,
        integrity_protected: bool,
        recipients: Vec<PublicKey>,
    },
    Compressed(CompressionAlgorithm),
    Literal(LiteralHeader),
}

impl Layer {
    fn name(&self) -> &'static str {
        match self {
            Self::Armor(_) => "armor",
            Self::Encrypted { .. } => "encrypted",
            Self::Compressed(_) => "compressed",
            Self::Literal(_) => "literal",
        }
    }
}

struct OpenLayer {
    layer: Layer,
    content: Zeroizing<Vec<u8>>,
}

/// Builds nested packet layers, outermost first.
///
/// Bytes written go to the innermost open layer. Closing a layer encodes
/// its content through the engine and appends the result to the layer
/// around it, so layers are always released innermost first. Buffers are
/// wiped when the writer is dropped, including after a failed close.
pub struct LayeredWriter<'e, E: PgpEngine + ?Sized> {
    engine: &'e E,
    stack: Vec<OpenLayer>,
    output: Vec<u8>,
}

impl<'e, E: PgpEngine + ?Sized> LayeredWriter<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self {
            engine,
            stack: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Open a new innermost layer.
    pub fn open(&mut self, layer: Layer) -> &mut Self {
        tracing::trace!(layer = layer.name(), depth = self.stack.len(), "open layer");
        self.stack.push(OpenLayer {
            layer,
            content: Zeroizing::new(Vec::new()),
        });
        self
    }

    /// Number of layers currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Append already-encoded packets (one-pass or signature packets) to
    /// the innermost layer.
    pub fn emit(&mut self, packet: &[u8]) {
        self.sink().extend_from_slice(packet);
    }

    /// Close the innermost layer.
    pub fn close(&mut self) -> Result<()> {
        let Some(open) = self.stack.pop() else {
            return Ok(());
        };
        tracing::trace!(layer = open.layer.name(), depth = self.stack.len(), "close layer");

        let encoded = match &open.layer {
            Layer::Armor(kind) => self.engine.armor(*kind, &open.content)?,
            Layer::Encrypted {
                cipher,
                integrity_protected,
                recipients,
            } => self
                .engine
                .encode_encrypted(*cipher, *integrity_protected, recipients, &open.content)?,
            Layer::Compressed(algorithm) => {
                self.engine.encode_compressed(*algorithm, &open.content)?
            }
            Layer::Literal(header) => self.engine.encode_literal(header, &open.content)?,
        };

        self.sink().extend_from_slice(&encoded);
        Ok(())
    }

    /// Close every remaining layer and return the outermost encoding.
    ///
    /// On the first failure the remaining layers are released without
    /// being encoded and the error is returned; no partial output escapes.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        while !self.stack.is_empty() {
            if let Err(e) = self.close() {
                self.stack.clear();
                return Err(e);
            }
        }
        Ok(std::mem::take(&mut self.output))
    }

    fn sink(&mut self) -> &mut Vec<u8> {
        match self.stack.last_mut() {
            Some(open) => &mut open.content,
            None => &mut self.output,
        }
    }
}

impl<E: PgpEngine + ?Sized> Write for LayeredWriter<'_, E> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.sink().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
