//! Sending text through repeated superdense channel uses.
//!
//! The text is turned into UTF-8 bits and split into 2-bit blocks (the last one
//! zero padded). Block `i` consumes key bits `2i` and `2i + 1`.

use super::superdense::SuperdenseEngine;
use crate::core::bits::{bits_to_text, chunk_pairs, text_to_bits};
use crate::core::errors::ProtocolError;
use crate::{Bit, BitPair};
use rand::Rng;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockSummary {
    pub index: usize,
    pub sent: BitPair,
    pub received: BitPair,
    pub decoded: BitPair,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransmissionResult {
    pub original_text: String,
    pub decoded_text: String,
    pub decoded_bits: Vec<Bit>,
    pub success: bool,
    pub key_bits_used: usize,
    pub blocks: Vec<BlockSummary>,
}

impl TransmissionResult {
    /// Fraction of blocks that arrived intact.
    pub fn block_success_rate(&self) -> f64 {
        if self.blocks.is_empty() {
            return 0.0;
        }
        let ok = self.blocks.iter().filter(|b| b.sent == b.decoded).count();
        ok as f64 / self.blocks.len() as f64
    }
}

/// Sends `text` block by block, each block keyed by its own pair of key bits.
pub fn transmit_text<R: Rng + ?Sized>(
    engine: &SuperdenseEngine,
    text: &str,
    key: &[Bit],
    eavesdropper: bool,
    rng: &mut R,
) -> Result<TransmissionResult, ProtocolError> {
    if text.is_empty() {
        return Err(ProtocolError::InvalidInput(
            "cannot transmit empty text".to_string(),
        ));
    }

    let bits = text_to_bits(text);
    let pairs = chunk_pairs(&bits);
    let required = pairs.len() * 2;
    if key.len() < required {
        return Err(ProtocolError::InsufficientKeyMaterial {
            available: key.len(),
            required,
        });
    }

    let mut blocks = Vec::with_capacity(pairs.len());
    let mut decoded_bits = Vec::with_capacity(required);
    for (index, (pair, key_pair)) in pairs.iter().zip(key.chunks_exact(2)).enumerate() {
        let r = engine.encode_and_decode(*pair, key_pair, eavesdropper, rng)?;
        decoded_bits.extend(r.decoded.bits());
        blocks.push(BlockSummary {
            index,
            sent: *pair,
            received: r.received,
            decoded: r.decoded,
        });
    }
    decoded_bits.truncate(bits.len());

    let decoded_text = bits_to_text(&decoded_bits);
    let success = decoded_text == text;
    info!(blocks = blocks.len(), success, eavesdropper, "text transmission completed");

    Ok(TransmissionResult {
        original_text: text.to_string(),
        decoded_text,
        decoded_bits,
        success,
        key_bits_used: required,
        blocks,
    })
}
