//! Hash-chained ledger records.

use attendance_core::Notification;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::error::StoreError;

/// Domain separator for record digests: `b"attendance:record:v1\0"`.
const RECORD_DOMAIN_SEPARATOR: &[u8] = b"attendance:record:v1\0";

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlg {
    /// SHA-256.
    #[serde(rename = "sha-256")]
    Sha256,
}

/// Algorithm + digest bytes, encoded as base64url without padding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest {
    /// Digest algorithm.
    pub alg: DigestAlg,
    /// Base64URL (no padding) digest bytes.
    pub b64: String,
}

/// One journal entry: a committed notification linked to its predecessor.
///
/// `digest = sha256(separator || seq_le || prev.b64 || 0x00 || notification_json)`,
/// with an empty `prev` for the genesis record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Position in the journal, 0 for genesis.
    pub seq: u64,
    /// Digest of the previous record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<Digest>,
    /// The committed transition.
    pub notification: Notification,
    /// Digest over this record's other fields.
    pub digest: Digest,
}

impl LedgerRecord {
    /// Builds the record following `prev` at position `seq`.
    pub fn seal(
        seq: u64,
        prev: Option<Digest>,
        notification: Notification,
    ) -> Result<Self, StoreError> {
        let digest = compute_digest(seq, prev.as_ref(), &notification)?;
        Ok(Self {
            seq,
            prev,
            notification,
            digest,
        })
    }
}

/// Computes the digest a record at `seq` must carry.
pub fn compute_digest(
    seq: u64,
    prev: Option<&Digest>,
    notification: &Notification,
) -> Result<Digest, StoreError> {
    let body = serde_json::to_vec(notification).map_err(attendance_journal::JournalError::from)?;

    let mut hasher = Sha256::new();
    hasher.update(RECORD_DOMAIN_SEPARATOR);
    hasher.update(seq.to_le_bytes());
    if let Some(prev) = prev {
        hasher.update(prev.b64.as_bytes());
    }
    hasher.update([0u8]);
    hasher.update(&body);

    let b64 = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hasher.finalize());
    Ok(Digest {
        alg: DigestAlg::Sha256,
        b64,
    })
}

/// Position at the end of a verified chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainTip {
    /// Sequence number the next record must carry.
    pub next_seq: u64,
    /// Digest of the last accepted record.
    pub digest: Option<Digest>,
}

impl ChainTip {
    /// Checks that `record` extends this tip, then advances past it.
    pub fn accept(&mut self, record: &LedgerRecord) -> Result<(), StoreError> {
        let broken = |reason: String| StoreError::ChainBroken {
            seq: record.seq,
            reason,
        };

        if record.seq != self.next_seq {
            return Err(broken(format!(
                "expected sequence {}, found {}",
                self.next_seq, record.seq
            )));
        }
        if record.prev != self.digest {
            return Err(broken("back-link does not match previous digest".to_string()));
        }
        let computed = compute_digest(record.seq, record.prev.as_ref(), &record.notification)?;
        if computed != record.digest {
            return Err(broken(format!(
                "digest mismatch: computed {} but record has {}",
                computed.b64, record.digest.b64
            )));
        }

        self.advance(record);
        Ok(())
    }

    /// Builds the record that would extend this tip.
    pub fn next_record(&self, notification: Notification) -> Result<LedgerRecord, StoreError> {
        LedgerRecord::seal(self.next_seq, self.digest.clone(), notification)
    }

    /// Moves the tip past a record already known to be valid.
    pub fn advance(&mut self, record: &LedgerRecord) {
        self.next_seq = record.seq + 1;
        self.digest = Some(record.digest.clone());
    }
}
