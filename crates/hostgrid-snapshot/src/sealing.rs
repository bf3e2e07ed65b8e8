//! Versioned sealing keys and the sealed-key wrap/unwrap operations.
//!
//! A snapshot's content key is sealed (asymmetrically encrypted) to the
//! platform's sealing key so it can be stored without exposing raw key
//! material. Sealing uses an ephemeral x25519 agreement with a
//! ChaCha20-Poly1305 wrap: the payload is `ephemeral public key ‖ nonce ‖
//! ciphertext`. Only the holder of the matching private key can open it.

use std::collections::BTreeMap;

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

use crate::error::{SnapshotError, SnapshotResult};

const PUBLIC_KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// A content key sealed to one version of the platform sealing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedSnapshotKey {
    #[serde(with = "hex::serde")]
    payload: Vec<u8>,
    sealing_key_version: u32,
}

impl SealedSnapshotKey {
    pub fn sealing_key_version(&self) -> u32 {
        self.sealing_key_version
    }
}

/// The platform's sealing keys, all versions retained.
///
/// Rotation mints a new current version; historical private material
/// stays available so snapshots sealed under older versions remain
/// resealable.
pub struct SealingKeys {
    keys: BTreeMap<u32, StaticSecret>,
}

impl SealingKeys {
    /// A fresh key ring starting at version 1.
    pub fn generate() -> Self {
        let mut keys = BTreeMap::new();
        keys.insert(1, StaticSecret::random_from_rng(OsRng));
        Self { keys }
    }

    /// The newest version; used to seal new snapshots.
    pub fn current_version(&self) -> u32 {
        self.keys
            .last_key_value()
            .map(|(version, _)| *version)
            .unwrap_or(0)
    }

    /// Mint the next key version and make it current. Existing versions
    /// are retained.
    pub fn rotate(&mut self) -> u32 {
        let next = self.current_version() + 1;
        self.keys.insert(next, StaticSecret::random_from_rng(OsRng));
        info!(version = next, "sealing key rotated");
        next
    }

    /// Public half of the given key version.
    pub fn public_key(&self, version: u32) -> Option<PublicKey> {
        self.keys.get(&version).map(PublicKey::from)
    }

    /// Seal `content_key` to the given sealing key version.
    pub fn seal(&self, content_key: &[u8], version: u32) -> SnapshotResult<SealedSnapshotKey> {
        let recipient = self
            .public_key(version)
            .ok_or(SnapshotError::MissingKeyMaterial(version))?;
        Ok(SealedSnapshotKey {
            payload: seal_for(content_key, &recipient)?,
            sealing_key_version: version,
        })
    }

    /// Re-seal a snapshot's content key for `receiver` without exposing
    /// the raw key outside this call.
    ///
    /// Works for any version this ring has material for, regardless of
    /// which version is current.
    pub fn reseal(
        &self,
        sealed: &SealedSnapshotKey,
        receiver: &PublicKey,
    ) -> SnapshotResult<Vec<u8>> {
        let secret = self
            .keys
            .get(&sealed.sealing_key_version)
            .ok_or(SnapshotError::MissingKeyMaterial(sealed.sealing_key_version))?;
        let content_key = open_with(&sealed.payload, secret)?;
        seal_for(&content_key, receiver)
    }
}

/// Seal `plain` to `recipient`: ephemeral DH, then an AEAD wrap.
fn seal_for(plain: &[u8], recipient: &PublicKey) -> SnapshotResult<Vec<u8>> {
    let ephemeral = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_public = PublicKey::from(&ephemeral);
    let shared = ephemeral.diffie_hellman(recipient);
    let key = wrap_key(&ephemeral_public, recipient, shared.as_bytes());

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plain)
        .map_err(|e| SnapshotError::Seal(e.to_string()))?;

    let mut payload = Vec::with_capacity(PUBLIC_KEY_LEN + NONCE_LEN + ciphertext.len());
    payload.extend_from_slice(ephemeral_public.as_bytes());
    payload.extend_from_slice(&nonce);
    payload.extend_from_slice(&ciphertext);
    Ok(payload)
}

/// Open a sealed payload with the recipient's private key. This is the
/// receiver side of [`SealingKeys::reseal`].
pub fn open_with(payload: &[u8], secret: &StaticSecret) -> SnapshotResult<Vec<u8>> {
    if payload.len() < PUBLIC_KEY_LEN + NONCE_LEN {
        return Err(SnapshotError::Seal("sealed payload too short".to_string()));
    }
    let mut ephemeral_public = [0u8; PUBLIC_KEY_LEN];
    ephemeral_public.copy_from_slice(&payload[..PUBLIC_KEY_LEN]);
    let ephemeral_public = PublicKey::from(ephemeral_public);
    let nonce = &payload[PUBLIC_KEY_LEN..PUBLIC_KEY_LEN + NONCE_LEN];
    let ciphertext = &payload[PUBLIC_KEY_LEN + NONCE_LEN..];

    let shared = secret.diffie_hellman(&ephemeral_public);
    let key = wrap_key(&ephemeral_public, &PublicKey::from(secret), shared.as_bytes());

    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|e| SnapshotError::Seal(e.to_string()))
}

/// Derive the AEAD key from the agreement, binding both public keys.
fn wrap_key(ephemeral: &PublicKey, recipient: &PublicKey, shared: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(ephemeral.as_bytes());
    hasher.update(recipient.as_bytes());
    hasher.update(shared);
    hasher.finalize().into()
}
