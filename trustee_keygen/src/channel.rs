//! Authenticated messaging primitives layered over the bulletin board:
//! signed public payloads and sealed (encrypted then signed) point-to-point
//! payloads. Sealing is hybrid: an ephemeral Diffie-Hellman exchange against
//! the recipient's encryption key feeds HKDF-SHA256, and the derived key
//! encrypts the payload with XChaCha20-Poly1305.

use aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use digest::Digest;
use hkdf::Hkdf;
use num_bigint::BigUint;
use rand::RngCore;
use schnorr_group::{transcript, SchnorrGroup};
use schnorr_proofs::{KeyPair, Signature};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::KeygenError;

/// Canonical byte encoding of a payload for signing.
pub trait Transcribe {
    fn transcribe(&self, out: &mut Vec<u8>);
}

/// A public payload with a signature verifiable under the sender's `vk`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage<T> {
    pub payload: T,
    pub signature: Signature,
}

impl<T: Transcribe> SignedMessage<T> {
    pub fn sign<R: RngCore, D: Digest>(
        rng: &mut R,
        group: &SchnorrGroup,
        payload: T,
        signing_key: &KeyPair,
    ) -> Self {
        let mut bytes = Vec::new();
        payload.transcribe(&mut bytes);
        let signature = Signature::new::<R, D>(rng, &bytes, group, signing_key);
        Self { payload, signature }
    }

    /// Fails closed: a payload whose signature does not verify must never
    /// be used.
    pub fn verify<D: Digest>(
        &self,
        group: &SchnorrGroup,
        verification_key: &BigUint,
    ) -> Result<(), KeygenError> {
        let mut bytes = Vec::new();
        self.payload.transcribe(&mut bytes);
        if self.signature.verify::<D>(&bytes, group, verification_key) {
            Ok(())
        } else {
            Err(KeygenError::SignatureInvalid)
        }
    }
}

/// A payload encrypted to one recipient and signed by the sender. Only the
/// holder of the decryption key matching `recipient_ek` can open it; anyone
/// holding the sender's `vk` can check authenticity without opening.
/// Immutable once created; stored on the bulletin board in this form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub sender_vk: BigUint,
    pub recipient_ek: BigUint,
    pub ephemeral_key: BigUint,
    pub nonce: [u8; 24],
    pub ciphertext: Vec<u8>,
    pub signature: Signature,
}

impl ChannelMessage {
    pub fn seal<R: RngCore, D: Digest>(
        rng: &mut R,
        group: &SchnorrGroup,
        payload: &[u8],
        signing_key: &KeyPair,
        recipient_ek: &BigUint,
    ) -> Result<Self, KeygenError> {
        group.check_element(recipient_ek)?;
        let eph = group.random_scalar(rng);
        let ephemeral_key = group.gpow(&eph);
        let shared = group.pow(recipient_ek, &eph);

        let mut key = derive_key(&ephemeral_key, &shared, recipient_ek)?;
        let mut nonce = [0u8; 24];
        rng.fill_bytes(&mut nonce);
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&key));
        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), payload)
            .map_err(|_| KeygenError::SymmetricCipher)?;
        key.zeroize();

        let bytes = channel_bytes(recipient_ek, &ephemeral_key, &nonce, &ciphertext);
        let signature = Signature::new::<R, D>(rng, &bytes, group, signing_key);
        Ok(Self {
            sender_vk: signing_key.public().clone(),
            recipient_ek: recipient_ek.clone(),
            ephemeral_key,
            nonce,
            ciphertext,
            signature,
        })
    }

    /// Signature is checked before any decryption is attempted, against the
    /// caller-supplied `vk` rather than the embedded one.
    pub fn open<D: Digest>(
        &self,
        group: &SchnorrGroup,
        sender_vk: &BigUint,
        decryption_key: &KeyPair,
    ) -> Result<Vec<u8>, KeygenError> {
        let bytes = channel_bytes(
            &self.recipient_ek,
            &self.ephemeral_key,
            &self.nonce,
            &self.ciphertext,
        );
        if !self.signature.verify::<D>(&bytes, group, sender_vk) {
            return Err(KeygenError::SignatureInvalid);
        }
        group.check_element(&self.ephemeral_key)?;
        let shared = group.pow(&self.ephemeral_key, decryption_key.private());

        let mut key = derive_key(&self.ephemeral_key, &shared, &self.recipient_ek)?;
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&key));
        let payload = cipher
            .decrypt(XNonce::from_slice(&self.nonce), self.ciphertext.as_slice())
            .map_err(|_| KeygenError::DecryptionFailed);
        key.zeroize();
        payload
    }
}

fn channel_bytes(
    recipient_ek: &BigUint,
    ephemeral_key: &BigUint,
    nonce: &[u8; 24],
    ciphertext: &[u8],
) -> Vec<u8> {
    let mut out = Vec::new();
    transcript::append_bytes(&mut out, b"channel|");
    transcript::append_scalar(&mut out, recipient_ek);
    transcript::append_scalar(&mut out, ephemeral_key);
    transcript::append_bytes(&mut out, nonce);
    transcript::append_bytes(&mut out, ciphertext);
    out
}

fn derive_key(
    ephemeral_key: &BigUint,
    shared: &BigUint,
    recipient_ek: &BigUint,
) -> Result<[u8; 32], KeygenError> {
    let mut ikm = Vec::new();
    transcript::append_scalar(&mut ikm, ephemeral_key);
    transcript::append_scalar(&mut ikm, shared);
    transcript::append_scalar(&mut ikm, recipient_ek);
    let hk = Hkdf::<Sha256>::new(Some(b"channel|"), &ikm);
    let mut key = [0u8; 32];
    let expanded = hk.expand(b"", &mut key);
    ikm.zeroize();
    expanded.map_err(|_| KeygenError::SymmetricCipher)?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{IdentityKeys, Seed};
    use rand::{rngs::StdRng, SeedableRng};
    use sha2::Sha256;

    fn group() -> SchnorrGroup {
        SchnorrGroup::named("BELENIOS-2048").unwrap()
    }

    fn identities(group: &SchnorrGroup) -> (IdentityKeys, IdentityKeys) {
        let mut rng = StdRng::seed_from_u64(7u64);
        (
            IdentityKeys::derive::<Sha256>(&Seed::random(&mut rng), group),
            IdentityKeys::derive::<Sha256>(&Seed::random(&mut rng), group),
        )
    }

    #[test]
    fn seal_open_round_trip() {
        let group = group();
        let (alice, bob) = identities(&group);
        let mut rng = StdRng::seed_from_u64(0u64);
        let msg = ChannelMessage::seal::<_, Sha256>(
            &mut rng,
            &group,
            b"the share",
            alice.signing_key(),
            bob.encryption_key(),
        )
        .unwrap();
        assert_eq!(msg.sender_vk, *alice.verification_key());
        let payload = msg
            .open::<Sha256>(&group, alice.verification_key(), bob.decryption_key())
            .unwrap();
        assert_eq!(payload, b"the share");
    }

    #[test]
    fn wrong_verification_key_fails_before_decryption() {
        let group = group();
        let (alice, bob) = identities(&group);
        let mut rng = StdRng::seed_from_u64(0u64);
        let msg = ChannelMessage::seal::<_, Sha256>(
            &mut rng,
            &group,
            b"the share",
            alice.signing_key(),
            bob.encryption_key(),
        )
        .unwrap();
        assert_eq!(
            msg.open::<Sha256>(&group, bob.verification_key(), bob.decryption_key()),
            Err(KeygenError::SignatureInvalid)
        );
    }

    #[test]
    fn wrong_decryption_key_fails() {
        let group = group();
        let (alice, bob) = identities(&group);
        let mut rng = StdRng::seed_from_u64(0u64);
        let msg = ChannelMessage::seal::<_, Sha256>(
            &mut rng,
            &group,
            b"the share",
            alice.signing_key(),
            bob.encryption_key(),
        )
        .unwrap();
        assert_eq!(
            msg.open::<Sha256>(&group, alice.verification_key(), alice.decryption_key()),
            Err(KeygenError::DecryptionFailed)
        );
    }

    #[test]
    fn corrupted_ciphertext_is_rejected() {
        let group = group();
        let (alice, bob) = identities(&group);
        let mut rng = StdRng::seed_from_u64(0u64);
        let mut msg = ChannelMessage::seal::<_, Sha256>(
            &mut rng,
            &group,
            b"the share",
            alice.signing_key(),
            bob.encryption_key(),
        )
        .unwrap();
        msg.ciphertext[0] ^= 1;
        // The signature covers the ciphertext, so tampering trips it first
        assert_eq!(
            msg.open::<Sha256>(&group, alice.verification_key(), bob.decryption_key()),
            Err(KeygenError::SignatureInvalid)
        );
    }

    #[test]
    fn seal_rejects_non_group_recipient_key() {
        let group = group();
        let (alice, _) = identities(&group);
        let mut rng = StdRng::seed_from_u64(0u64);
        // p - 1 has order 2, not q
        let res = ChannelMessage::seal::<_, Sha256>(
            &mut rng,
            &group,
            b"the share",
            alice.signing_key(),
            &(group.p() - 1u32),
        );
        assert!(matches!(res, Err(KeygenError::Group(_))));
    }

    #[test]
    fn serde_round_trip() {
        let group = group();
        let (alice, bob) = identities(&group);
        let mut rng = StdRng::seed_from_u64(0u64);
        let msg = ChannelMessage::seal::<_, Sha256>(
            &mut rng,
            &group,
            b"the share",
            alice.signing_key(),
            bob.encryption_key(),
        )
        .unwrap();
        let json = serde_json::to_string(&msg).unwrap();
        let back: ChannelMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
        let payload = back
            .open::<Sha256>(&group, alice.verification_key(), bob.decryption_key())
            .unwrap();
        assert_eq!(payload, b"the share");
    }
}
