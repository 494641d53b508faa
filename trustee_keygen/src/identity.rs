use digest::Digest;
use num_bigint::BigUint;
use rand::RngCore;
use schnorr_group::{transcript, SchnorrGroup};
use schnorr_proofs::KeyPair;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::channel::{SignedMessage, Transcribe};

/// High-entropy trustee secret, the only thing a trustee must retain between
/// protocol steps. Wiped on drop and never printed or serialized.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed(Vec<u8>);

impl Seed {
    pub fn random<R: RngCore>(rng: &mut R) -> Self {
        let mut bytes = vec![0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Seed {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

/// A trustee's long-term signing and decryption keypairs, both re-derivable
/// from the seed. `vk = g^sk` authenticates the trustee's messages, `ek =
/// g^dk` receives sealed channel payloads.
pub struct IdentityKeys {
    signing: KeyPair,
    decryption: KeyPair,
}

impl IdentityKeys {
    /// Deterministic derivation: the same seed always re-derives the same
    /// keys. The two domain prefixes keep `sk` and `dk` independent.
    pub fn derive<D: Digest>(seed: &Seed, group: &SchnorrGroup) -> Self {
        Self {
            signing: KeyPair::from_seed::<D>(group, b"sk|", seed.as_bytes()),
            decryption: KeyPair::from_seed::<D>(group, b"vk|", seed.as_bytes()),
        }
    }

    pub fn signing_key(&self) -> &KeyPair {
        &self.signing
    }

    pub fn decryption_key(&self) -> &KeyPair {
        &self.decryption
    }

    pub fn verification_key(&self) -> &BigUint {
        self.signing.public()
    }

    pub fn encryption_key(&self) -> &BigUint {
        self.decryption.public()
    }

    /// Self-signed statement of the trustee's public keys, published before
    /// the threshold protocol starts.
    pub fn certificate<R: RngCore, D: Digest>(
        &self,
        rng: &mut R,
        group: &SchnorrGroup,
    ) -> SignedMessage<CertPayload> {
        let payload = CertPayload {
            verification_key: self.verification_key().clone(),
            encryption_key: self.encryption_key().clone(),
        };
        SignedMessage::sign::<R, D>(rng, group, payload, &self.signing)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertPayload {
    pub verification_key: BigUint,
    pub encryption_key: BigUint,
}

impl Transcribe for CertPayload {
    fn transcribe(&self, out: &mut Vec<u8>) {
        transcript::append_bytes(out, b"cert|");
        transcript::append_scalar(out, &self.verification_key);
        transcript::append_scalar(out, &self.encryption_key);
    }
}
