use digest::Digest;
use num_bigint::BigUint;
use rand::RngCore;
use schnorr_group::{transcript, SchnorrGroup};
use serde::{Deserialize, Serialize};

use crate::keypair::KeyPair;

/// Schnorr signature in challenge-response form. The challenge binds the
/// group, the verification key, the ephemeral commitment and the message,
/// so a signature does not transfer between keys or messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub challenge: BigUint,
    pub response: BigUint,
}

impl Signature {
    pub fn new<R: RngCore, D: Digest>(
        rng: &mut R,
        message: &[u8],
        group: &SchnorrGroup,
        signing_key: &KeyPair,
    ) -> Self {
        let r = group.random_scalar(rng);
        let commitment = group.gpow(&r);
        let challenge = challenge::<D>(group, signing_key.public(), &commitment, message);
        let response = group.scalar_sub(&r, &group.scalar_mul(&challenge, signing_key.private()));
        Self {
            challenge,
            response,
        }
    }

    pub fn verify<D: Digest>(
        &self,
        message: &[u8],
        group: &SchnorrGroup,
        verification_key: &BigUint,
    ) -> bool {
        if group.check_element(verification_key).is_err()
            || group.check_scalar(&self.challenge).is_err()
            || group.check_scalar(&self.response).is_err()
        {
            return false;
        }
        let commitment = group.mul(
            &group.gpow(&self.response),
            &group.pow(verification_key, &self.challenge),
        );
        challenge::<D>(group, verification_key, &commitment, message) == self.challenge
    }
}

fn challenge<D: Digest>(
    group: &SchnorrGroup,
    verification_key: &BigUint,
    commitment: &BigUint,
    message: &[u8],
) -> BigUint {
    let mut bytes = Vec::new();
    transcript::append_bytes(&mut bytes, b"sig|");
    group.append_to_transcript(&mut bytes);
    transcript::append_scalar(&mut bytes, verification_key);
    transcript::append_scalar(&mut bytes, commitment);
    transcript::append_bytes(&mut bytes, message);
    group.hash_to_scalar::<D>(&bytes)
}
