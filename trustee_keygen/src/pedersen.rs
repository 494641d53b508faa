//! Polynomial generation and share distribution for Pedersen threshold key
//! generation. Each trustee samples a secret polynomial of degree `t`,
//! publishes Feldman commitments to its coefficients, and seals the share
//! `P_i(j)` to every peer `j` through an authenticated channel. The constant
//! term is the trustee's contribution to the joint secret.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use digest::Digest;
use num_bigint::BigUint;
use num_traits::Zero;
use rand::RngCore;
use schnorr_group::{transcript, SchnorrGroup};
use serde::{Deserialize, Serialize};

use crate::{
    bundle::ElectionBundle,
    channel::{ChannelMessage, SignedMessage, Transcribe},
    error::KeygenError,
    identity::{IdentityKeys, Seed},
    TrusteeId,
};

/// Public commitments `A[k] = g^{a[k]}` to a trustee's secret coefficients,
/// in coefficient order. `A[0]` commits to the trustee's contribution to
/// the joint secret.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coefexps {
    pub commitments: Vec<BigUint>,
}

impl Coefexps {
    pub fn constant_term(&self) -> Option<&BigUint> {
        self.commitments.first()
    }
}

impl Transcribe for Coefexps {
    fn transcribe(&self, out: &mut Vec<u8>) {
        transcript::append_bytes(out, b"coefexps|");
        transcript::append_scalars(out, &self.commitments);
    }
}

/// A trustee's published polynomial artifact. The coefficients themselves
/// never appear here in the clear: they are sealed to the trustee's own
/// encryption key (`channel_self`) so only commitments and ciphertexts
/// reach the bulletin board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polynomial {
    pub trustee_id: TrusteeId,
    /// Coefficients sealed to the trustee's own `ek` for self-verification
    pub channel_self: ChannelMessage,
    /// Share `P_i(j)` sealed to peer `j`'s `ek`, in peer-index order
    pub shares: Vec<ChannelMessage>,
    pub coefexps: SignedMessage<Coefexps>,
}

impl Polynomial {
    /// Samples a fresh degree-`threshold` polynomial and distributes its
    /// shares to every certified peer, including the trustee itself.
    ///
    /// `threshold` must agree with the trustee set's configured threshold,
    /// and `threshold + 1` reconstructing parties must actually exist.
    pub fn generate<R: RngCore, D: Digest>(
        rng: &mut R,
        bundle: &ElectionBundle,
        threshold: usize,
        seed: &Seed,
        trustee_id: TrusteeId,
    ) -> Result<Self, KeygenError> {
        let group = bundle.group();
        let identity = IdentityKeys::derive::<D>(seed, group);
        let model = bundle.pedersen().ok_or(KeygenError::NoPedersenTrustees)?;
        let cert = model
            .cert(trustee_id)
            .ok_or(KeygenError::TrusteeIdNotFound(trustee_id))?;
        if &cert.verification_key != identity.verification_key()
            || &cert.encryption_key != identity.encryption_key()
        {
            // Seed does not re-derive the certified identity
            return Err(KeygenError::InconsistentTrusteePublicKey);
        }
        if model.threshold() != threshold || threshold + 1 > model.total() {
            return Err(KeygenError::ThresholdMismatch);
        }

        let mut coefficients: Vec<BigUint> =
            (0..=threshold).map(|_| group.random_scalar(rng)).collect();
        let commitments: Vec<BigUint> =
            iter!(coefficients).map(|a| group.gpow(a)).collect();

        let mut shares = Vec::with_capacity(model.total());
        for (at, member) in model.members().iter().enumerate() {
            let share = evaluate(group, &coefficients, at + 1);
            let sealed = ChannelMessage::seal::<R, D>(
                rng,
                group,
                &encode_share(&share),
                identity.signing_key(),
                &member.cert.payload.encryption_key,
            )?;
            shares.push(sealed);
        }

        let channel_self = ChannelMessage::seal::<R, D>(
            rng,
            group,
            &encode_coefficients(&coefficients),
            identity.signing_key(),
            identity.encryption_key(),
        )?;
        for a in coefficients.iter_mut() {
            *a = BigUint::zero();
        }

        let coefexps = SignedMessage::sign::<R, D>(
            rng,
            group,
            Coefexps { commitments },
            identity.signing_key(),
        );
        Ok(Self {
            trustee_id,
            channel_self,
            shares,
            coefexps,
        })
    }
}

/// `P(x) mod q` by Horner's rule for a small integer evaluation point.
pub(crate) fn evaluate(group: &SchnorrGroup, coefficients: &[BigUint], x: usize) -> BigUint {
    let point = BigUint::from(x);
    let mut acc = BigUint::zero();
    for a in coefficients.iter().rev() {
        acc = group.scalar_add(&group.scalar_mul(&acc, &point), a);
    }
    acc
}

pub(crate) fn encode_share(share: &BigUint) -> Vec<u8> {
    let mut out = Vec::new();
    transcript::append_bytes(&mut out, b"share|");
    transcript::append_scalar(&mut out, share);
    out
}

pub(crate) fn decode_share(bytes: &[u8]) -> Result<BigUint, KeygenError> {
    let mut at = 0;
    match transcript::read_scalar(bytes, &mut at) {
        Some(tag) if tag == BigUint::from_bytes_be(b"share|") => {}
        _ => return Err(KeygenError::MalformedPayload),
    }
    let share = transcript::read_scalar(bytes, &mut at).ok_or(KeygenError::MalformedPayload)?;
    if at != bytes.len() {
        return Err(KeygenError::MalformedPayload);
    }
    Ok(share)
}

pub(crate) fn encode_coefficients(coefficients: &[BigUint]) -> Vec<u8> {
    let mut out = Vec::new();
    transcript::append_bytes(&mut out, b"coefficients|");
    transcript::append_scalars(&mut out, coefficients);
    out
}

pub(crate) fn decode_coefficients(bytes: &[u8]) -> Result<Vec<BigUint>, KeygenError> {
    let mut at = 0;
    match transcript::read_scalar(bytes, &mut at) {
        Some(tag) if tag == BigUint::from_bytes_be(b"coefficients|") => {}
        _ => return Err(KeygenError::MalformedPayload),
    }
    let coefficients =
        transcript::read_scalars(bytes, &mut at).ok_or(KeygenError::MalformedPayload)?;
    if at != bytes.len() {
        return Err(KeygenError::MalformedPayload);
    }
    Ok(coefficients)
}
