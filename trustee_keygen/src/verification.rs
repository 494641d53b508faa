//! Share verification (Feldman check) against published commitments, and
//! combination of verified shares into a trustee's additive key share.
//!
//! The types enforce the protocol order: [`VerifiedShares`] can only be
//! obtained from [`VInput::verify_shares`], so a trustee cannot combine
//! shares that were never checked.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use digest::Digest;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::RngCore;
use schnorr_group::SchnorrGroup;
use schnorr_proofs::{KeyPair, ProofOfKnowledge};
use serde::{Deserialize, Serialize};

use crate::{
    bundle::ElectionBundle,
    channel::{ChannelMessage, SignedMessage},
    error::KeygenError,
    identity::{IdentityKeys, Seed},
    pedersen::{self, Coefexps},
    single::TrusteePublicKey,
    TrusteeId,
};

/// One sender's contribution to a recipient: the sealed share addressed to
/// the recipient and the sender's signed commitments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderInput {
    pub sender_id: TrusteeId,
    pub verification_key: BigUint,
    pub share: ChannelMessage,
    pub coefexps: SignedMessage<Coefexps>,
}

/// Everything recipient `j` needs to verify and combine: one entry per
/// sender (the recipient included) plus the recipient's own sealed
/// coefficients. Built from public bulletin-board state and used only
/// transiently.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VInput {
    recipient_id: TrusteeId,
    recipient_index: usize,
    threshold: usize,
    channel_self: ChannelMessage,
    senders: Vec<SenderInput>,
}

impl VInput {
    /// Collects the shares addressed to `trustee_id` from every published
    /// polynomial. Every certified peer must have published one first.
    pub fn build(bundle: &ElectionBundle, trustee_id: TrusteeId) -> Result<Self, KeygenError> {
        let model = bundle.pedersen().ok_or(KeygenError::NoPedersenTrustees)?;
        let recipient_index = model
            .peer_index(trustee_id)
            .ok_or(KeygenError::TrusteeIdNotFound(trustee_id))?;
        let own = bundle
            .polynomial(trustee_id)
            .ok_or(KeygenError::MissingPolynomial(trustee_id))?;

        let mut senders = Vec::with_capacity(model.total());
        for member in model.members() {
            let polynomial = bundle
                .polynomial(member.trustee_id)
                .ok_or(KeygenError::MissingPolynomial(member.trustee_id))?;
            let share = polynomial
                .shares
                .get(recipient_index - 1)
                .ok_or(KeygenError::ThresholdMismatch)?
                .clone();
            senders.push(SenderInput {
                sender_id: member.trustee_id,
                verification_key: member.cert.payload.verification_key.clone(),
                share,
                coefexps: polynomial.coefexps.clone(),
            });
        }
        Ok(Self {
            recipient_id: trustee_id,
            recipient_index,
            threshold: model.threshold(),
            channel_self: own.channel_self.clone(),
            senders,
        })
    }

    pub fn recipient_id(&self) -> TrusteeId {
        self.recipient_id
    }

    /// Opens and checks every sender's share, then re-checks the trustee's
    /// own sealed coefficients against its published commitments. Any
    /// failure aborts the run; there is no partial result.
    pub fn verify_shares<D: Digest>(
        &self,
        group: &SchnorrGroup,
        seed: &Seed,
    ) -> Result<VerifiedShares, KeygenError> {
        let identity = IdentityKeys::derive::<D>(seed, group);
        let own = self
            .senders
            .iter()
            .find(|s| s.sender_id == self.recipient_id)
            .ok_or(KeygenError::TrusteeIdNotFound(self.recipient_id))?;
        if identity.verification_key() != &own.verification_key {
            // Seed does not re-derive the certified identity; opening shares
            // with the wrong keys would misattribute the failure to a sender
            return Err(KeygenError::InconsistentTrusteePublicKey);
        }
        let shares = iter!(self.senders)
            .map(|sender| self.checked_share::<D>(group, &identity, sender))
            .collect::<Result<Vec<BigUint>, KeygenError>>()?;

        let opened = self.channel_self.open::<D>(
            group,
            identity.verification_key(),
            identity.decryption_key(),
        )?;
        let coefficients = pedersen::decode_coefficients(&opened)?;
        let recommitted: Vec<BigUint> = coefficients.iter().map(|a| group.gpow(a)).collect();
        if recommitted != own.coefexps.payload.commitments {
            return Err(KeygenError::ShareVerificationFailed {
                sender: self.recipient_id,
            });
        }
        Ok(VerifiedShares {
            recipient_id: self.recipient_id,
            shares,
        })
    }

    fn checked_share<D: Digest>(
        &self,
        group: &SchnorrGroup,
        identity: &IdentityKeys,
        sender: &SenderInput,
    ) -> Result<BigUint, KeygenError> {
        self.open_and_check::<D>(group, identity, sender)
            .map_err(|e| match e {
                KeygenError::ThresholdMismatch => KeygenError::ThresholdMismatch,
                KeygenError::ShareVerificationFailed { sender } => {
                    KeygenError::ShareVerificationFailed { sender }
                }
                // Signature, decryption and decoding failures all implicate
                // this sender's share
                _ => KeygenError::ShareVerificationFailed {
                    sender: sender.sender_id,
                },
            })
    }

    fn open_and_check<D: Digest>(
        &self,
        group: &SchnorrGroup,
        identity: &IdentityKeys,
        sender: &SenderInput,
    ) -> Result<BigUint, KeygenError> {
        sender.coefexps.verify::<D>(group, &sender.verification_key)?;
        if sender.coefexps.payload.commitments.len() != self.threshold + 1 {
            return Err(KeygenError::ThresholdMismatch);
        }
        let opened =
            sender
                .share
                .open::<D>(group, &sender.verification_key, identity.decryption_key())?;
        let share = pedersen::decode_share(&opened)?;
        let expected = expected_commitment(group, &sender.coefexps.payload, self.recipient_index);
        if group.gpow(&share) != expected {
            return Err(KeygenError::ShareVerificationFailed {
                sender: sender.sender_id,
            });
        }
        Ok(share)
    }
}

/// `prod_k A[k]^{j^k} mod p`, the public value `g^{P(j)}` implied by the
/// commitments.
pub(crate) fn expected_commitment(
    group: &SchnorrGroup,
    coefexps: &Coefexps,
    j: usize,
) -> BigUint {
    let point = BigUint::from(j);
    let mut acc = BigUint::one();
    let mut power = BigUint::one();
    for commitment in &coefexps.commitments {
        acc = group.mul(&acc, &group.pow(commitment, &power));
        power = group.scalar_mul(&power, &point);
    }
    acc
}

/// Shares that passed every check, ready for combination. Holds secret
/// material; wiped on drop, never serialized.
pub struct VerifiedShares {
    recipient_id: TrusteeId,
    shares: Vec<BigUint>,
}

impl VerifiedShares {
    pub fn recipient_id(&self) -> TrusteeId {
        self.recipient_id
    }

    /// Sums the verified shares into this trustee's additive share of the
    /// joint secret, proves knowledge of it, and seals it to the trustee's
    /// own encryption key. The joint private key is never assembled here;
    /// reconstruction belongs to the decryption stage.
    pub fn combine<R: RngCore, D: Digest>(
        &self,
        rng: &mut R,
        group: &SchnorrGroup,
        seed: &Seed,
    ) -> Result<VOutput, KeygenError> {
        let identity = IdentityKeys::derive::<D>(seed, group);
        let mut sum = BigUint::zero();
        for share in &self.shares {
            sum = group.scalar_add(&sum, share);
        }
        let keypair = KeyPair::from_private(group, sum)?;
        let pok = ProofOfKnowledge::prove::<R, D>(rng, group, &keypair);
        let private_key_share = ChannelMessage::seal::<R, D>(
            rng,
            group,
            &pedersen::encode_share(keypair.private()),
            identity.signing_key(),
            identity.encryption_key(),
        )?;
        Ok(VOutput {
            private_key_share,
            trustee_public_key: TrusteePublicKey {
                public_key: keypair.public().clone(),
                pok,
            },
        })
    }
}

impl Drop for VerifiedShares {
    fn drop(&mut self) {
        for share in self.shares.iter_mut() {
            *share = BigUint::zero();
        }
    }
}

/// The final per-trustee artifact. `private_key_share` is the only copy of
/// the trustee's share of the joint private key, sealed to the trustee's
/// own `ek`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VOutput {
    pub private_key_share: ChannelMessage,
    pub trustee_public_key: TrusteePublicKey,
}

/// Server-side check of a published [`VOutput`]: the proof of knowledge
/// must hold and the public key must equal the value implied by every
/// sender's commitments at this trustee's evaluation point.
pub fn verify_voutput<D: Digest>(
    bundle: &ElectionBundle,
    trustee_id: TrusteeId,
    voutput: &VOutput,
) -> Result<(), KeygenError> {
    let group = bundle.group();
    let model = bundle.pedersen().ok_or(KeygenError::NoPedersenTrustees)?;
    let j = model
        .peer_index(trustee_id)
        .ok_or(KeygenError::TrusteeIdNotFound(trustee_id))?;
    if !voutput.trustee_public_key.verify::<D>(group) {
        return Err(KeygenError::InvalidProofOfKnowledge);
    }
    let mut expected = BigUint::one();
    for member in model.members() {
        let polynomial = bundle
            .polynomial(member.trustee_id)
            .ok_or(KeygenError::MissingPolynomial(member.trustee_id))?;
        expected = group.mul(
            &expected,
            &expected_commitment(group, &polynomial.coefexps.payload, j),
        );
    }
    if voutput.trustee_public_key.public_key != expected {
        return Err(KeygenError::InconsistentTrusteePublicKey);
    }
    Ok(())
}
