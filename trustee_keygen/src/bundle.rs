//! The election bundle: the public, append-only record of trustee setup.
//! Everything in it comes from the bulletin board and is verified before
//! being admitted, so the bundle only ever holds checked artifacts.

use digest::Digest;
use schnorr_group::SchnorrGroup;
use serde::{Deserialize, Serialize};

use crate::{
    channel::SignedMessage,
    error::KeygenError,
    identity::CertPayload,
    pedersen::Polynomial,
    single::TrusteePublicKey,
    TrusteeId,
};

/// One trustee holding a complete key on its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleTrusteeModel {
    pub trustee_id: TrusteeId,
    pub key: TrusteePublicKey,
}

/// A certified member of the Pedersen trustee set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedersenMember {
    pub trustee_id: TrusteeId,
    pub cert: SignedMessage<CertPayload>,
}

/// The set of trustees running threshold key generation together. Member
/// order is submission order and fixes the peer index used as the share
/// evaluation point, so it must never be reordered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedersenTrusteeModel {
    threshold: usize,
    members: Vec<PedersenMember>,
}

impl PedersenTrusteeModel {
    /// Degree of each trustee's polynomial; `threshold + 1` shares suffice
    /// to reconstruct.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn total(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &[PedersenMember] {
        &self.members
    }

    /// 1-based submission index, the evaluation point for this trustee's
    /// shares.
    pub fn peer_index(&self, trustee_id: TrusteeId) -> Option<usize> {
        self.members
            .iter()
            .position(|m| m.trustee_id == trustee_id)
            .map(|at| at + 1)
    }

    pub fn cert(&self, trustee_id: TrusteeId) -> Option<&CertPayload> {
        self.members
            .iter()
            .find(|m| m.trustee_id == trustee_id)
            .map(|m| &m.cert.payload)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrusteeKind {
    Single(SingleTrusteeModel),
    Pedersen(PedersenTrusteeModel),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionBundle {
    group: SchnorrGroup,
    trustee_kinds: Vec<TrusteeKind>,
    pub(crate) polynomials: Vec<Polynomial>,
}

impl ElectionBundle {
    pub fn new(group: SchnorrGroup) -> Self {
        Self {
            group,
            trustee_kinds: Vec::new(),
            polynomials: Vec::new(),
        }
    }

    pub fn group(&self) -> &SchnorrGroup {
        &self.group
    }

    pub fn trustee_kinds(&self) -> &[TrusteeKind] {
        &self.trustee_kinds
    }

    pub fn polynomials(&self) -> &[Polynomial] {
        &self.polynomials
    }

    pub fn contains_trustee(&self, trustee_id: TrusteeId) -> bool {
        self.trustee_kinds.iter().any(|kind| match kind {
            TrusteeKind::Single(single) => single.trustee_id == trustee_id,
            TrusteeKind::Pedersen(model) => model.peer_index(trustee_id).is_some(),
        })
    }

    pub fn pedersen(&self) -> Option<&PedersenTrusteeModel> {
        self.trustee_kinds.iter().find_map(|kind| match kind {
            TrusteeKind::Single(_) => None,
            TrusteeKind::Pedersen(model) => Some(model),
        })
    }

    fn pedersen_mut(&mut self) -> Option<&mut PedersenTrusteeModel> {
        self.trustee_kinds.iter_mut().find_map(|kind| match kind {
            TrusteeKind::Single(_) => None,
            TrusteeKind::Pedersen(model) => Some(model),
        })
    }

    pub fn polynomial(&self, trustee_id: TrusteeId) -> Option<&Polynomial> {
        self.polynomials
            .iter()
            .find(|p| p.trustee_id == trustee_id)
    }

    /// Admits a non-threshold trustee key after checking its proof of
    /// knowledge.
    pub fn import_single_trustee<D: Digest>(
        &mut self,
        trustee_id: TrusteeId,
        key: TrusteePublicKey,
    ) -> Result<(), KeygenError> {
        if self.contains_trustee(trustee_id) {
            return Err(KeygenError::DuplicateTrusteeId(trustee_id));
        }
        if !key.verify::<D>(&self.group) {
            return Err(KeygenError::InvalidProofOfKnowledge);
        }
        self.trustee_kinds
            .push(TrusteeKind::Single(SingleTrusteeModel { trustee_id, key }));
        Ok(())
    }

    /// Admits a Pedersen trustee's self-signed certificate. The first
    /// certificate fixes the threshold; later ones must agree with it.
    pub fn import_certificate<D: Digest>(
        &mut self,
        threshold: usize,
        trustee_id: TrusteeId,
        cert: SignedMessage<CertPayload>,
    ) -> Result<(), KeygenError> {
        if self.contains_trustee(trustee_id) {
            return Err(KeygenError::DuplicateTrusteeId(trustee_id));
        }
        self.group.check_element(&cert.payload.verification_key)?;
        self.group.check_element(&cert.payload.encryption_key)?;
        cert.verify::<D>(&self.group, &cert.payload.verification_key)?;

        let member = PedersenMember { trustee_id, cert };
        match self.pedersen_mut() {
            Some(model) => {
                if model.threshold != threshold {
                    return Err(KeygenError::ThresholdMismatch);
                }
                model.members.push(member);
            }
            None => {
                self.trustee_kinds.push(TrusteeKind::Pedersen(
                    PedersenTrusteeModel {
                        threshold,
                        members: vec![member],
                    },
                ));
            }
        }
        Ok(())
    }

    /// Appends a trustee's polynomial after checking it at the boundary:
    /// the commitments must carry the certified trustee's signature and
    /// the share/commitment counts must fit the model. Single writer per
    /// trustee id: a second polynomial under the same id is rejected,
    /// never overwritten.
    pub fn publish_polynomial<D: Digest>(
        &mut self,
        polynomial: Polynomial,
    ) -> Result<(), KeygenError> {
        let model = self.pedersen().ok_or(KeygenError::NoPedersenTrustees)?;
        let cert = model
            .cert(polynomial.trustee_id)
            .ok_or(KeygenError::TrusteeIdNotFound(polynomial.trustee_id))?;
        if self.polynomial(polynomial.trustee_id).is_some() {
            return Err(KeygenError::DuplicatePolynomial(polynomial.trustee_id));
        }
        polynomial
            .coefexps
            .verify::<D>(&self.group, &cert.verification_key)?;
        if polynomial.shares.len() != model.total()
            || polynomial.coefexps.payload.commitments.len() != model.threshold() + 1
        {
            return Err(KeygenError::ThresholdMismatch);
        }
        self.polynomials.push(polynomial);
        Ok(())
    }
}
