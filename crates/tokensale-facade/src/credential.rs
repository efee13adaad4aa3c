//! Claim gates.
//!
//! A [`ClaimGate`] is a pure predicate run before every claim. It never
//! mutates sale state.
//!
//! - [`OpenGate`]: lets every claim through. Used for the base,
//!   unauthenticated claim path.
//! - [`CredentialGate`]: requires a current attestation over the caller,
//!   signed by the trusted signer. Fails closed while no signer is set.
//!
//! Every rejection is the same `NotVerified`: bad signature, wrong signer,
//! wrong claimant and expiry are indistinguishable to the caller.

use ed25519_dalek::{Signature, VerifyingKey};
use tokensale_types::{
    Address, Attestation, CredentialPolicy, Result, SaleError, SignerKey, Timestamp,
};
use tracing::{debug, warn};

/// Authorization check applied to the claimant of every claim.
pub trait ClaimGate {
    /// Succeed only if `claimant` may claim at `now`.
    fn authorize(
        &self,
        claimant: &Address,
        attestation: Option<&Attestation>,
        now: Timestamp,
    ) -> Result<()>;

    /// Replace the trusted signer.
    fn set_trusted_signer(&mut self, signer: Option<SignerKey>) -> Result<()>;

    fn trusted_signer(&self) -> Option<SignerKey>;

    /// Replace the assertions attestations must carry.
    fn set_policy(&mut self, policy: CredentialPolicy);
}

// ---------------------------------------------------------------------------
// OpenGate
// ---------------------------------------------------------------------------

/// No credential required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenGate;

impl ClaimGate for OpenGate {
    fn authorize(
        &self,
        _claimant: &Address,
        _attestation: Option<&Attestation>,
        _now: Timestamp,
    ) -> Result<()> {
        Ok(())
    }

    fn set_trusted_signer(&mut self, _signer: Option<SignerKey>) -> Result<()> {
        Err(SaleError::Configuration(
            "sale has no credential gate".to_string(),
        ))
    }

    fn trusted_signer(&self) -> Option<SignerKey> {
        None
    }

    fn set_policy(&mut self, _policy: CredentialPolicy) {}
}

// ---------------------------------------------------------------------------
// CredentialGate
// ---------------------------------------------------------------------------

/// Ed25519 attestation check against one trusted signer.
#[derive(Debug, Clone, Default)]
pub struct CredentialGate {
    signer: Option<(SignerKey, VerifyingKey)>,
    policy: CredentialPolicy,
}

impl CredentialGate {
    /// A gate with no signer. Every claim fails until one is set.
    #[must_use]
    pub fn new(policy: CredentialPolicy) -> Self {
        Self {
            signer: None,
            policy,
        }
    }

    /// A gate trusting `signer`.
    pub fn with_signer(signer: SignerKey, policy: CredentialPolicy) -> Result<Self> {
        let mut gate = Self::new(policy);
        gate.set_trusted_signer(Some(signer))?;
        Ok(gate)
    }

    #[must_use]
    pub fn policy(&self) -> &CredentialPolicy {
        &self.policy
    }

    /// Pure predicate: a trusted signer is set, the attestation is unexpired
    /// at `now` (inclusive) and its signature binds it to `claimant`.
    #[must_use]
    pub fn verify(&self, claimant: &Address, attestation: &Attestation, now: Timestamp) -> bool {
        match &self.signer {
            Some((_, key)) => {
                attestation.is_current(now) && self.verify_proof(key, claimant, attestation)
            }
            None => false,
        }
    }

    /// Signature check alone, without the expiry test.
    fn verify_proof(
        &self,
        key: &VerifyingKey,
        claimant: &Address,
        attestation: &Attestation,
    ) -> bool {
        let Ok(proof) = <[u8; 64]>::try_from(attestation.proof.as_slice()) else {
            return false;
        };
        let signature = Signature::from_bytes(&proof);
        let payload = attestation.signing_payload(claimant, &self.policy);
        key.verify_strict(&payload, &signature).is_ok()
    }
}

impl ClaimGate for CredentialGate {
    fn authorize(
        &self,
        claimant: &Address,
        attestation: Option<&Attestation>,
        now: Timestamp,
    ) -> Result<()> {
        let Some((_, key)) = &self.signer else {
            warn!(claimant = %claimant, "Claim rejected: no trusted signer configured");
            return Err(SaleError::NotVerified);
        };
        let Some(attestation) = attestation else {
            warn!(claimant = %claimant, "Claim rejected: no attestation presented");
            return Err(SaleError::NotVerified);
        };
        if !attestation.is_current(now) {
            warn!(
                claimant = %claimant,
                identity = %attestation.identity_id,
                valid_until = attestation.valid_until,
                now,
                "Claim rejected: attestation expired"
            );
            return Err(SaleError::NotVerified);
        }
        if !self.verify_proof(key, claimant, attestation) {
            warn!(
                claimant = %claimant,
                identity = %attestation.identity_id,
                "Claim rejected: attestation signature invalid"
            );
            return Err(SaleError::NotVerified);
        }
        debug!(claimant = %claimant, identity = %attestation.identity_id, "Attestation verified");
        Ok(())
    }

    fn set_trusted_signer(&mut self, signer: Option<SignerKey>) -> Result<()> {
        self.signer = match signer {
            Some(signer) => Some((signer, signer.verifying_key()?)),
            None => None,
        };
        Ok(())
    }

    fn trusted_signer(&self) -> Option<SignerKey> {
        self.signer.map(|(signer, _)| signer)
    }

    fn set_policy(&mut self, policy: CredentialPolicy) {
        self.policy = policy;
    }
}
