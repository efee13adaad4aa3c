//! Identity attestations issued by an off-chain credential service.
//!
//! The flow has two halves:
//!
//! 1. Off-chain, the participant signs a human-readable
//!    [`CredentialPolicy::authorization_request`] and sends it to the
//!    issuer, which answers with `{identity_id, approved_at, valid_until,
//!    proof}`.
//! 2. On claim, the engine rebuilds the canonical attestation message for
//!    the *calling* participant and checks the proof against the trusted
//!    signer's ed25519 key.
//!
//! Canonical message:
//!
//! ```text
//! {claimant_hex};{identity_id};{approved_at};{valid_until};level:{kyc};citizenship_not:{cc,..};residency_not:{cc,..}
//! ```

use std::{fmt, str::FromStr};

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};

use crate::{Address, Result, SaleError, Timestamp, constants};

// ---------------------------------------------------------------------------
// SignerKey
// ---------------------------------------------------------------------------

/// Raw ed25519 public key of a trusted attestation signer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SignerKey(pub [u8; 32]);

impl SignerKey {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse into a dalek key, rejecting bytes that are not a curve point.
    pub fn verifying_key(&self) -> Result<VerifyingKey> {
        VerifyingKey::from_bytes(&self.0).map_err(|_| SaleError::InvalidSignerKey)
    }
}

impl From<VerifyingKey> for SignerKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

impl fmt::Debug for SignerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignerKey({})", hex::encode(self.0))
    }
}

impl fmt::Display for SignerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "signer:{}", hex::encode(&self.0[..8]))
    }
}

impl FromStr for SignerKey {
    type Err = SaleError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|_| SaleError::InvalidSignerKey)?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| SaleError::InvalidSignerKey)?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for SignerKey {
    type Error = SaleError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SignerKey> for String {
    fn from(value: SignerKey) -> Self {
        hex::encode(value.0)
    }
}

// ---------------------------------------------------------------------------
// CredentialPolicy
// ---------------------------------------------------------------------------

/// What an attestation must assert about the claimant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialPolicy {
    /// Required KYC level (e.g. `"plus"`).
    pub kyc_level: String,
    /// Citizenships that disqualify, ISO 3166-1 alpha-2.
    pub excluded_citizenship: Vec<String>,
    /// Residencies that disqualify, ISO 3166-1 alpha-2.
    pub excluded_residency: Vec<String>,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        let excluded: Vec<String> = constants::DEFAULT_EXCLUDED_JURISDICTIONS
            .iter()
            .map(ToString::to_string)
            .collect();
        Self {
            kyc_level: constants::DEFAULT_KYC_LEVEL.to_string(),
            excluded_citizenship: excluded.clone(),
            excluded_residency: excluded,
        }
    }
}

impl CredentialPolicy {
    /// Machine-readable assertions bound into the attestation message.
    #[must_use]
    pub fn assertions(&self) -> String {
        format!(
            "level:{};citizenship_not:{};residency_not:{}",
            self.kyc_level,
            lower_join(&self.excluded_citizenship),
            lower_join(&self.excluded_residency),
        )
    }

    /// The text a participant signs when asking the issuer for a proof.
    #[must_use]
    pub fn authorization_request(&self, app_name: &str, app_id: &str) -> String {
        format!(
            "I authorize {app_name} ({app_id}) to get a proof that:\n\
             - I passed KYC level {}\n\
             - I am not a citizen of the following countries: {}\n\
             - I am not a resident of the following countries: {}",
            self.kyc_level,
            describe_countries(&self.excluded_citizenship),
            describe_countries(&self.excluded_residency),
        )
    }
}

fn lower_join(codes: &[String]) -> String {
    codes
        .iter()
        .map(|c| c.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(",")
}

fn describe_countries(codes: &[String]) -> String {
    codes
        .iter()
        .map(|code| {
            let upper = code.to_ascii_uppercase();
            format!("{} ({upper})", country_name(&upper))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn country_name(code: &str) -> &str {
    match code {
        "US" => "United States of America",
        "CU" => "Cuba",
        "IR" => "Iran",
        "KP" => "Democratic People's Republic of Korea",
        "SD" => "Sudan",
        "SY" => "Syria",
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Attestation
// ---------------------------------------------------------------------------

/// A signed, time-bounded identity statement presented with a claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attestation {
    /// Issuer-side identity of the participant.
    pub identity_id: String,
    /// When the issuer approved the identity.
    pub approved_at: Timestamp,
    /// Last second at which the attestation is accepted.
    pub valid_until: Timestamp,
    /// Ed25519 signature over [`Attestation::signing_payload`].
    pub proof: Vec<u8>,
}

impl Attestation {
    /// Canonical message binding `claimant` to this attestation.
    #[must_use]
    pub fn message(&self, claimant: &Address, policy: &CredentialPolicy) -> String {
        format!(
            "{};{};{};{};{}",
            claimant.to_hex(),
            self.identity_id,
            self.approved_at,
            self.valid_until,
            policy.assertions(),
        )
    }

    /// Domain-separated bytes the issuer signs.
    #[must_use]
    pub fn signing_payload(&self, claimant: &Address, policy: &CredentialPolicy) -> Vec<u8> {
        let message = self.message(claimant, policy);
        let mut payload = Vec::with_capacity(constants::ATTESTATION_DOMAIN.len() + message.len());
        payload.extend_from_slice(constants::ATTESTATION_DOMAIN);
        payload.extend_from_slice(message.as_bytes());
        payload
    }

    /// Whether the attestation is still valid at `now` (inclusive).
    #[must_use]
    pub fn is_current(&self, now: Timestamp) -> bool {
        now <= self.valid_until
    }
}

/// Issuer-side helpers. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Attestation {
    /// Sign an attestation for `claimant` the way the issuer would.
    pub fn issue(
        signing_key: &ed25519_dalek::SigningKey,
        claimant: &Address,
        identity_id: &str,
        approved_at: Timestamp,
        valid_until: Timestamp,
        policy: &CredentialPolicy,
    ) -> Self {
        use ed25519_dalek::Signer;

        let mut attestation = Self {
            identity_id: identity_id.to_string(),
            approved_at,
            valid_until,
            proof: Vec::new(),
        };
        let payload = attestation.signing_payload(claimant, policy);
        attestation.proof = signing_key.sign(&payload).to_bytes().to_vec();
        attestation
    }

    /// Fresh random issuer key.
    pub fn random_issuer() -> ed25519_dalek::SigningKey {
        ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng)
    }
}
