//! Ed25519 result signing and verification.

use crate::domain::SigningError;
use crate::ports::ResultSigner;
use shared_crypto::{CryptoError, ReplicaKeyPair, ReplicaPublicKey, ReplicaSignature};
use shared_types::{ExecuteResponse, PeerId};

/// Signs results with the replica's Ed25519 key.
///
/// The replica's identity is the hex encoding of its public key.
#[derive(Debug)]
pub struct Ed25519ResultSigner {
    keypair: ReplicaKeyPair,
    identity: PeerId,
}

impl Ed25519ResultSigner {
    pub fn new(keypair: ReplicaKeyPair) -> Self {
        let identity = PeerId::new(keypair.public_key().to_hex());
        Self { keypair, identity }
    }

    pub fn generate() -> Self {
        Self::new(ReplicaKeyPair::generate())
    }

    pub fn public_key(&self) -> ReplicaPublicKey {
        self.keypair.public_key()
    }
}

impl ResultSigner for Ed25519ResultSigner {
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SigningError> {
        Ok(self.keypair.sign(payload).as_bytes().to_vec())
    }

    fn identity(&self) -> PeerId {
        self.identity.clone()
    }
}

/// Attach a hex signature over the message's signing payload.
pub fn sign_response<S: ResultSigner + ?Sized>(
    signer: &S,
    response: &mut ExecuteResponse,
) -> Result<(), SigningError> {
    let payload = response
        .signing_payload()
        .map_err(|e| SigningError::Payload(e.to_string()))?;
    let signature = signer.sign(&payload)?;
    response.signature = hex::encode(signature);
    Ok(())
}

/// Check a signed result message against the sender's public key.
pub fn verify_response(
    response: &ExecuteResponse,
    public_key: &ReplicaPublicKey,
) -> Result<(), CryptoError> {
    if !response.is_signed() {
        return Err(CryptoError::InvalidSignatureFormat(
            "message is not signed".to_string(),
        ));
    }

    let signature = ReplicaSignature::from_hex(&response.signature)?;
    let payload = response
        .signing_payload()
        .map_err(|e| CryptoError::InvalidSignatureFormat(e.to_string()))?;

    public_key.verify(&payload, &signature)
}
