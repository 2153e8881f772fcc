//! Seal engine: content-addressed tamper evidence for artifacts.
//!
//! ```text
//! digest = SHA256( canonicalize({ "artifact": artifact, "manifest": manifest - seal }) )
//! ```
//!
//! The seal is excluded from its own pre-image, so resealing an already
//! sealed manifest recomputes over the unsealed view. Any change to the
//! artifact or to a manifest field other than `seal` changes the digest.

use std::io;

use serde::{Deserialize, Serialize};

use crate::canonical::canonicalize;
use crate::crypto::{Sha256Digest, SHA256_HEX_LEN};
use crate::error::{CoreError, SealError};
use crate::manifest::{timestamp_now, Manifest, Seal, SEAL_ALGO};
use crate::value::{ValueGraph, MAX_SERDE_DEPTH};

/// Pre-image keys.
mod keys {
    pub const ARTIFACT: &str = "artifact";
    pub const MANIFEST: &str = "manifest";
}

/// An artifact paired with a manifest that carries its seal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedArtifact {
    pub artifact: ValueGraph,
    pub manifest: Manifest,
}

impl SealedArtifact {
    /// The attached seal, if any.
    pub fn seal(&self) -> Option<&Seal> {
        self.manifest.seal.as_ref()
    }

    /// Shorthand for [`verify_seal`].
    pub fn verify(&self) -> bool {
        verify_seal(self)
    }

    /// Serialize to the JSON wire shape.
    pub fn to_json(&self) -> Result<String, CoreError> {
        let mut buf = Vec::new();
        self.write_json(&mut buf)?;
        String::from_utf8(buf).map_err(|e| CoreError::EncodingError(e.to_string()))
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, CoreError> {
        let mut buf = Vec::new();
        self.envelope()?
            .write_json_pretty(&mut buf)
            .map_err(|e| CoreError::EncodingError(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| CoreError::EncodingError(e.to_string()))
    }

    /// Stream the JSON wire shape to `writer`.
    ///
    /// The artifact is written without recursion, so nesting depth is not
    /// limited by the call stack.
    pub fn write_json<W: io::Write>(&self, writer: W) -> Result<(), CoreError> {
        self.envelope()?
            .write_json(writer)
            .map_err(|e| CoreError::EncodingError(e.to_string()))
    }

    /// Parse from the JSON wire shape.
    ///
    /// The artifact may be nested to any depth. The manifest goes through
    /// serde and is limited to [`MAX_SERDE_DEPTH`] levels.
    pub fn from_json(s: &str) -> Result<Self, CoreError> {
        let doc = ValueGraph::parse_json(s)?;
        let root = doc.root();
        let field = |key: &str| {
            doc.get(root, key)
                .ok_or_else(|| CoreError::DecodingError(format!("missing field `{}`", key)))
        };

        let artifact = doc.subgraph(field(keys::ARTIFACT)?);
        let manifest = doc.subgraph(field(keys::MANIFEST)?);
        if manifest.depth() > MAX_SERDE_DEPTH {
            return Err(CoreError::DecodingError(format!(
                "manifest nested deeper than {} levels",
                MAX_SERDE_DEPTH
            )));
        }
        let manifest = serde_json::from_value(manifest.to_json())
            .map_err(|e| CoreError::DecodingError(e.to_string()))?;

        Ok(Self { artifact, manifest })
    }

    /// `{"artifact": .., "manifest": ..}` as one graph, seal included.
    fn envelope(&self) -> Result<ValueGraph, CoreError> {
        let manifest = serde_json::to_value(&self.manifest)
            .map_err(|e| CoreError::EncodingError(e.to_string()))?;
        let mut doc = ValueGraph::object();
        let root = doc.root();
        let a = doc.graft(&self.artifact);
        let m = doc.graft(&ValueGraph::from_json(&manifest));
        doc.insert(root, keys::ARTIFACT, a)?;
        doc.insert(root, keys::MANIFEST, m)?;
        Ok(doc)
    }
}

/// Canonical pre-image of the digest.
pub fn seal_preimage(artifact: &ValueGraph, manifest: &Manifest) -> String {
    let mut envelope = ValueGraph::object();
    let root = envelope.root();
    let a = envelope.graft(artifact);
    let m = envelope.graft(&manifest.unsealed_graph());
    let inserted = envelope
        .insert(root, keys::ARTIFACT, a)
        .and_then(|()| envelope.insert(root, keys::MANIFEST, m));
    debug_assert!(inserted.is_ok(), "pre-image insert failed: {:?}", inserted);
    canonicalize(&envelope)
}

/// Digest over `(artifact, manifest - seal)`.
pub fn compute_digest(artifact: &ValueGraph, manifest: &Manifest) -> Sha256Digest {
    Sha256Digest::hash(seal_preimage(artifact, manifest).as_bytes())
}

/// Seal an artifact, stamping the seal with the current time.
pub fn create_seal(artifact: &ValueGraph, manifest: &Manifest) -> SealedArtifact {
    create_seal_at(artifact, manifest, timestamp_now())
}

/// Seal an artifact with an explicit `created_at`.
///
/// Returns a new manifest equal to the input plus the seal; the inputs are
/// not touched. Any existing seal is replaced.
pub fn create_seal_at(
    artifact: &ValueGraph,
    manifest: &Manifest,
    created_at: impl Into<String>,
) -> SealedArtifact {
    let digest = compute_digest(artifact, manifest);
    tracing::debug!(
        anchor = %manifest.anchor,
        digest = %digest,
        resealed = manifest.is_sealed(),
        "sealed artifact"
    );

    let mut sealed_manifest = manifest.without_seal();
    sealed_manifest.seal = Some(Seal {
        algo: SEAL_ALGO.to_string(),
        digest: digest.to_hex(),
        created_at: created_at.into(),
    });

    SealedArtifact {
        artifact: artifact.clone(),
        manifest: sealed_manifest,
    }
}

/// Check a sealed artifact, reporting why verification failed.
pub fn check_seal(sealed: &SealedArtifact) -> Result<(), SealError> {
    let seal = sealed.manifest.seal.as_ref().ok_or(SealError::MissingSeal)?;

    if seal.algo != SEAL_ALGO {
        return Err(SealError::UnsupportedAlgorithm(seal.algo.clone()));
    }

    let stored = Sha256Digest::from_hex(&seal.digest).map_err(|_| {
        SealError::MalformedDigest(format!(
            "expected {} lowercase hex characters",
            SHA256_HEX_LEN
        ))
    })?;

    let actual = compute_digest(&sealed.artifact, &sealed.manifest);
    if actual != stored {
        return Err(SealError::DigestMismatch {
            expected: stored.to_hex(),
            actual: actual.to_hex(),
        });
    }

    Ok(())
}

/// Whether the seal matches the current artifact and manifest.
///
/// Fails closed: a missing or malformed seal is simply `false`.
pub fn verify_seal(sealed: &SealedArtifact) -> bool {
    match check_seal(sealed) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "seal verification failed");
            false
        }
    }
}

/// Verify a sealed artifact given as JSON text.
///
/// Input that does not parse as the wire shape is treated as unverified.
pub fn verify_seal_json(json: &str) -> bool {
    match SealedArtifact::from_json(json) {
        Ok(sealed) => verify_seal(&sealed),
        Err(e) => {
            tracing::debug!(error = %e, "unparseable sealed artifact");
            false
        }
    }
}
