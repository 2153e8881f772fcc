//! Reading and writing sealed artifacts in their JSON wire form.
//!
//! The wire form is one JSON document `{"artifact": .., "manifest": ..}`.
//! Object key order on the wire carries no meaning; the seal is checked
//! against the canonical form, not the bytes read.

use std::io::{Read, Write};

use glyphseal_core::{check_seal, SealedArtifact};

use crate::error::Result;

/// Write `sealed` as a single line of JSON.
///
/// Artifacts of any nesting depth are written without recursion.
pub fn write_sealed<W: Write>(mut writer: W, sealed: &SealedArtifact) -> Result<()> {
    sealed.write_json(&mut writer)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read a sealed artifact without checking its seal.
pub fn read_sealed<R: Read>(mut reader: R) -> Result<SealedArtifact> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(SealedArtifact::from_json(&text)?)
}

/// Read a sealed artifact and reject it unless its seal verifies.
pub fn read_verified<R: Read>(reader: R) -> Result<SealedArtifact> {
    let sealed = read_sealed(reader)?;
    if let Err(e) = check_seal(&sealed) {
        tracing::warn!(anchor = %sealed.manifest.anchor, error = %e, "rejected sealed artifact");
        return Err(e.into());
    }
    Ok(sealed)
}
