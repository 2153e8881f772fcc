//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the canonical encoding and the seal pre-image. Any
//! implementation that produces a different string or digest for one of
//! them cannot verify seals made by this one.

use glyphseal_core::{
    canonicalize, compute_digest, seal_preimage, Classification, Manifest, ManifestBuilder,
    Sha256Digest, ValueGraph,
};

/// A canonicalization vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Input as JSON text.
    pub input: &'static str,
    /// Expected canonical encoding.
    pub canonical: &'static str,
    /// Expected SHA-256 of the canonical encoding (hex).
    pub sha256: &'static str,
}

/// Get all canonicalization vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "null",
            input: "null",
            canonical: "null",
            sha256: "74234e98afe7498fb5daf1f36ac2d78acc339464f950703b8c019892f982b90b",
        },
        GoldenVector {
            name: "empty_object",
            input: "{}",
            canonical: "{}",
            sha256: "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a",
        },
        GoldenVector {
            name: "empty_array",
            input: "[ ]",
            canonical: "[]",
            sha256: "4f53cda18c2baa0c0354bb5f9a3ecbe5ed12ab4d8e11ba873c2f11161202b945",
        },
        GoldenVector {
            name: "scalars",
            input: r#"[true, false, 0, -1, 1.5, "s"]"#,
            canonical: r#"[true,false,0,-1,1.5,"s"]"#,
            sha256: "becc5debd8dedc49b9acd6fd14926c578af9cb8f0c76f633d88d417e77cb2000",
        },
        GoldenVector {
            name: "key_order",
            input: r#"{"b": 2, "a": 1}"#,
            canonical: r#"{"a":1,"b":2}"#,
            sha256: "43258cff783fe7036d8a43033f830adfc60ec037382473548ac742b888292777",
        },
        GoldenVector {
            name: "nested",
            input: r#"{"z": {"y": [3, 1, 2], "x": null}, "a": "A"}"#,
            canonical: r#"{"a":"A","z":{"x":null,"y":[3,1,2]}}"#,
            sha256: "b450aeec0f12086a86832deaa38dbc1b4aff10f00b1b73e7d1e1c92cc2874c0e",
        },
        GoldenVector {
            name: "escapes",
            input: r#"{"q": "say \"hi\"\n\ttab\\"}"#,
            canonical: r#"{"q":"say \"hi\"\n\ttab\\"}"#,
            sha256: "6f0b8bcac5965bf5b25282d938c073adc71aff47e14a1745d0b4d2fc49dc4cb1",
        },
        GoldenVector {
            name: "unicode_keys",
            input: "{\"é\": \"ü\", \"a\": \"\u{1F600}\"}",
            canonical: "{\"a\":\"\u{1F600}\",\"é\":\"ü\"}",
            sha256: "0da21e2719663612be54491be0b280b89a4ec89e7f0655baafe2661e451e3c91",
        },
        GoldenVector {
            name: "integral_floats",
            input: r#"{"h": 0.25, "g": -0.0, "f": 2.0}"#,
            canonical: r#"{"f":2,"g":0,"h":0.25}"#,
            sha256: "e702c5ce502d394ae140fe7ab598635033589d91c71051e49bae5035019951f7",
        },
        GoldenVector {
            name: "control_char",
            input: r#""\u0001""#,
            canonical: r#""\u0001""#,
            sha256: "b81cfb0a6715e53b373345b49e8ad94eb55fd777519dc539373d0634973c186e",
        },
        GoldenVector {
            name: "large_integer",
            input: "9007199254740993",
            canonical: "9007199254740993",
            sha256: "a1c367c29158357e62a3ff5d3e800fb7698a22396439dbc0a9d4929322afd35d",
        },
        GoldenVector {
            name: "small_float",
            input: r#"{"tiny": 1.5e-7}"#,
            canonical: r#"{"tiny":0.00000015}"#,
            sha256: "22053fc9e77906dcec10f0d4f91dfea10c5a408e5a1708fa9bf00cf15a4fcce3",
        },
    ]
}

/// Parse a vector's input into a value graph.
pub fn graph_from_vector(vector: &GoldenVector) -> serde_json::Result<ValueGraph> {
    serde_json::from_str::<serde_json::Value>(vector.input).map(ValueGraph::from)
}

/// Check every vector, returning the names of those that fail.
pub fn verify_all_vectors() -> Vec<&'static str> {
    all_vectors()
        .into_iter()
        .filter(|v| match graph_from_vector(v) {
            Ok(graph) => {
                let canonical = canonicalize(&graph);
                canonical != v.canonical
                    || Sha256Digest::hash(canonical.as_bytes()).to_hex() != v.sha256
            }
            Err(_) => true,
        })
        .map(|v| v.name)
        .collect()
}

/// A seal vector: a fixed artifact and manifest with the expected digest.
#[derive(Debug, Clone)]
pub struct SealVector {
    pub artifact: &'static str,
    pub anchor: &'static str,
    pub classification: Classification,
    pub context_tag: &'static str,
    pub export_time: &'static str,
    pub preimage: &'static str,
    pub digest: &'static str,
}

impl SealVector {
    pub fn artifact_graph(&self) -> ValueGraph {
        let value: serde_json::Value =
            serde_json::from_str(self.artifact).unwrap_or(serde_json::Value::Null);
        ValueGraph::from(value)
    }

    /// The manifest, built from registry defaults plus the pinned fields.
    pub fn manifest(&self) -> Manifest {
        ManifestBuilder::new(self.anchor)
            .classification(self.classification)
            .context_tag(self.context_tag)
            .export_time(self.export_time)
            .build()
    }

    /// Whether this implementation reproduces the vector.
    pub fn holds(&self) -> bool {
        let artifact = self.artifact_graph();
        let manifest = self.manifest();
        seal_preimage(&artifact, &manifest) == self.preimage
            && compute_digest(&artifact, &manifest).to_hex() == self.digest
    }
}

/// The pinned seal vector.
pub fn seal_vector() -> SealVector {
    SealVector {
        artifact: r#"{"x": 1}"#,
        anchor: "research",
        classification: Classification::Internal,
        context_tag: "golden",
        export_time: "2026-01-01T00:00:00.000Z",
        preimage: concat!(
            r#"{"artifact":{"x":1},"manifest":{"anchor":"research","#,
            r#""dlp":{"classification":"internal","context_tag":"golden"},"#,
            r#""ethics_protocol":"ethics/v1.2","export_time":"2026-01-01T00:00:00.000Z","#,
            r#""srb_tags":["srb:integrity","srb:provenance"],"team":"glyphseal","version":"1.0.0"}}"#,
        ),
        digest: "5c498d2aa22673b87158aed59c78aed42626f2ef599af882e7d1392c1fc2a26b",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_hold() {
        let failed = verify_all_vectors();
        assert!(failed.is_empty(), "failing vectors: {:?}", failed);
    }

    #[test]
    fn test_vector_names_unique() {
        let vectors = all_vectors();
        let mut names: Vec<_> = vectors.iter().map(|v| v.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), vectors.len());
    }

    #[test]
    fn test_seal_vector_holds() {
        let v = seal_vector();
        assert_eq!(
            seal_preimage(&v.artifact_graph(), &v.manifest()),
            v.preimage
        );
        assert!(v.holds());
    }
}
