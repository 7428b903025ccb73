//! Run fingerprint and manifest
//!
//! Each package records a SHA-256 of the brief it was built from, plus a
//! manifest listing the artifacts and the projection they all show.

use crate::models::{Artifact, FinancialMeta, FinancialProjection, ProjectBrief, ReportPackage};
use crate::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Manifest written next to the artifacts of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub package: ReportPackage,
    pub brief: ProjectBrief,
    pub artifacts: Vec<Artifact>,
    pub projection: FinancialProjection,
    pub meta: FinancialMeta,
}

/// Compute SHA256 hash of a brief
/// Uses zero-copy streaming serialization into hasher
pub fn compute_brief_hash(brief: &ProjectBrief) -> String {
    let mut hasher = Sha256::new();

    if serde_json::to_writer(&mut HashWriter(&mut hasher), brief).is_err() {
        return String::new();
    }

    hex::encode(hasher.finalize())
}

/// Adapter to allow writing into Sha256 via std::io::Write
struct HashWriter<'a, H: Digest>(&'a mut H);

impl<'a, H: Digest> Write for HashWriter<'a, H> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn write_manifest(manifest: &RunManifest, destination: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(manifest)?;
    fs::write(destination, json)?;
    Ok(())
}

pub fn read_manifest(path: &Path) -> Result<RunManifest> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
