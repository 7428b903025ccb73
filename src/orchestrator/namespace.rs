//! Per-run output namespaces
//!
//! Every run writes only inside `<output_root>/<uid>/`, and every file name
//! there starts with `<uid>_`.

use crate::error::DprError;
use crate::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

/// Hex characters of the random id kept in names
const UID_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub uid: String,
    pub dir: PathBuf,
}

impl Namespace {
    fn artifact(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}_{}", self.uid, suffix))
    }

    pub fn narrative_path(&self) -> PathBuf {
        self.artifact("dpr.md")
    }

    pub fn chart_path(&self) -> PathBuf {
        self.artifact("finance.png")
    }

    pub fn summary_path(&self) -> PathBuf {
        self.artifact("summary.html")
    }

    pub fn spreadsheet_path(&self) -> PathBuf {
        self.artifact("financials.csv")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.artifact("manifest.json")
    }
}

pub fn random_uid() -> String {
    let mut uid = Uuid::new_v4().simple().to_string();
    uid.truncate(UID_LEN);
    uid
}

/// Create a fresh namespace directory under `root`
pub fn allocate(root: &Path, attempts: u32) -> Result<Namespace> {
    allocate_with(root, attempts, random_uid)
}

/// Never reuses an existing directory: `create_dir` fails on one, and the
/// next id is tried.
pub(crate) fn allocate_with<F>(root: &Path, attempts: u32, mut next_uid: F) -> Result<Namespace>
where
    F: FnMut() -> String,
{
    fs::create_dir_all(root)?;

    for attempt in 1..=attempts.max(1) {
        let uid = next_uid();
        let dir = root.join(&uid);

        match fs::create_dir(&dir) {
            Ok(()) => return Ok(Namespace { uid, dir }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                warn!(uid = %uid, attempt, "Namespace already exists, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(DprError::NamespaceCollision(format!(
        "no free namespace under {} after {} attempt(s)",
        root.display(),
        attempts.max(1)
    )))
}
