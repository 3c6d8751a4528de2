//! Session data model
//!
//! A session holds the reference structure and every target that was loaded
//! for alignment, together with the outcome of aligning it.

use std::time::{SystemTime, UNIX_EPOCH};

use cemsa_mol::Molecule;
use serde::{Deserialize, Serialize};

/// Object name the reference structure is stored under
pub const REFERENCE_NAME: &str = "ref";

/// Outcome of aligning one target onto the reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlignStatus {
    Aligned,
    /// Alignment raised; the molecule keeps its input coordinates
    Failed(String),
}

impl AlignStatus {
    #[inline]
    pub fn is_aligned(&self) -> bool {
        matches!(self, AlignStatus::Aligned)
    }
}

/// Alignment bookkeeping for one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRecord {
    /// Backend that produced the alignment ("cealign", "sequence", ...)
    pub method: String,
    pub status: AlignStatus,
    /// RMSD in Å, `None` when the backend reported none
    pub rmsd: Option<f32>,
    /// Number of aligned residues, when known
    pub aligned_length: Option<usize>,
}

impl AlignmentRecord {
    pub fn aligned(method: impl Into<String>, rmsd: Option<f32>, aligned_length: Option<usize>) -> Self {
        AlignmentRecord {
            method: method.into(),
            status: AlignStatus::Aligned,
            rmsd,
            aligned_length,
        }
    }

    pub fn failed(method: impl Into<String>, reason: impl Into<String>) -> Self {
        AlignmentRecord {
            method: method.into(),
            status: AlignStatus::Failed(reason.into()),
            rmsd: None,
            aligned_length: None,
        }
    }
}

/// A target object in the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTarget {
    pub molecule: Molecule,
    pub record: AlignmentRecord,
}

impl SessionTarget {
    #[inline]
    pub fn name(&self) -> &str {
        &self.molecule.name
    }
}

/// Reference plus aligned targets, as saved by stage 1 and read by stage 2
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentSession {
    pub reference: Molecule,
    pub targets: Vec<SessionTarget>,
    /// Creation time, seconds since the Unix epoch
    pub created_at: u64,
}

impl AlignmentSession {
    /// Start a session around a reference structure, renamed to [`REFERENCE_NAME`]
    pub fn new(mut reference: Molecule) -> Self {
        reference.name = REFERENCE_NAME.to_string();
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        AlignmentSession {
            reference,
            targets: Vec::new(),
            created_at,
        }
    }

    /// Add a target, replacing any earlier target with the same name in place
    pub fn add_target(&mut self, molecule: Molecule, record: AlignmentRecord) {
        let target = SessionTarget { molecule, record };
        match self.targets.iter_mut().find(|t| t.name() == target.name()) {
            Some(existing) => *existing = target,
            None => self.targets.push(target),
        }
    }

    pub fn get_target(&self, name: &str) -> Option<&SessionTarget> {
        self.targets.iter().find(|t| t.name() == name)
    }

    /// All object names: the reference first, then targets in insertion order
    pub fn object_names(&self) -> Vec<&str> {
        std::iter::once(self.reference.name.as_str())
            .chain(self.targets.iter().map(SessionTarget::name))
            .collect()
    }

    /// Number of targets whose alignment succeeded
    pub fn aligned_count(&self) -> usize {
        self.targets.iter().filter(|t| t.record.status.is_aligned()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_is_renamed() {
        let session = AlignmentSession::new(Molecule::new("1abc"));
        assert_eq!(session.reference.name, "ref");
        assert!(session.created_at > 0);
    }

    #[test]
    fn test_object_names_order() {
        let mut session = AlignmentSession::new(Molecule::new("reference"));
        session.add_target(Molecule::new("zeta"), AlignmentRecord::aligned("sequence", Some(1.0), Some(10)));
        session.add_target(Molecule::new("alpha"), AlignmentRecord::failed("sequence", "no pairs"));
        assert_eq!(session.object_names(), vec!["ref", "zeta", "alpha"]);
        assert_eq!(session.aligned_count(), 1);
    }

    #[test]
    fn test_add_target_replaces_same_name() {
        let mut session = AlignmentSession::new(Molecule::new("r"));
        session.add_target(Molecule::new("a"), AlignmentRecord::failed("cealign", "boom"));
        session.add_target(Molecule::new("b"), AlignmentRecord::aligned("cealign", None, None));
        session.add_target(Molecule::new("a"), AlignmentRecord::aligned("cealign", Some(0.5), Some(42)));

        assert_eq!(session.targets.len(), 2);
        assert_eq!(session.object_names(), vec!["ref", "a", "b"]);
        let a = session.get_target("a").unwrap();
        assert_eq!(a.record.rmsd, Some(0.5));
        assert!(a.record.status.is_aligned());
    }
}
