//! Alignment sessions for cemsa
//!
//! The session is the hand-off between structural alignment and sequence
//! extraction: the reference (`ref`), each target with its aligned
//! coordinates, and how the alignment went.

mod model;
mod prs;

pub use model::{AlignStatus, AlignmentRecord, AlignmentSession, SessionTarget, REFERENCE_NAME};
pub use prs::{load_session, save_session, SessionError};
