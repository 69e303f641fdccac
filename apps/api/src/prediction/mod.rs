//! Career-recommendation prediction pipeline: input validation, categorical
//! encoding, artifact loading with schema reconciliation, and the ensemble
//! decision procedure.

pub mod artifact;
pub mod handlers;
pub mod input;
pub mod tree;
