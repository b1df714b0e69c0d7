//! Candidate selection for match peaks.

pub(crate) mod topk;
