//! Control Point - Change Governance Gate
//!
//! Maintains a set of atomic policy claims about a software system,
//! determines which claims apply to a proposed change, detects logical
//! conflicts among applicable claims, and blocks or warns based on severity,
//! routing unresolved conflicts through an explicit human-arbitration
//! protocol. Consumed by CI pipelines and interactive tooling as a
//! pre-merge gate.

pub mod claim;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod importer;
pub mod routes;
pub mod state;
