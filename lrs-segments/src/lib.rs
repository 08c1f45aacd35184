//! Route segment geometry from state route milepost ranges.
//!
//! Answers: "which piece of route 002 lies between milepost 118 and 119?"
//! by querying an LRS feature service for milepost records and measured
//! route lines, then cutting each route line between the resolved ARM
//! measures.
//!
//! [`inventory`] answers the questions asked before a range query: which
//! routes exist, what SRMP range each covers, and where back mileage is.

pub mod domain;
pub mod feature_service;
pub mod inventory;
pub mod predicate;
pub mod segments;
