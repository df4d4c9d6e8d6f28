//! Authentication primitives.
//!
//! - [`jwt`] -- bearer token verification and role checks, plus minting for tooling and tests.

pub mod jwt;
