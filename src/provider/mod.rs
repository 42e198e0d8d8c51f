//! This module implements the library's traits for concrete pairing-friendly curves

pub mod bn254;

pub(crate) mod msm;

pub use bn254::Bn254Engine;
