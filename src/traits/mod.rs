//! This module defines the traits through which the library consumes a pairing-friendly curve.
//! The field, group and pairing arithmetic are provided by a backend (see [`crate::provider`]);
//! nothing in this crate reimplements them.
use crate::errors::AmtError;
use core::fmt::Debug;
use ff::{FromUniformBytes, PrimeField};
use group::{Group, prime::PrimeGroup};
use serde::{Deserialize, Serialize};

pub mod player;

/// A collection of types and operations over a bilinear group `e: G1 x G2 -> GT`
pub trait Engine: Clone + Copy + Debug + Send + Sync + Sized + Eq + PartialEq + 'static {
  /// A type representing an element of the scalar field shared by all three groups
  type Scalar: PrimeField
    + FromUniformBytes<64>
    + Send
    + Sync
    + Serialize
    + for<'de> Deserialize<'de>;

  /// A type that represents an element of the first source group
  type G1: PrimeGroup<Scalar = Self::Scalar> + Serialize + for<'de> Deserialize<'de>;

  /// Affine representation of `G1`, used as multi-scalar multiplication bases
  type G1Affine: Clone + Copy + Debug + Send + Sync + Eq + PartialEq;

  /// A type that represents an element of the second source group
  type G2: PrimeGroup<Scalar = Self::Scalar> + Serialize + for<'de> Deserialize<'de>;

  /// A type that represents an element of the target group (written additively)
  type Gt: Group<Scalar = Self::Scalar>;

  /// Converts projective `G1` points to their affine representation
  fn batch_normalize_g1(points: &[Self::G1]) -> Vec<Self::G1Affine>;

  /// Computes `sum_i scalars[i] * bases[i]`
  fn msm_g1(scalars: &[Self::Scalar], bases: &[Self::G1Affine]) -> Result<Self::G1, AmtError>;

  /// Evaluates the bilinear pairing `e(p, q)`.
  ///
  /// Callers must not invoke this concurrently from several threads on the same backend
  /// context; every call site in this crate evaluates pairings sequentially.
  fn pairing(p: &Self::G1, q: &Self::G2) -> Self::Gt;
}
