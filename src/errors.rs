// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the amtvss project.
// See the LICENSE file in the project root for full license information.

//! This module defines errors returned by the library.
//!
//! Every variant is a configuration or caller error. A proof that fails to
//! verify is never reported through this type: verification routines return
//! `Ok(false)` so that the orchestration layer can exclude the offending
//! participant or retry with a different subset.
use core::fmt::Debug;
use thiserror::Error;

/// Errors returned by amtvss
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum AmtError {
  /// returned if a tree is allocated with a leaf count that is not a power of two
  #[error("InvalidLeafCount: {num_leaves} is not a power of two")]
  InvalidLeafCount {
    /// The requested number of leaves
    num_leaves: usize,
  },
  /// returned if a tree is allocated with a max level above its height
  #[error("InvalidMaxLevel: level {max_level} exceeds the highest level {max_possible}")]
  InvalidMaxLevel {
    /// The requested max level
    max_level: usize,
    /// The highest level a tree with this many leaves has
    max_possible: usize,
  },
  /// returned if the threshold does not satisfy `2 <= t <= n`
  #[error("InvalidThreshold: t = {t}, n = {n}")]
  InvalidThreshold {
    /// The threshold
    t: usize,
    /// The number of participants
    n: usize,
  },
  /// returned if a multipoint evaluation is requested at fewer than two points
  #[error("TooFewPoints: need at least 2 evaluation points, got {0}")]
  TooFewPoints(usize),
  /// returned if the public parameters are too short for the requested configuration
  #[error("InsufficientParameters: need powers up to {required}, have up to {available}")]
  InsufficientParameters {
    /// The highest power of the trapdoor needed
    required: usize,
    /// The highest power of the trapdoor available
    available: usize,
  },
  /// returned when dividing an empty polynomial
  #[error("EmptyPolynomial")]
  EmptyPolynomial,
  /// returned if the scalar field has no primitive root of unity of the requested order
  #[error("RootOfUnityUnavailable: no primitive 2^{log_order}-th root of unity")]
  RootOfUnityUnavailable {
    /// log2 of the requested order
    log_order: usize,
  },
  /// returned if the supplied input is not of the right length
  #[error("InvalidInputLength: expected {expected}, got {actual}")]
  InvalidInputLength {
    /// The expected length
    expected: usize,
    /// The supplied length
    actual: usize,
  },
  /// returned if a reconstruction subset is malformed
  #[error("InvalidSubset: {reason}")]
  InvalidSubset {
    /// The reason the subset was rejected
    reason: String,
  },
  /// returned if a protocol step is invoked out of order
  #[error("InvalidState: expected {expected}, player is {actual}")]
  InvalidState {
    /// The state the step requires
    expected: &'static str,
    /// The state the player is in
    actual: &'static str,
  },
  /// returned when merging evaluation trees built over different points
  #[error("MismatchedTrees")]
  MismatchedTrees,
  /// returned when aggregate verification is requested for a VSS player
  #[error("AggregationRequiresDkg")]
  AggregationRequiresDkg,
  /// returned when a simulated computation is requested without a trapdoor
  #[error("MissingTrapdoor")]
  MissingTrapdoor,
  /// returned when a player id is not in `0..n`
  #[error("UnknownPlayer: id {id} not below n = {n}")]
  UnknownPlayer {
    /// The offending id
    id: usize,
    /// The number of participants
    n: usize,
  },
}
