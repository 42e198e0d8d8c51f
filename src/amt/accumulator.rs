// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the amtvss project.
// See the LICENSE file in the project root for full license information.

//! Subproduct trees over roots of unity and their G2 commitments.
//!
//! Leaf `i` of an [`AccumulatorTree`] over $N$ points is $x - \omega^{bitrev(i)}$. With this
//! ordering, siblings are always $x^m - c$ and $x^m + c$, so every internal node is again
//! a binomial $x^{2m} - c^2$ and the root is $x^N - 1$.
use crate::{
  amt::tree::BinaryTree,
  errors::AmtError,
  math::Math,
  polys::{roots_of_unity, xnc::XncPoly},
  srs::PublicParams,
  start_span,
  traits::Engine,
};
use ff::PrimeField;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, info_span};

/// The subproduct tree of $x - \omega^j$ for all $N$-th roots of unity $\omega^j$
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccumulatorTree<Scalar: PrimeField> {
  num_points: usize,
  num_bits: usize,
  omegas: Vec<Scalar>,
  tree: BinaryTree<XncPoly<Scalar>>,
}

impl<Scalar: PrimeField> AccumulatorTree<Scalar> {
  /// Builds the full tree needed to evaluate at the first `num_points` roots of unity.
  ///
  /// # Errors
  /// Returns `AmtError::TooFewPoints` if `num_points < 2`, and
  /// `AmtError::RootOfUnityUnavailable` if the field lacks a `nextPow2(num_points)`-th root.
  pub fn new(num_points: usize) -> Result<Self, AmtError> {
    if num_points < 2 {
      return Err(AmtError::TooFewPoints(num_points));
    }
    let (_acc_span, acc_t) = start_span!("accumulator_tree", n = num_points);

    let num_leaves = num_points.next_power_of_two();
    let num_bits = num_leaves.log_2();
    let omegas = roots_of_unity::<Scalar>(num_leaves)?;

    let leaves: Vec<XncPoly<Scalar>> = (0..num_leaves)
      .map(|i| XncPoly::linear(&omegas[i.bit_reverse(num_bits)]))
      .collect();

    let mut levels = Vec::with_capacity(num_bits + 1);
    levels.push(leaves);
    for _ in 0..num_bits {
      let next: Vec<_> = levels[levels.len() - 1]
        .par_chunks(2)
        .map(|pair| pair[0] * pair[1])
        .collect();
      levels.push(next);
    }
    let tree = BinaryTree::from_levels(levels)?;

    debug_assert_eq!(
      *tree.get(num_bits, 0),
      XncPoly::new(num_leaves, -Scalar::ONE)
    );

    info!(elapsed_ms = %acc_t.elapsed().as_millis(), n = num_points, "accumulator_tree");
    Ok(Self {
      num_points,
      num_bits,
      omegas,
      tree,
    })
  }

  /// Returns `n`, the number of evaluation points requested
  pub fn num_points(&self) -> usize {
    self.num_points
  }

  /// Returns $N$ = `nextPow2(n)`, the number of leaves
  pub fn num_leaves(&self) -> usize {
    self.tree.num_leaves()
  }

  /// Returns $\log_2 N$
  pub fn num_bits(&self) -> usize {
    self.num_bits
  }

  /// Returns the number of levels, $\log_2 N + 1$
  pub fn num_levels(&self) -> usize {
    self.tree.num_levels()
  }

  /// Returns all $N$ powers of the primitive $N$-th root of unity
  pub fn omegas(&self) -> &[Scalar] {
    &self.omegas
  }

  /// Returns the accumulator at `(level, idx)`
  pub fn get(&self, level: usize, idx: usize) -> &XncPoly<Scalar> {
    self.tree.get(level, idx)
  }

  /// Returns the underlying tree
  pub fn tree(&self) -> &BinaryTree<XncPoly<Scalar>> {
    &self.tree
  }
}

/// Commitments in G2 to the accumulators of an [`AccumulatorTree`] up to `max_level`.
///
/// These serve as public verification keys: an AMT proof for $\omega^i$ is checked against
/// the commitments on the path from leaf `bitrev(i)`.
#[derive(Clone, Debug)]
pub struct AuthAccumulatorTree<E: Engine> {
  num_bits: usize,
  tree: BinaryTree<E::G2>,
}

impl<E: Engine> AuthAccumulatorTree<E> {
  /// Commits to every accumulator $x^{2^k} + c$ at levels $k \le \lfloor\log_2(t-1)\rfloor$
  /// as $g_2^{s^{2^k}} + c \cdot g_2$.
  ///
  /// # Errors
  /// Returns `AmtError::InvalidThreshold` if `t < 2`, `AmtError::InvalidMaxLevel` if the
  /// tree is not tall enough for `t`, and `AmtError::InsufficientParameters` if `pp`
  /// lacks $g_2^{s^{2^k}}$ for the top level.
  pub fn new(
    accs: &AccumulatorTree<E::Scalar>,
    pp: &PublicParams<E>,
    t: usize,
  ) -> Result<Self, AmtError> {
    if t < 2 {
      return Err(AmtError::InvalidThreshold {
        t,
        n: accs.num_points(),
      });
    }
    let max_level = (t - 1).log_2_floor();
    if max_level > accs.num_bits() {
      return Err(AmtError::InvalidMaxLevel {
        max_level,
        max_possible: accs.num_bits(),
      });
    }
    pp.ensure_degree(1 << max_level)?;

    let (_auth_span, auth_t) = start_span!("auth_accumulator_tree", t = t, max_level = max_level);
    let g2 = pp.g2();

    // siblings carry opposite constants, so c * g2 is computed once per pair
    let levels = (0..=max_level)
      .map(|k| {
        let s_pow = pp.g2_powers()[1 << k];
        accs
          .tree()
          .level(k)
          .par_chunks(2)
          .flat_map_iter(|pair| {
            let c_g2 = *g2 * pair[0].constant();
            let right = pair.get(1).map(|sibling| {
              debug_assert_eq!(*sibling.constant(), -*pair[0].constant());
              s_pow - c_g2
            });
            core::iter::once(s_pow + c_g2).chain(right)
          })
          .collect::<Vec<_>>()
      })
      .collect::<Vec<_>>();
    let tree = BinaryTree::from_levels(levels)?;

    let auth = Self {
      num_bits: accs.num_bits(),
      tree,
    };
    debug_assert!(auth.is_valid(accs, pp));

    info!(
      elapsed_ms = %auth_t.elapsed().as_millis(),
      max_level = max_level,
      "auth_accumulator_tree"
    );
    Ok(auth)
  }

  /// Checks every commitment at `(k, i)` against $g_2^{s^{2^k}} - \omega^{bitrev(i)} \cdot g_2$
  pub fn is_valid(&self, accs: &AccumulatorTree<E::Scalar>, pp: &PublicParams<E>) -> bool {
    self.tree.preorder().all(|(k, idx)| {
      let expected =
        pp.g2_powers()[1 << k] - *pp.g2() * accs.omegas()[idx.bit_reverse(self.num_bits)];
      let ok = *self.tree.get(k, idx) == expected;
      if !ok {
        debug!(level = k, idx = idx, "accumulator commitment mismatch");
      }
      ok
    })
  }

  /// Returns the highest committed level, $\lfloor\log_2(t-1)\rfloor$
  pub fn max_level(&self) -> usize {
    self.tree.max_level()
  }

  /// Returns the commitment to leaf `leaf`, i.e. to $x - \omega^{bitrev(leaf)}$
  pub fn get_leaf(&self, leaf: usize) -> &E::G2 {
    self.tree.get(0, leaf)
  }

  /// Returns the commitment at `(level, idx)`
  pub fn get(&self, level: usize, idx: usize) -> &E::G2 {
    self.tree.get(level, idx)
  }

  /// Returns the commitments on the path from leaf `leaf` to its root, leaf first
  pub fn path_from_leaf(&self, leaf: usize) -> Vec<&E::G2> {
    self.tree.path_from_leaf(leaf)
  }
}
