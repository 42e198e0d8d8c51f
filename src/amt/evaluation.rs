// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the amtvss project.
// See the LICENSE file in the project root for full license information.

//! Fast multipoint evaluation at roots of unity, and the commitments that turn it into proofs.
//!
//! [`RootsOfUnityEvaluation`] divides $f$ by the accumulators at its root level, then divides
//! every node's parent remainder by the node's own accumulator, all the way down to the leaves.
//! Each leaf remainder is a constant $f(\omega^{bitrev(i)})$. The quotients along the path from
//! a leaf satisfy
//! $$
//! f(x) = f(\omega^i) + \sum_k q_k(x) \cdot a_k(x)
//! $$
//! so their commitments, held by [`AuthRootsOfUnityEvaluation`], form an evaluation proof.
use crate::{
  amt::{accumulator::AccumulatorTree, tree::BinaryTree},
  errors::AmtError,
  kzg,
  math::Math,
  polys::univariate::UniPoly,
  srs::PublicParams,
  start_span,
  traits::Engine,
};
use ff::PrimeField;
use group::Group;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, info_span};

/// The quotient and remainder stored at every node of an evaluation tree
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalNode<Scalar: PrimeField> {
  /// The quotient of the parent's remainder by this node's accumulator
  pub quotient: UniPoly<Scalar>,
  /// The remainder of the parent's remainder by this node's accumulator
  pub remainder: UniPoly<Scalar>,
}

impl<Scalar: PrimeField> EvalNode<Scalar> {
  fn divide(
    dividend: &UniPoly<Scalar>,
    accs: &AccumulatorTree<Scalar>,
    k: usize,
    idx: usize,
  ) -> Result<Self, AmtError> {
    let (quotient, remainder) = dividend.divide_by_xnc(accs.get(k, idx))?;
    Ok(Self {
      quotient,
      remainder,
    })
  }
}

/// The multipoint evaluation tree of one polynomial over an [`AccumulatorTree`]
#[derive(Clone, Debug)]
pub struct RootsOfUnityEvaluation<'a, Scalar: PrimeField> {
  accs: &'a AccumulatorTree<Scalar>,
  tree: BinaryTree<EvalNode<Scalar>>,
}

impl<'a, Scalar: PrimeField> RootsOfUnityEvaluation<'a, Scalar> {
  /// Evaluates `poly` at the first `accs.num_points()` roots of unity.
  ///
  /// The tree is rooted at level $\min(\lfloor\log_2 \deg\rfloor, \log_2 N)$ where
  /// $\deg$ = `poly.len() - 1`, so lower degree polynomials need fewer divisions.
  ///
  /// # Errors
  /// Returns `AmtError::EmptyPolynomial` if `poly` has no coefficients.
  pub fn new(poly: &UniPoly<Scalar>, accs: &'a AccumulatorTree<Scalar>) -> Result<Self, AmtError> {
    if poly.is_empty() {
      return Err(AmtError::EmptyPolynomial);
    }
    let degree = poly.len() - 1;
    let root_level = if degree == 0 {
      0
    } else {
      degree.log_2_floor().min(accs.num_levels() - 1)
    };

    let (_eval_span, eval_t) = start_span!(
      "roots_of_unity_evaluation",
      n = accs.num_points(),
      degree = degree,
      root_level = root_level
    );

    let num_points = accs.num_points();
    let num_bits = accs.num_bits();

    let roots = (0..accs.tree().level(root_level).len())
      .into_par_iter()
      .map(|idx| EvalNode::divide(poly, accs, root_level, idx))
      .collect::<Result<Vec<_>, _>>()?;

    // each level only depends on the one above it
    let mut levels = vec![roots];
    for k in (0..root_level).rev() {
      let parents = &levels[levels.len() - 1];
      let level = (0..accs.tree().level(k).len())
        .into_par_iter()
        .map(|idx| {
          if k == 0 && idx.bit_reverse(num_bits) >= num_points {
            return Ok(EvalNode::default());
          }
          EvalNode::divide(&parents[idx / 2].remainder, accs, k, idx)
        })
        .collect::<Result<Vec<_>, _>>()?;
      levels.push(level);
    }
    levels.reverse();

    let eval = Self {
      accs,
      tree: BinaryTree::from_levels(levels)?,
    };
    debug_assert!(eval.is_consistent());

    info!(elapsed_ms = %eval_t.elapsed().as_millis(), n = num_points, "roots_of_unity_evaluation");
    Ok(eval)
  }

  /// Returns true if leaf `leaf` stands for a point beyond `n` and was not evaluated
  pub fn is_padding_leaf(&self, leaf: usize) -> bool {
    leaf.bit_reverse(self.accs.num_bits()) >= self.accs.num_points()
  }

  /// Returns $f(\omega^i)$ for every $i$ in `0..n`, in natural order
  pub fn evaluations(&self) -> Vec<Scalar> {
    let num_bits = self.accs.num_bits();
    (0..self.accs.num_points())
      .map(|i| {
        let leaf = self.tree.get(0, i.bit_reverse(num_bits));
        debug_assert!(leaf.remainder.len() <= 1);
        leaf.remainder.eval_at_zero()
      })
      .collect()
  }

  /// Returns the highest level, i.e. the level of the roots
  pub fn root_level(&self) -> usize {
    self.tree.max_level()
  }

  /// Returns the node at `(level, idx)`
  pub fn get(&self, level: usize, idx: usize) -> &EvalNode<Scalar> {
    self.tree.get(level, idx)
  }

  /// Returns the accumulator tree this evaluation was computed over
  pub fn accumulators(&self) -> &'a AccumulatorTree<Scalar> {
    self.accs
  }

  /// Returns the underlying tree
  pub fn tree(&self) -> &BinaryTree<EvalNode<Scalar>> {
    &self.tree
  }

  /// Checks that every parent remainder equals `accumulator * quotient + remainder`
  /// at each of its children, skipping padding leaves.
  pub fn is_consistent(&self) -> bool {
    self
      .tree
      .preorder()
      .filter(|(k, idx)| *k < self.root_level() && !(*k == 0 && self.is_padding_leaf(*idx)))
      .all(|(k, idx)| {
        let node = self.tree.get(k, idx);
        let parent = self.tree.get(k + 1, idx / 2);
        let recombined = &self.accs.get(k, idx).to_dense().mul(&node.quotient) + &node.remainder;
        let ok = parent.remainder == recombined;
        if !ok {
          debug!(level = k, idx = idx, "evaluation tree is inconsistent");
        }
        ok
      })
  }

  /// Adds `other` node by node, so that self becomes the evaluation tree of the sum
  /// of both polynomials.
  ///
  /// # Errors
  /// Returns `AmtError::MismatchedTrees` if the trees were built over different points
  /// or have different root levels.
  pub fn add_assign(&mut self, other: &Self) -> Result<(), AmtError> {
    if self.accs.num_points() != other.accs.num_points() || !self.tree.same_shape(&other.tree) {
      return Err(AmtError::MismatchedTrees);
    }
    for k in 0..self.tree.num_levels() {
      for idx in 0..self.tree.level(k).len() {
        let rhs = other.tree.get(k, idx);
        let node = self.tree.get_mut(k, idx);
        node.quotient += &rhs.quotient;
        node.remainder += &rhs.remainder;
      }
    }
    Ok(())
  }
}

/// Commitments in G1 to every quotient of a [`RootsOfUnityEvaluation`]
#[derive(Clone, Debug)]
pub struct AuthRootsOfUnityEvaluation<E: Engine> {
  num_points: usize,
  num_bits: usize,
  tree: BinaryTree<E::G1>,
}

impl<E: Engine> AuthRootsOfUnityEvaluation<E> {
  /// Commits to every quotient with an MSM over the G1 powers of `pp`.
  ///
  /// # Errors
  /// Returns `AmtError::InsufficientParameters` if a quotient is longer than `pp` allows.
  pub fn new(
    eval: &RootsOfUnityEvaluation<'_, E::Scalar>,
    pp: &PublicParams<E>,
  ) -> Result<Self, AmtError> {
    Self::authenticate(eval, |quotient| kzg::commit(pp, quotient))
  }

  /// Commits to every quotient $q$ as $q(s) \cdot g_1$ using the trapdoor of `pp`.
  /// The commitments are identical to those of [`AuthRootsOfUnityEvaluation::new`].
  ///
  /// # Errors
  /// Returns `AmtError::MissingTrapdoor` if `pp` carries no trapdoor.
  #[cfg(any(test, feature = "simulate"))]
  pub fn new_simulated(
    eval: &RootsOfUnityEvaluation<'_, E::Scalar>,
    pp: &PublicParams<E>,
  ) -> Result<Self, AmtError> {
    Self::authenticate(eval, |quotient| kzg::commit_simulated(pp, quotient))
  }

  fn authenticate<F>(
    eval: &RootsOfUnityEvaluation<'_, E::Scalar>,
    commit: F,
  ) -> Result<Self, AmtError>
  where
    F: Fn(&UniPoly<E::Scalar>) -> Result<E::G1, AmtError> + Sync,
  {
    let (_auth_span, auth_t) = start_span!(
      "auth_roots_of_unity_evaluation",
      levels = eval.tree().num_levels()
    );

    let tree = eval.tree().try_par_map(|k, idx, node| {
      if k == 0 && eval.is_padding_leaf(idx) {
        return Ok(E::G1::identity());
      }
      commit(&node.quotient)
    })?;

    info!(elapsed_ms = %auth_t.elapsed().as_millis(), "auth_roots_of_unity_evaluation");
    Ok(Self {
      num_points: eval.accumulators().num_points(),
      num_bits: eval.accumulators().num_bits(),
      tree,
    })
  }

  /// Returns the number of points `n` the proofs cover
  pub fn num_points(&self) -> usize {
    self.num_points
  }

  /// Returns the highest level
  pub fn max_level(&self) -> usize {
    self.tree.max_level()
  }

  /// Returns the quotient commitment at `(level, idx)`
  pub fn get(&self, level: usize, idx: usize) -> &E::G1 {
    self.tree.get(level, idx)
  }

  /// Returns the quotient commitments on the path of $\omega^{id}$, leaf first
  ///
  /// # Errors
  /// Returns `AmtError::UnknownPlayer` if `id >= n`.
  pub fn path_for_id(&self, id: usize) -> Result<Vec<E::G1>, AmtError> {
    if id >= self.num_points {
      return Err(AmtError::UnknownPlayer {
        id,
        n: self.num_points,
      });
    }
    Ok(
      self
        .tree
        .path_from_leaf(id.bit_reverse(self.num_bits))
        .into_iter()
        .copied()
        .collect(),
    )
  }
}
