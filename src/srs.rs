//! This module provides the structured reference string consumed by every commitment in the crate.
//!
//! `PublicParams` holds $g_1^{s^i}$ and $g_2^{s^i}$ for $i \in [0, q]$. The trapdoor $s$ is
//! discarded by [`PublicParams::setup`]; the constructors that retain it are only compiled
//! for tests or with the `simulate` feature.
use crate::{errors::AmtError, start_span, traits::Engine};
use ff::Field;
use group::Group;
use rand_core::RngCore;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, info_span};

/// Powers of a secret trapdoor $s$ in both source groups
#[derive(Clone, Debug)]
pub struct PublicParams<E: Engine> {
  g1_powers: Vec<E::G1>,
  g1_bases: Vec<E::G1Affine>,
  g2_powers: Vec<E::G2>,
  #[cfg(any(test, feature = "simulate"))]
  trapdoor: Option<E::Scalar>,
}

fn powers_of<F: Field>(s: &F, q: usize) -> Vec<F> {
  core::iter::successors(Some(F::ONE), |p| Some(*p * s))
    .take(q + 1)
    .collect()
}

impl<E: Engine> PublicParams<E> {
  /// Samples a trapdoor and returns the powers $s^0, \ldots, s^q$ in G1 and G2.
  /// The trapdoor is dropped before returning.
  pub fn setup<R: RngCore + ?Sized>(q: usize, rng: &mut R) -> Self {
    let s = E::Scalar::random(&mut *rng);
    Self::from_trapdoor(&s, q)
  }

  fn from_trapdoor(s: &E::Scalar, q: usize) -> Self {
    let (_setup_span, setup_t) = start_span!("srs_setup", q = q);

    let exponents = powers_of(s, q);
    let g1 = E::G1::generator();
    let g2 = E::G2::generator();

    let (g1_powers, g2_powers): (Vec<E::G1>, Vec<E::G2>) = rayon::join(
      || exponents.par_iter().map(|e| g1 * e).collect(),
      || exponents.par_iter().map(|e| g2 * e).collect(),
    );
    let g1_bases = E::batch_normalize_g1(&g1_powers);

    info!(elapsed_ms = %setup_t.elapsed().as_millis(), q = q, "srs_setup");
    Self {
      g1_powers,
      g1_bases,
      g2_powers,
      #[cfg(any(test, feature = "simulate"))]
      trapdoor: None,
    }
  }

  /// Wraps externally generated powers, e.g. the output of a ceremony.
  ///
  /// `g1_powers[0]` and `g2_powers[0]` are taken to be the generators.
  ///
  /// # Errors
  /// Returns `AmtError::InvalidInputLength` if the two vectors are empty or differ in length.
  pub fn from_powers(g1_powers: Vec<E::G1>, g2_powers: Vec<E::G2>) -> Result<Self, AmtError> {
    if g1_powers.is_empty() || g1_powers.len() != g2_powers.len() {
      return Err(AmtError::InvalidInputLength {
        expected: g1_powers.len().max(1),
        actual: g2_powers.len(),
      });
    }
    let g1_bases = E::batch_normalize_g1(&g1_powers);
    Ok(Self {
      g1_powers,
      g1_bases,
      g2_powers,
      #[cfg(any(test, feature = "simulate"))]
      trapdoor: None,
    })
  }

  /// Like [`PublicParams::setup`], but keeps the trapdoor so that commitments can be
  /// computed by evaluating at $s$. Never use this outside of tests and benchmarks.
  #[cfg(any(test, feature = "simulate"))]
  pub fn setup_with_trapdoor<R: RngCore + ?Sized>(q: usize, rng: &mut R) -> Self {
    let s = E::Scalar::random(&mut *rng);
    let mut pp = Self::from_trapdoor(&s, q);
    pp.trapdoor = Some(s);
    pp
  }

  /// Returns the trapdoor if these parameters were built with [`PublicParams::setup_with_trapdoor`]
  #[cfg(any(test, feature = "simulate"))]
  pub fn trapdoor(&self) -> Option<&E::Scalar> {
    self.trapdoor.as_ref()
  }

  /// Returns $q$, the highest power of $s$ available
  pub fn max_degree(&self) -> usize {
    self.g1_powers.len() - 1
  }

  /// Checks that powers up to `degree` are available.
  ///
  /// # Errors
  /// Returns `AmtError::InsufficientParameters` otherwise.
  pub fn ensure_degree(&self, degree: usize) -> Result<(), AmtError> {
    if degree > self.max_degree() {
      return Err(AmtError::InsufficientParameters {
        required: degree,
        available: self.max_degree(),
      });
    }
    Ok(())
  }

  /// Returns the G1 generator $g_1$
  pub fn g1(&self) -> &E::G1 {
    &self.g1_powers[0]
  }

  /// Returns the G2 generator $g_2$
  pub fn g2(&self) -> &E::G2 {
    &self.g2_powers[0]
  }

  /// Returns $g_1^{s^i}$ for all $i$
  pub fn g1_powers(&self) -> &[E::G1] {
    &self.g1_powers
  }

  /// Returns the affine form of `g1_powers`, used as MSM bases
  pub fn g1_bases(&self) -> &[E::G1Affine] {
    &self.g1_bases
  }

  /// Returns $g_2^{s^i}$ for all $i$
  pub fn g2_powers(&self) -> &[E::G2] {
    &self.g2_powers
  }

  /// Checks with pairings that consecutive entries differ by the same factor $s$ in both groups,
  /// i.e. $e(g_1^{s^{i+1}}, g_2) = e(g_1^{s^i}, g_2^s)$ and symmetrically in G2.
  /// Intended for parameters obtained through [`PublicParams::from_powers`].
  pub fn is_well_formed(&self) -> bool {
    if self.max_degree() == 0 {
      return true;
    }
    let (g1, g2) = (self.g1(), self.g2());
    let (g1_s, g2_s) = (&self.g1_powers[1], &self.g2_powers[1]);

    E::pairing(g1_s, g2) == E::pairing(g1, g2_s)
      && self
        .g1_powers
        .windows(2)
        .all(|w| E::pairing(&w[1], g2) == E::pairing(&w[0], g2_s))
      && self
        .g2_powers
        .windows(2)
        .all(|w| E::pairing(g1, &w[1]) == E::pairing(g1_s, &w[0]))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::provider::Bn254Engine;
  use rand::{SeedableRng, rngs::StdRng};

  type E = Bn254Engine;

  #[test]
  fn test_setup() {
    let mut rng = StdRng::seed_from_u64(1);
    let pp = PublicParams::<E>::setup_with_trapdoor(6, &mut rng);
    let s = *pp.trapdoor().unwrap();

    assert_eq!(pp.max_degree(), 6);
    assert_eq!(pp.g1_bases().len(), 7);
    for (i, (p1, p2)) in pp.g1_powers().iter().zip(pp.g2_powers()).enumerate() {
      let e = s.pow_vartime([i as u64]);
      assert_eq!(*p1, *pp.g1() * e);
      assert_eq!(*p2, *pp.g2() * e);
    }
    assert!(pp.is_well_formed());
    assert!(PublicParams::<E>::setup(3, &mut rng).trapdoor().is_none());
  }

  #[test]
  fn test_ensure_degree() {
    let mut rng = StdRng::seed_from_u64(2);
    let pp = PublicParams::<E>::setup(4, &mut rng);
    assert!(pp.ensure_degree(4).is_ok());
    assert_eq!(
      pp.ensure_degree(5),
      Err(AmtError::InsufficientParameters {
        required: 5,
        available: 4
      })
    );
  }

  #[test]
  fn test_from_powers() {
    let mut rng = StdRng::seed_from_u64(3);
    let pp = PublicParams::<E>::setup(3, &mut rng);

    let copy =
      PublicParams::<E>::from_powers(pp.g1_powers().to_vec(), pp.g2_powers().to_vec()).unwrap();
    assert!(copy.is_well_formed());
    assert_eq!(copy.g1_bases(), pp.g1_bases());

    assert!(PublicParams::<E>::from_powers(vec![], vec![]).is_err());
    assert!(
      PublicParams::<E>::from_powers(pp.g1_powers().to_vec(), pp.g2_powers()[..2].to_vec())
        .is_err()
    );

    // swapping two powers breaks the chain
    let mut g1_powers = pp.g1_powers().to_vec();
    g1_powers.swap(2, 3);
    let bad = PublicParams::<E>::from_powers(g1_powers, pp.g2_powers().to_vec()).unwrap();
    assert!(!bad.is_well_formed());
  }
}
