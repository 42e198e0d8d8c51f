//! Single-point KZG commitments over [`PublicParams`].
//!
//! The AMT only proves evaluations at roots of unity; the dealer's secret $f(0)$ is
//! proven with an ordinary KZG opening at zero, implemented here.
use crate::{errors::AmtError, polys::univariate::UniPoly, srs::PublicParams, traits::Engine};
use group::Group;

/// Commits to `poly` as $g_1^{poly(s)}$ through an MSM over the G1 powers.
///
/// # Errors
/// Returns `AmtError::InsufficientParameters` if `poly` has more coefficients than there are powers.
pub fn commit<E: Engine>(
  pp: &PublicParams<E>,
  poly: &UniPoly<E::Scalar>,
) -> Result<E::G1, AmtError> {
  if poly.is_empty() {
    return Ok(E::G1::identity());
  }
  pp.ensure_degree(poly.len() - 1)?;
  E::msm_g1(poly.coeffs(), &pp.g1_bases()[..poly.len()])
}

/// Commits to `poly` by evaluating it at the trapdoor. Produces exactly the output of [`commit`].
///
/// # Errors
/// Returns `AmtError::MissingTrapdoor` if `pp` was not built with its trapdoor, and
/// `AmtError::InsufficientParameters` as [`commit`] does.
#[cfg(any(test, feature = "simulate"))]
pub fn commit_simulated<E: Engine>(
  pp: &PublicParams<E>,
  poly: &UniPoly<E::Scalar>,
) -> Result<E::G1, AmtError> {
  let s = pp.trapdoor().ok_or(AmtError::MissingTrapdoor)?;
  if !poly.is_empty() {
    pp.ensure_degree(poly.len() - 1)?;
  }
  Ok(*pp.g1() * poly.evaluate(s))
}

/// Opens `poly` at `z`, returning the proof $g_1^{q(s)}$ for $q = (poly - poly(z)) / (x - z)$
/// and the value $poly(z)$.
///
/// # Errors
/// Returns `AmtError::EmptyPolynomial` for an empty `poly`.
pub fn open<E: Engine>(
  pp: &PublicParams<E>,
  poly: &UniPoly<E::Scalar>,
  z: &E::Scalar,
) -> Result<(E::G1, E::Scalar), AmtError> {
  let (quotient, value) = poly.divide_by_linear(z)?;
  Ok((commit(pp, &quotient)?, value))
}

/// Checks that `comm` opens to `value` at `z`
///
/// # Errors
/// Returns `AmtError::InsufficientParameters` if `pp` lacks $g_2^s$.
pub fn verify<E: Engine>(
  pp: &PublicParams<E>,
  comm: &E::G1,
  z: &E::Scalar,
  value: &E::Scalar,
  proof: &E::G1,
) -> Result<bool, AmtError> {
  verify_committed_value(pp, comm, z, &(*pp.g1() * value), proof)
}

/// Like [`verify`], but the value is only known as the commitment $g_1^{value}$:
/// checks $e(comm - value\_comm, g_2) = e(proof, g_2^s - z \cdot g_2)$.
///
/// # Errors
/// Returns `AmtError::InsufficientParameters` if `pp` lacks $g_2^s$.
pub fn verify_committed_value<E: Engine>(
  pp: &PublicParams<E>,
  comm: &E::G1,
  z: &E::Scalar,
  value_comm: &E::G1,
  proof: &E::G1,
) -> Result<bool, AmtError> {
  pp.ensure_degree(1)?;
  let shifted = pp.g2_powers()[1] - *pp.g2() * z;
  Ok(E::pairing(&(*comm - value_comm), pp.g2()) == E::pairing(proof, &shifted))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::provider::Bn254Engine;
  use ff::Field;
  use rand::{SeedableRng, rngs::StdRng};

  type E = Bn254Engine;
  type Fr = <E as Engine>::Scalar;

  #[test]
  fn test_commit_matches_simulated() {
    let mut rng = StdRng::seed_from_u64(7);
    let pp = PublicParams::<E>::setup_with_trapdoor(10, &mut rng);
    for len in [0, 1, 2, 5, 11] {
      let poly = UniPoly::<Fr>::random(len, &mut rng);
      assert_eq!(
        commit(&pp, &poly).unwrap(),
        commit_simulated(&pp, &poly).unwrap()
      );
    }

    let too_long = UniPoly::<Fr>::random(12, &mut rng);
    assert!(matches!(
      commit(&pp, &too_long),
      Err(AmtError::InsufficientParameters { .. })
    ));
    let no_trapdoor = PublicParams::<E>::setup(3, &mut rng);
    assert_eq!(
      commit_simulated(&no_trapdoor, &UniPoly::random(2, &mut rng)),
      Err(AmtError::MissingTrapdoor)
    );
  }

  #[test]
  fn test_open_verify() {
    let mut rng = StdRng::seed_from_u64(8);
    let pp = PublicParams::<E>::setup(8, &mut rng);
    let poly = UniPoly::<Fr>::random(6, &mut rng);
    let comm = commit(&pp, &poly).unwrap();

    for z in [Fr::ZERO, Fr::ONE, Fr::random(&mut rng)] {
      let (proof, value) = open(&pp, &poly, &z).unwrap();
      assert_eq!(value, poly.evaluate(&z));
      assert!(verify(&pp, &comm, &z, &value, &proof).unwrap());
      assert!(!verify(&pp, &comm, &z, &(value + Fr::ONE), &proof).unwrap());
      assert!(!verify(&pp, &(comm + pp.g1()), &z, &value, &proof).unwrap());
      assert!(
        verify_committed_value(&pp, &comm, &z, &(*pp.g1() * value), &proof).unwrap()
      );
    }
  }
}
