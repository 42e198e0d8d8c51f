//! Parameters shared by every participant of one `(t, n)` run.
use crate::{
  amt::{AccumulatorTree, AmtVerifierKey, AuthAccumulatorTree},
  errors::AmtError,
  math::Math,
  srs::PublicParams,
  start_span,
  traits::Engine,
};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Instant};
use tracing::{info, info_span};

/// A threshold configuration: any `t` of the `n` participants can reconstruct
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DkgConfig {
  /// The reconstruction threshold
  pub t: usize,
  /// The number of participants
  pub n: usize,
}

impl DkgConfig {
  /// Creates a configuration, see [`DkgConfig::validate`]
  pub fn new(t: usize, n: usize) -> Result<Self, AmtError> {
    let config = Self { t, n };
    config.validate()?;
    Ok(config)
  }

  /// Checks `2 <= t <= n`.
  ///
  /// # Errors
  /// Returns `AmtError::InvalidThreshold` otherwise.
  pub fn validate(&self) -> Result<(), AmtError> {
    if self.t < 2 || self.t > self.n {
      return Err(AmtError::InvalidThreshold {
        t: self.t,
        n: self.n,
      });
    }
    Ok(())
  }

  /// Returns $N$ = `nextPow2(n)`
  pub fn num_leaves(&self) -> usize {
    self.n.next_power_of_two()
  }

  /// Returns the highest power of $s$ the public parameters must provide, $\max(t-1, N)$
  pub fn required_degree(&self) -> usize {
    (self.t - 1).max(self.num_leaves())
  }
}

/// Public parameters of a run: the SRS, the accumulator trees over the $N$-th roots of
/// unity and the AMT verifier key. Built once and shared by all participants.
#[derive(Clone, Debug)]
pub struct DkgParams<E: Engine> {
  config: DkgConfig,
  pp: Arc<PublicParams<E>>,
  accs: Arc<AccumulatorTree<E::Scalar>>,
  vk: AmtVerifierKey<E>,
}

impl<E: Engine> DkgParams<E> {
  /// Sets up a `t` out of `n` run over `pp`.
  ///
  /// # Errors
  /// Returns `AmtError::InvalidThreshold` unless `2 <= t <= n`, and
  /// `AmtError::InsufficientParameters` if `pp` has fewer than $\max(t-1, N)$ powers.
  pub fn new(t: usize, n: usize, pp: Arc<PublicParams<E>>) -> Result<Self, AmtError> {
    let config = DkgConfig::new(t, n)?;
    pp.ensure_degree(config.required_degree())?;

    let (_params_span, params_t) = start_span!("dkg_params", t = t, n = n);
    let accs = Arc::new(AccumulatorTree::new(n)?);
    let auth_accs = Arc::new(AuthAccumulatorTree::new(&accs, &pp, t)?);
    let vk = AmtVerifierKey::new(auth_accs, &pp, n)?;
    info!(elapsed_ms = %params_t.elapsed().as_millis(), t = t, n = n, "dkg_params");

    Ok(Self {
      config,
      pp,
      accs,
      vk,
    })
  }

  /// Returns the `(t, n)` configuration
  pub fn config(&self) -> &DkgConfig {
    &self.config
  }

  /// Returns the threshold `t`
  pub fn t(&self) -> usize {
    self.config.t
  }

  /// Returns the number of participants `n`
  pub fn n(&self) -> usize {
    self.config.n
  }

  /// Returns $\log_2 N$
  pub fn num_bits(&self) -> usize {
    self.accs.num_bits()
  }

  /// Returns the highest level of the authenticated accumulator tree, $\lfloor\log_2(t-1)\rfloor$
  pub fn max_level(&self) -> usize {
    self.vk.auth_accs().max_level()
  }

  /// Returns all $N$ powers of the primitive $N$-th root of unity
  pub fn omegas(&self) -> &[E::Scalar] {
    self.accs.omegas()
  }

  /// Returns $\omega^{id}$, the point at which participant `id`'s shares are evaluated
  ///
  /// # Errors
  /// Returns `AmtError::UnknownPlayer` if `id >= n`.
  pub fn evaluation_point(&self, id: usize) -> Result<E::Scalar, AmtError> {
    self.check_id(id)?;
    Ok(self.omegas()[id])
  }

  /// Returns the commitment $g_2^{s - \omega^{id}}$ to the monomial of participant `id`
  ///
  /// # Errors
  /// Returns `AmtError::UnknownPlayer` if `id >= n`.
  pub fn monomial_commitment(&self, id: usize) -> Result<&E::G2, AmtError> {
    self.check_id(id)?;
    Ok(self.vk.auth_accs().get_leaf(id.bit_reverse(self.num_bits())))
  }

  /// Returns $e(g_1, g_2)$
  pub fn gt(&self) -> &E::Gt {
    self.vk.gt()
  }

  /// Returns the structured reference string
  pub fn public_params(&self) -> &PublicParams<E> {
    &self.pp
  }

  /// Returns the accumulator tree over the $N$-th roots of unity
  pub fn accumulators(&self) -> &AccumulatorTree<E::Scalar> {
    &self.accs
  }

  /// Returns the key used to check AMT and zero proofs
  pub fn verifier_key(&self) -> &AmtVerifierKey<E> {
    &self.vk
  }

  pub(crate) fn check_id(&self, id: usize) -> Result<(), AmtError> {
    if id >= self.n() {
      return Err(AmtError::UnknownPlayer { id, n: self.n() });
    }
    Ok(())
  }
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
  fn test_config_validation() {
    assert!(DkgConfig::new(2, 2).is_ok());
    assert!(DkgConfig::new(3, 5).is_ok());
    assert_eq!(
      DkgConfig::new(1, 5),
      Err(AmtError::InvalidThreshold { t: 1, n: 5 })
    );
    assert_eq!(
      DkgConfig::new(6, 5),
      Err(AmtError::InvalidThreshold { t: 6, n: 5 })
    );
    assert_eq!(DkgConfig::new(3, 5).unwrap().required_degree(), 8);
    assert_eq!(DkgConfig::new(9, 9).unwrap().required_degree(), 16);
  }

  #[test]
  fn test_params() {
    let mut rng = StdRng::seed_from_u64(30);
    let pp = Arc::new(PublicParams::<E>::setup_with_trapdoor(8, &mut rng));
    let s = *pp.trapdoor().unwrap();
    let params = DkgParams::new(3, 5, pp.clone()).unwrap();

    assert_eq!(params.num_bits(), 3);
    assert_eq!(params.max_level(), 1);
    assert_eq!(params.omegas().len(), 8);
    assert_eq!(*params.gt(), E::pairing(pp.g1(), pp.g2()));

    for id in 0..5 {
      let omega = params.evaluation_point(id).unwrap();
      assert_eq!(omega.pow_vartime([8u64]), Fr::ONE);
      assert_eq!(*params.monomial_commitment(id).unwrap(), *pp.g2() * (s - omega));
    }
    assert_eq!(
      params.evaluation_point(5),
      Err(AmtError::UnknownPlayer { id: 5, n: 5 })
    );
  }

  #[test]
  fn test_insufficient_parameters() {
    let mut rng = StdRng::seed_from_u64(31);
    let pp = Arc::new(PublicParams::<E>::setup(4, &mut rng));
    assert_eq!(
      DkgParams::new(3, 5, pp).err(),
      Some(AmtError::InsufficientParameters {
        required: 8,
        available: 4
      })
    );
  }
}
