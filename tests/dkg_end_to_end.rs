use amtvss::{
  AmtPlayer, DkgParams, PlayerMode, PlayerState, PublicParams,
  lagrange::interpolate_at_zero,
  provider::Bn254Engine as E,
  traits::{Engine, player::Player},
};
use ff::Field;
use rand::{SeedableRng, rngs::StdRng, seq::index::sample};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

type Fr = <E as Engine>::Scalar;

fn init_logging() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}

fn random_subset(t: usize, n: usize, rng: &mut StdRng) -> Vec<usize> {
  let mut subset = sample(rng, n, t).into_vec();
  subset.sort_unstable();
  subset
}

/// Deals (every player in DKG mode, player 0 in VSS mode), verifies, then lets player 0
/// reconstruct its own secret from a worst-case and a best-case subset.
fn run_scheme(params: &Arc<DkgParams<E>>, mode: PlayerMode, rng: &mut StdRng) {
  let (t, n) = (params.t(), params.n());
  let mut players: Vec<_> = (0..n)
    .map(|id| AmtPlayer::new(params.clone(), id, mode).unwrap())
    .collect();

  match mode {
    PlayerMode::Dkg => {
      let dealings: Vec<_> = players.iter_mut().map(|p| p.deal(&mut *rng).unwrap()).collect();
      for p in players.iter_mut() {
        assert!(p.verify_other_players(&dealings, false).unwrap());
        assert!(p.verify_other_players(&dealings, true).unwrap());
      }
      for p in players.iter() {
        assert!(p.verify_final_share_proof().unwrap());
      }

      let joint_secret = players
        .iter()
        .fold(Fr::ZERO, |acc, p| acc + p.secret().unwrap());
      let subset = random_subset(t, n, rng);
      let final_shares: Vec<_> = subset
        .iter()
        .map(|id| *players[*id].final_share().unwrap())
        .collect();
      assert_eq!(
        interpolate_at_zero(params.omegas(), &subset, &final_shares).unwrap(),
        joint_secret
      );
    }
    PlayerMode::Vss => {
      players[0].deal(rng).unwrap();
      let dealing = players[0].deal(rng).unwrap();
      for p in players.iter_mut() {
        assert!(p.verify_other_players(std::slice::from_ref(&dealing), false).unwrap());
        assert_eq!(p.state(), PlayerState::Verified);
      }
    }
  }

  let reconstructor = &mut players[0];
  let secret = reconstructor.secret().unwrap();

  let subset = random_subset(t, n, rng);
  assert!(reconstructor.reconstruction_verify(&subset, false).unwrap());
  assert_eq!(reconstructor.interpolate(&subset).unwrap(), secret);

  let subset = random_subset(t, n, rng);
  assert!(reconstructor.reconstruction_verify(&subset, true).unwrap());
  assert_eq!(reconstructor.interpolate(&subset).unwrap(), secret);
  assert_eq!(reconstructor.state(), PlayerState::Reconstructed);
}

#[test]
fn three_out_of_five() {
  init_logging();
  let mut rng = StdRng::seed_from_u64(200);
  let pp = Arc::new(PublicParams::<E>::setup(8, &mut rng));
  let params = Arc::new(DkgParams::new(3, 5, pp).unwrap());

  run_scheme(&params, PlayerMode::Dkg, &mut rng);
  run_scheme(&params, PlayerMode::Vss, &mut rng);
}

#[test]
fn all_small_thresholds() {
  init_logging();
  let max_t = 4;
  let mut rng = StdRng::seed_from_u64(201);
  let pp = Arc::new(PublicParams::<E>::setup(8, &mut rng));

  for t in 2..=max_t {
    for n in t..=max_t + 1 {
      let params = Arc::new(DkgParams::new(t, n, pp.clone()).unwrap());
      for mode in [PlayerMode::Dkg, PlayerMode::Vss] {
        run_scheme(&params, mode, &mut rng);
      }
    }
  }
}

#[test]
fn reconstruction_rejects_out_of_range_subset() {
  let mut rng = StdRng::seed_from_u64(202);
  let pp = Arc::new(PublicParams::<E>::setup(4, &mut rng));
  let params = Arc::new(DkgParams::new(2, 3, pp).unwrap());
  let mut dealer = AmtPlayer::new(params, 0, PlayerMode::Vss).unwrap();
  dealer.deal(&mut rng).unwrap();

  let err = dealer.reconstruction_verify(&[1, 3], true).unwrap_err();
  assert_eq!(err.to_string(), "InvalidSubset: id 3 is not below n = 3");
}
