//! AMT evaluation proofs and their verification.
//!
//! A proof for $f(\omega^{id})$ is the list of quotient commitments on the path from leaf
//! `bitrev(id)` to its root. It is checked as
//! $$
//! e(C, g_2) = e(g_1, g_2)^{f(\omega^{id})} \cdot \prod_k e(g_1^{q_k(s)}, g_2^{a_k(s)})
//! $$
//! which costs one GT exponentiation instead of the pairing $e(C / g_1^{f(\omega^{id})}, g_2)$.
use crate::{
  amt::{accumulator::AuthAccumulatorTree, evaluation::AuthRootsOfUnityEvaluation},
  errors::AmtError,
  math::Math,
  srs::PublicParams,
  traits::Engine,
};
use core::ops::{Add, AddAssign};
use group::Group;
use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, error};

/// An AMT proof: quotient commitments from leaf (index 0) to root
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct AmtProof<E: Engine> {
  quotient_commitments: Vec<E::G1>,
}

impl<E: Engine> Default for AmtProof<E> {
  fn default() -> Self {
    Self::new(Vec::new())
  }
}

impl<E: Engine> AmtProof<E> {
  /// Wraps quotient commitments ordered leaf first
  pub fn new(quotient_commitments: Vec<E::G1>) -> Self {
    Self {
      quotient_commitments,
    }
  }

  /// Returns the quotient commitments, leaf first
  pub fn quotient_commitments(&self) -> &[E::G1] {
    &self.quotient_commitments
  }

  /// Returns the number of levels in the proof
  pub fn len(&self) -> usize {
    self.quotient_commitments.len()
  }

  /// Returns true for the empty proof, the identity of `+`
  pub fn is_empty(&self) -> bool {
    self.quotient_commitments.is_empty()
  }
}

/// Combines proofs for $p(\omega^i)$ and $q(\omega^i)$ into a proof for $(p+q)(\omega^i)$
impl<E: Engine> AddAssign<&AmtProof<E>> for AmtProof<E> {
  fn add_assign(&mut self, rhs: &AmtProof<E>) {
    self.quotient_commitments = self
      .quotient_commitments
      .iter()
      .zip_longest(rhs.quotient_commitments.iter())
      .map(|pair| match pair {
        EitherOrBoth::Both(a, b) => *a + b,
        EitherOrBoth::Left(a) | EitherOrBoth::Right(a) => *a,
      })
      .collect();
  }
}

impl<E: Engine> Add for &AmtProof<E> {
  type Output = AmtProof<E>;

  fn add(self, rhs: &AmtProof<E>) -> AmtProof<E> {
    let mut sum = self.clone();
    sum += rhs;
    sum
  }
}

/// Every AMT proof for one polynomial, plus the KZG proof for its value at zero
#[derive(Clone, Debug)]
pub struct AllAmtProofs<E: Engine> {
  auth_eval: AuthRootsOfUnityEvaluation<E>,
  zero_proof: E::G1,
  proof_levels: usize,
}

impl<E: Engine> AllAmtProofs<E> {
  /// Bundles the commitments of an evaluation tree with the opening proof at zero.
  /// Proofs handed out have `proof_levels` entries.
  pub fn new(
    auth_eval: AuthRootsOfUnityEvaluation<E>,
    zero_proof: E::G1,
    proof_levels: usize,
  ) -> Self {
    Self {
      auth_eval,
      zero_proof,
      proof_levels,
    }
  }

  /// Returns the AMT proof for $f(\omega^{id})$
  ///
  /// # Errors
  /// Returns `AmtError::UnknownPlayer` if `id >= n`.
  pub fn player_proof(&self, id: usize) -> Result<AmtProof<E>, AmtError> {
    let mut path = self.auth_eval.path_for_id(id)?;
    path.resize(self.proof_levels, E::G1::identity());
    Ok(AmtProof::new(path))
  }

  /// Returns the KZG proof for $f(0)$
  pub fn zero_proof(&self) -> &E::G1 {
    &self.zero_proof
  }

  /// Returns the committed evaluation tree
  pub fn auth_eval(&self) -> &AuthRootsOfUnityEvaluation<E> {
    &self.auth_eval
  }
}

/// Caches $e(g_1^{q(s)}, g_2^{a(s)})$ by tree position `(level, idx)` across the proofs of one
/// commitment. Pairings computed while checking a proof are staged and only recorded once
/// that proof verifies; a cached pairing is reused only for the same quotient commitment.
#[derive(Clone, Debug)]
pub struct PairingMemo<E: Engine> {
  entries: HashMap<(usize, usize), (E::G1, E::Gt)>,
}

impl<E: Engine> Default for PairingMemo<E> {
  fn default() -> Self {
    Self {
      entries: HashMap::new(),
    }
  }
}

impl<E: Engine> PairingMemo<E> {
  /// Creates an empty memo
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns the number of cached pairings
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns true if nothing is cached
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  fn lookup(&self, level: usize, idx: usize, quotient: &E::G1) -> Option<E::Gt> {
    self
      .entries
      .get(&(level, idx))
      .filter(|(cached, _)| cached == quotient)
      .map(|(_, pairing)| *pairing)
  }

  fn record(&mut self, staged: Vec<((usize, usize), (E::G1, E::Gt))>) {
    self.entries.extend(staged);
  }
}

/// Everything needed to check AMT and zero proofs: the accumulator commitments and
/// a handful of SRS elements.
#[derive(Clone, Debug)]
pub struct AmtVerifierKey<E: Engine> {
  auth_accs: Arc<AuthAccumulatorTree<E>>,
  num_points: usize,
  num_bits: usize,
  g1: E::G1,
  g2: E::G2,
  g2_s: E::G2,
  gt: E::Gt,
}

impl<E: Engine> AmtVerifierKey<E> {
  /// Builds the key for `num_points` points over `auth_accs`, computing $e(g_1, g_2)$ once.
  ///
  /// # Errors
  /// Returns `AmtError::InsufficientParameters` if `pp` lacks $g_2^s$.
  pub fn new(
    auth_accs: Arc<AuthAccumulatorTree<E>>,
    pp: &PublicParams<E>,
    num_points: usize,
  ) -> Result<Self, AmtError> {
    pp.ensure_degree(1)?;
    let (g1, g2) = (*pp.g1(), *pp.g2());
    Ok(Self {
      auth_accs,
      num_points,
      num_bits: num_points.next_power_of_two().log_2(),
      g1,
      g2,
      g2_s: pp.g2_powers()[1],
      gt: E::pairing(&g1, &g2),
    })
  }

  /// Returns $e(g_1, g_2)$
  pub fn gt(&self) -> &E::Gt {
    &self.gt
  }

  /// Returns the shared accumulator commitments
  pub fn auth_accs(&self) -> &AuthAccumulatorTree<E> {
    &self.auth_accs
  }

  /// Returns the number of levels every AMT proof has
  pub fn proof_levels(&self) -> usize {
    self.auth_accs.max_level() + 1
  }

  /// Returns $e(C, g_2)$, the left-hand side shared by all proofs against `comm`
  pub fn commitment_pairing(&self, comm: &E::G1) -> E::Gt {
    E::pairing(comm, &self.g2)
  }

  /// Checks an AMT proof that `comm` opens to `value` at $\omega^{id}$
  ///
  /// # Errors
  /// Returns `AmtError::UnknownPlayer` if `id >= n`.
  pub fn verify_at_id(
    &self,
    comm: &E::G1,
    proof: &AmtProof<E>,
    id: usize,
    value: &E::Scalar,
  ) -> Result<bool, AmtError> {
    self.verify_at_id_prepared(&self.commitment_pairing(comm), proof, id, value, None)
  }

  /// Like [`AmtVerifierKey::verify_at_id`], with $e(C, g_2)$ already computed and, optionally,
  /// pairings shared with previously verified proofs of the same commitment taken from `memo`.
  ///
  /// # Errors
  /// Returns `AmtError::UnknownPlayer` if `id >= n`.
  pub fn verify_at_id_prepared(
    &self,
    lhs: &E::Gt,
    proof: &AmtProof<E>,
    id: usize,
    value: &E::Scalar,
    mut memo: Option<&mut PairingMemo<E>>,
  ) -> Result<bool, AmtError> {
    if id >= self.num_points {
      return Err(AmtError::UnknownPlayer {
        id,
        n: self.num_points,
      });
    }
    if proof.len() != self.proof_levels() {
      error!(id = id, levels = proof.len(), expected = self.proof_levels(), "malformed AMT proof");
      return Ok(false);
    }

    let leaf = id.bit_reverse(self.num_bits);
    let accs = self.auth_accs.path_from_leaf(leaf);
    let mut staged = Vec::new();

    let mut rhs = self.gt * value;
    for (k, (quotient, acc)) in proof.quotient_commitments().iter().zip(accs).enumerate() {
      let idx = leaf >> k;
      // a zero quotient contributes e(1, a) = 1
      if bool::from(quotient.is_identity()) {
        debug!(id = id, level = k, "skipping zero quotient commitment");
        continue;
      }
      let pairing = match memo.as_deref().and_then(|m| m.lookup(k, idx, quotient)) {
        Some(cached) => cached,
        None => {
          let pairing = E::pairing(quotient, acc);
          staged.push(((k, idx), (*quotient, pairing)));
          pairing
        }
      };
      rhs += pairing;
    }

    if *lhs != rhs {
      error!(id = id, "AMT proof did not verify");
      return Ok(false);
    }
    if let Some(memo) = memo.as_deref_mut() {
      memo.record(staged);
    }
    Ok(true)
  }

  /// Checks a KZG proof that `comm` opens at zero to the value committed in `value_comm`:
  /// $e(C - g_1^{f(0)}, g_2) = e(\pi, g_2^s)$.
  pub fn verify_at_zero(&self, comm: &E::G1, proof: &E::G1, value_comm: &E::G1) -> bool {
    E::pairing(&(*comm - value_comm), &self.g2) == E::pairing(proof, &self.g2_s)
  }

  /// Returns $g_1^{value}$
  pub fn commit_value(&self, value: &E::Scalar) -> E::G1 {
    self.g1 * value
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    amt::{
      accumulator::AccumulatorTree,
      evaluation::{AuthRootsOfUnityEvaluation, RootsOfUnityEvaluation},
    },
    kzg,
    polys::univariate::UniPoly,
    provider::Bn254Engine,
  };
  use ff::Field;
  use rand::{SeedableRng, rngs::StdRng};

  type E = Bn254Engine;
  type Fr = <E as Engine>::Scalar;
  type G1 = <E as Engine>::G1;

  struct Fixture {
    pp: PublicParams<E>,
    vk: AmtVerifierKey<E>,
    poly: UniPoly<Fr>,
    comm: G1,
    proofs: AllAmtProofs<E>,
    shares: Vec<Fr>,
  }

  fn fixture(t: usize, n: usize, seed: u64) -> Fixture {
    let mut rng = StdRng::seed_from_u64(seed);
    let pp = PublicParams::<E>::setup(n.next_power_of_two().max(t), &mut rng);
    let accs = AccumulatorTree::<Fr>::new(n).unwrap();
    let auth_accs = Arc::new(AuthAccumulatorTree::new(&accs, &pp, t).unwrap());
    let vk = AmtVerifierKey::new(auth_accs, &pp, n).unwrap();

    let poly = UniPoly::<Fr>::random(t, &mut rng);
    let comm = kzg::commit(&pp, &poly).unwrap();
    let eval = RootsOfUnityEvaluation::new(&poly, &accs).unwrap();
    let shares = eval.evaluations();
    let auth_eval = AuthRootsOfUnityEvaluation::new(&eval, &pp).unwrap();
    let (zero_proof, _) = kzg::open(&pp, &poly, &Fr::ZERO).unwrap();
    let proofs = AllAmtProofs::new(auth_eval, zero_proof, vk.proof_levels());

    Fixture {
      pp,
      vk,
      poly,
      comm,
      proofs,
      shares,
    }
  }

  #[test]
  fn test_valid_proofs_verify() {
    for (t, n, seed) in [(2, 2, 1), (3, 5, 2), (4, 4, 3), (9, 16, 4), (11, 30, 5)] {
      let f = fixture(t, n, seed);
      for id in 0..n {
        let proof = f.proofs.player_proof(id).unwrap();
        assert_eq!(proof.len(), f.vk.proof_levels());
        assert!(f.vk.verify_at_id(&f.comm, &proof, id, &f.shares[id]).unwrap());
      }
      let secret_comm = f.vk.commit_value(&f.poly.eval_at_zero());
      assert!(f.vk.verify_at_zero(&f.comm, f.proofs.zero_proof(), &secret_comm));
    }
  }

  #[test]
  fn test_mutations_are_rejected() {
    let f = fixture(5, 8, 6);
    let id = 3;
    let proof = f.proofs.player_proof(id).unwrap();
    let value = f.shares[id];

    assert!(!f.vk.verify_at_id(&f.comm, &proof, id, &(value + Fr::ONE)).unwrap());
    assert!(!f.vk.verify_at_id(&(f.comm + f.pp.g1()), &proof, id, &value).unwrap());
    // a proof for another id
    assert!(!f.vk.verify_at_id(&f.comm, &proof, id + 1, &value).unwrap());

    for k in 0..proof.len() {
      let mut quotients = proof.quotient_commitments().to_vec();
      quotients[k] += f.pp.g1();
      assert!(!f.vk.verify_at_id(&f.comm, &AmtProof::new(quotients), id, &value).unwrap());
    }

    let mut truncated = proof.quotient_commitments().to_vec();
    truncated.pop();
    assert!(!f.vk.verify_at_id(&f.comm, &AmtProof::new(truncated), id, &value).unwrap());

    let wrong_secret = f.vk.commit_value(&(f.poly.eval_at_zero() + Fr::ONE));
    assert!(!f.vk.verify_at_zero(&f.comm, f.proofs.zero_proof(), &wrong_secret));

    assert_eq!(
      f.vk.verify_at_id(&f.comm, &proof, 8, &value),
      Err(AmtError::UnknownPlayer { id: 8, n: 8 })
    );
    assert!(f.proofs.player_proof(8).is_err());
  }

  #[test]
  fn test_proofs_add_homomorphically() {
    let (t, n) = (4, 6);
    let a = fixture(t, n, 7);
    let mut rng = StdRng::seed_from_u64(8);
    let accs = AccumulatorTree::<Fr>::new(n).unwrap();
    let other = UniPoly::<Fr>::random(t, &mut rng);
    let other_comm = kzg::commit(&a.pp, &other).unwrap();
    let other_eval = RootsOfUnityEvaluation::new(&other, &accs).unwrap();
    let other_shares = other_eval.evaluations();
    let other_proofs = AllAmtProofs::new(
      AuthRootsOfUnityEvaluation::new(&other_eval, &a.pp).unwrap(),
      G1::identity(),
      a.vk.proof_levels(),
    );

    for id in 0..n {
      let sum = &a.proofs.player_proof(id).unwrap() + &other_proofs.player_proof(id).unwrap();
      assert!(
        a.vk
          .verify_at_id(&(a.comm + other_comm), &sum, id, &(a.shares[id] + other_shares[id]))
          .unwrap()
      );
    }

    let proof = a.proofs.player_proof(0).unwrap();
    assert_eq!(&AmtProof::default() + &proof, proof);
    assert_eq!(&proof + &AmtProof::default(), proof);
  }

  #[test]
  fn test_memoized_verification() {
    let (t, n) = (5, 8);
    let f = fixture(t, n, 9);
    let lhs = f.vk.commitment_pairing(&f.comm);
    let mut memo = PairingMemo::<E>::new();

    // a forged proof must not populate the memo
    let forged = f.proofs.player_proof(0).unwrap();
    assert!(
      !f.vk
        .verify_at_id_prepared(&lhs, &forged, 0, &(f.shares[0] + Fr::ONE), Some(&mut memo))
        .unwrap()
    );
    assert!(memo.is_empty());

    for id in 0..n {
      let proof = f.proofs.player_proof(id).unwrap();
      assert!(
        f.vk
          .verify_at_id_prepared(&lhs, &proof, id, &f.shares[id], Some(&mut memo))
          .unwrap()
      );
    }
    // one pairing per distinct (level, idx) of the truncated tree
    let positions: usize = (0..f.vk.proof_levels()).map(|k| n >> k).sum();
    assert_eq!(memo.len(), positions);

    // cached pairings do not vouch for a different quotient
    let mut quotients = f.proofs.player_proof(2).unwrap().quotient_commitments().to_vec();
    let top = quotients.len() - 1;
    quotients[top] += f.pp.g1();
    assert!(
      !f.vk
        .verify_at_id_prepared(&lhs, &AmtProof::new(quotients), 2, &f.shares[2], Some(&mut memo))
        .unwrap()
    );
  }

  #[test]
  fn test_zero_quotients_are_skipped() {
    // a constant polynomial has all-zero quotients
    let mut rng = StdRng::seed_from_u64(10);
    let (t, n) = (3, 4);
    let pp = PublicParams::<E>::setup(4, &mut rng);
    let accs = AccumulatorTree::<Fr>::new(n).unwrap();
    let auth_accs = Arc::new(AuthAccumulatorTree::new(&accs, &pp, t).unwrap());
    let vk = AmtVerifierKey::new(auth_accs, &pp, n).unwrap();

    let poly = UniPoly::new(vec![Fr::from(9), Fr::ZERO, Fr::ZERO]);
    let comm = kzg::commit(&pp, &poly).unwrap();
    let eval = RootsOfUnityEvaluation::new(&poly, &accs).unwrap();
    let proofs = AllAmtProofs::new(
      AuthRootsOfUnityEvaluation::new(&eval, &pp).unwrap(),
      G1::identity(),
      vk.proof_levels(),
    );
    for id in 0..n {
      let proof = proofs.player_proof(id).unwrap();
      assert!(proof.quotient_commitments().iter().all(|q| bool::from(q.is_identity())));
      assert!(vk.verify_at_id(&comm, &proof, id, &Fr::from(9)).unwrap());
    }
  }
}
