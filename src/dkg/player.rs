// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the amtvss project.
// See the LICENSE file in the project root for full license information.

//! `AmtPlayer`: a VSS or DKG participant whose share proofs are AMT proofs.
//!
//! A participant moves through `Created -> Dealt -> Verified -> Reconstructed`. A VSS
//! participant that does not deal goes straight from `Created` to `Verified`; a VSS dealer
//! may reconstruct right after dealing.
use crate::{
  amt::{
    AllAmtProofs, AmtProof, AuthRootsOfUnityEvaluation, PairingMemo, RootsOfUnityEvaluation,
  },
  dkg::params::DkgParams,
  errors::AmtError,
  kzg, lagrange,
  nizk::NizkPok,
  polys::univariate::UniPoly,
  start_span,
  traits::{Engine, player::Player},
};
use ff::Field;
use group::Group;
use itertools::Itertools;
use rand_core::RngCore;
use std::{sync::Arc, time::Instant};
use tracing::{debug, error, info, info_span};

/// Whether a participant runs a single-dealer VSS or takes part in a DKG
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerMode {
  /// One dealer shares a secret; nothing is aggregated
  Vss,
  /// Every participant deals; the joint secret is the sum of all dealt secrets
  Dkg,
}

/// Where a participant is in the protocol
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
  /// Constructed, nothing dealt or verified yet
  Created,
  /// Dealt a polynomial
  Dealt,
  /// Verified the dealings it received and holds a final share
  Verified,
  /// Verified the shares of a reconstruction subset
  Reconstructed,
}

impl PlayerState {
  /// Returns the name used in `AmtError::InvalidState`
  pub fn as_str(&self) -> &'static str {
    match self {
      PlayerState::Created => "Created",
      PlayerState::Dealt => "Dealt",
      PlayerState::Verified => "Verified",
      PlayerState::Reconstructed => "Reconstructed",
    }
  }
}

/// The public output of one dealer: commitment, shares and proofs for every participant.
///
/// In DKG mode it also carries $g_1^{f(0)}$ and a proof of knowledge of $f(0)$.
#[derive(Clone, Debug)]
pub struct Dealing<E: Engine> {
  /// Id of the dealer
  pub dealer: usize,
  /// KZG commitment to the dealt polynomial $f$
  pub commitment: E::G1,
  /// `shares[i]` $= f(\omega^i)$ for every participant `i`
  pub shares: Vec<E::Scalar>,
  /// AMT proofs for every share, plus the proof for $f(0)$
  pub proofs: Arc<AllAmtProofs<E>>,
  /// $g_1^{f(0)}$, DKG only
  pub secret_commitment: Option<E::G1>,
  /// Proof of knowledge of $f(0)$, DKG only
  pub pok: Option<NizkPok<E>>,
}

impl<E: Engine> Dealing<E> {
  /// Returns the share and AMT proof this dealing holds for participant `id`
  ///
  /// # Errors
  /// Returns `AmtError::UnknownPlayer` if `id` is not covered by the dealing.
  pub fn share_for(&self, id: usize) -> Result<(E::Scalar, AmtProof<E>), AmtError> {
    let share = self.shares.get(id).copied().ok_or(AmtError::UnknownPlayer {
      id,
      n: self.shares.len(),
    })?;
    Ok((share, self.proofs.player_proof(id)?))
  }
}

/// Aggregated share of a participant after `verify_other_players`
#[derive(Clone, Debug)]
struct FinalShare<E: Engine> {
  share: E::Scalar,
  commitment: E::G1,
  proof: AmtProof<E>,
  public_key: Option<E::G1>,
  public_key_proof: Option<E::G1>,
}

#[derive(Clone, Debug)]
struct Dealt<E: Engine> {
  poly: UniPoly<E::Scalar>,
  dealing: Dealing<E>,
}

/// A participant whose shares are proven with AMT proofs
#[derive(Clone, Debug)]
pub struct AmtPlayer<E: Engine> {
  params: Arc<DkgParams<E>>,
  id: usize,
  mode: PlayerMode,
  #[cfg(any(test, feature = "simulate"))]
  simulated: bool,
  state: PlayerState,
  dealt: Option<Dealt<E>>,
  final_share: Option<FinalShare<E>>,
}

impl<E: Engine> AmtPlayer<E> {
  /// Creates participant `id` of the run described by `params`
  ///
  /// # Errors
  /// Returns `AmtError::UnknownPlayer` if `id >= n`.
  pub fn new(params: Arc<DkgParams<E>>, id: usize, mode: PlayerMode) -> Result<Self, AmtError> {
    params.check_id(id)?;
    Ok(Self {
      params,
      id,
      mode,
      #[cfg(any(test, feature = "simulate"))]
      simulated: false,
      state: PlayerState::Created,
      dealt: None,
      final_share: None,
    })
  }

  /// Creates a participant that commits by evaluating at the trapdoor of the public
  /// parameters. Its dealings are identical in distribution to those of [`AmtPlayer::new`].
  ///
  /// # Errors
  /// Returns `AmtError::UnknownPlayer` if `id >= n`. Dealing fails with
  /// `AmtError::MissingTrapdoor` unless the parameters were set up with their trapdoor.
  #[cfg(any(test, feature = "simulate"))]
  pub fn new_simulated(
    params: Arc<DkgParams<E>>,
    id: usize,
    mode: PlayerMode,
  ) -> Result<Self, AmtError> {
    let mut player = Self::new(params, id, mode)?;
    player.simulated = true;
    Ok(player)
  }

  /// Returns the mode chosen at construction
  pub fn mode(&self) -> PlayerMode {
    self.mode
  }

  /// Returns the current protocol state
  pub fn state(&self) -> PlayerState {
    self.state
  }

  /// Returns the shared run parameters
  pub fn params(&self) -> &DkgParams<E> {
    &self.params
  }

  /// Returns the last dealing of this participant
  pub fn dealing(&self) -> Option<&Dealing<E>> {
    self.dealt.as_ref().map(|d| &d.dealing)
  }

  /// Returns the commitment to the dealt polynomial
  pub fn commitment(&self) -> Option<&E::G1> {
    self.dealing().map(|d| &d.commitment)
  }

  /// Returns the shares this participant dealt
  pub fn shares(&self) -> Option<&[E::Scalar]> {
    self.dealing().map(|d| d.shares.as_slice())
  }

  /// Returns the proofs for the shares this participant dealt
  pub fn proofs(&self) -> Option<&AllAmtProofs<E>> {
    self.dealing().map(|d| d.proofs.as_ref())
  }

  /// Returns this participant's share of the joint secret (DKG) or of the dealt secret (VSS)
  pub fn final_share(&self) -> Option<&E::Scalar> {
    self.final_share.as_ref().map(|f| &f.share)
  }

  /// Returns the commitment the final share opens against
  pub fn final_commitment(&self) -> Option<&E::G1> {
    self.final_share.as_ref().map(|f| &f.commitment)
  }

  /// Returns the AMT proof for the final share
  pub fn final_proof(&self) -> Option<&AmtProof<E>> {
    self.final_share.as_ref().map(|f| &f.proof)
  }

  /// Returns the joint public key $g_1^{\sum_j f_j(0)}$, DKG only
  pub fn public_key(&self) -> Option<&E::G1> {
    self.final_share.as_ref().and_then(|f| f.public_key.as_ref())
  }

  /// Checks the final share against the aggregated commitment and, in DKG mode, the
  /// public key against the aggregated proof at zero.
  ///
  /// # Errors
  /// Returns `AmtError::InvalidState` before a successful `verify_other_players`.
  pub fn verify_final_share_proof(&self) -> Result<bool, AmtError> {
    let final_share = self.final_share.as_ref().ok_or(AmtError::InvalidState {
      expected: "Verified",
      actual: self.state.as_str(),
    })?;
    self.verify_final(final_share)
  }

  fn verify_final(&self, final_share: &FinalShare<E>) -> Result<bool, AmtError> {
    let vk = self.params.verifier_key();
    if !vk.verify_at_id(
      &final_share.commitment,
      &final_share.proof,
      self.id,
      &final_share.share,
    )? {
      error!(id = self.id, "final share proof did not verify");
      return Ok(false);
    }
    if let (Some(pk), Some(pk_proof)) = (&final_share.public_key, &final_share.public_key_proof) {
      if !vk.verify_at_zero(&final_share.commitment, pk_proof, pk) {
        error!(id = self.id, "public key proof did not verify");
        return Ok(false);
      }
    }
    Ok(true)
  }

  fn require_dealt(&self, expected: &'static str) -> Result<&Dealt<E>, AmtError> {
    self.dealt.as_ref().ok_or(AmtError::InvalidState {
      expected,
      actual: self.state.as_str(),
    })
  }

  fn check_subset(&self, subset: &[usize]) -> Result<(), AmtError> {
    let (t, n) = (self.params.t(), self.params.n());
    if subset.len() != t {
      return Err(AmtError::InvalidSubset {
        reason: format!("expected {t} ids, got {}", subset.len()),
      });
    }
    if !subset.iter().tuple_windows().all(|(a, b)| a < b) {
      return Err(AmtError::InvalidSubset {
        reason: "ids are not strictly increasing".to_string(),
      });
    }
    if let Some(id) = subset.iter().find(|id| **id >= n) {
      return Err(AmtError::InvalidSubset {
        reason: format!("id {id} is not below n = {n}"),
      });
    }
    Ok(())
  }

  /// Commitment, proof tree and proof at zero for `poly`
  fn authenticate(
    &self,
    poly: &UniPoly<E::Scalar>,
    eval: &RootsOfUnityEvaluation<'_, E::Scalar>,
  ) -> Result<(E::G1, AuthRootsOfUnityEvaluation<E>, E::G1), AmtError> {
    let pp = self.params.public_params();
    let (zero_quotient, _) = poly.divide_by_linear(&E::Scalar::ZERO)?;

    #[cfg(any(test, feature = "simulate"))]
    if self.simulated {
      return Ok((
        kzg::commit_simulated(pp, poly)?,
        AuthRootsOfUnityEvaluation::new_simulated(eval, pp)?,
        kzg::commit_simulated(pp, &zero_quotient)?,
      ));
    }

    Ok((
      kzg::commit(pp, poly)?,
      AuthRootsOfUnityEvaluation::new(eval, pp)?,
      kzg::commit(pp, &zero_quotient)?,
    ))
  }

  /// Structural checks on received dealings. Failing them is a verification failure.
  fn dealings_well_formed(&self, dealings: &[Dealing<E>]) -> bool {
    let n = self.params.n();
    if !dealings.iter().map(|d| d.dealer).all_unique() {
      error!(id = self.id, "repeated dealer");
      return false;
    }
    for d in dealings {
      let malformed = d.dealer >= n
        || d.shares.len() != n
        || d.proofs.auth_eval().num_points() != n
        || (self.mode == PlayerMode::Dkg && (d.secret_commitment.is_none() || d.pok.is_none()));
      if malformed {
        error!(id = self.id, dealer = d.dealer, "malformed dealing");
        return false;
      }
      // our own dealing is not re-verified, so it must be exactly the one we dealt
      if self.mode == PlayerMode::Dkg && d.dealer == self.id && !self.is_own_dealing(d) {
        error!(id = self.id, "dealing under our id is not ours");
        return false;
      }
    }
    true
  }

  fn is_own_dealing(&self, d: &Dealing<E>) -> bool {
    self.dealing().is_some_and(|own| {
      own.commitment == d.commitment
        && own.shares == d.shares
        && Arc::ptr_eq(&own.proofs, &d.proofs)
        && own.secret_commitment == d.secret_commitment
        && own.pok == d.pok
    })
  }

  fn combine(&self, dealings: &[Dealing<E>]) -> Result<FinalShare<E>, AmtError> {
    let dkg = self.mode == PlayerMode::Dkg;
    let mut combined = FinalShare {
      share: E::Scalar::ZERO,
      commitment: E::G1::identity(),
      proof: AmtProof::default(),
      public_key: dkg.then(E::G1::identity),
      public_key_proof: dkg.then(E::G1::identity),
    };
    for d in dealings {
      let (share, proof) = d.share_for(self.id)?;
      combined.share += share;
      combined.commitment += d.commitment;
      combined.proof += &proof;
      if let (Some(pk), Some(secret_comm)) = (combined.public_key.as_mut(), &d.secret_commitment) {
        *pk += secret_comm;
      }
      if let Some(pk_proof) = combined.public_key_proof.as_mut() {
        *pk_proof += d.proofs.zero_proof();
      }
    }
    Ok(combined)
  }

  fn pok_verifies(&self, d: &Dealing<E>) -> bool {
    let g1 = self.params.public_params().g1();
    let ok = match (&d.pok, &d.secret_commitment) {
      (Some(pok), Some(secret_comm)) => pok.verify(g1, secret_comm),
      _ => false,
    };
    if !ok {
      error!(id = self.id, dealer = d.dealer, "proof of knowledge did not verify");
    }
    ok
  }

  fn verify_aggregate(
    &self,
    dealings: &[Dealing<E>],
    combined: &FinalShare<E>,
  ) -> Result<bool, AmtError> {
    for d in dealings.iter().filter(|d| d.dealer != self.id) {
      if !self.pok_verifies(d) {
        return Ok(false);
      }
    }
    self.verify_final(combined)
  }

  fn verify_individually(&self, dealings: &[Dealing<E>]) -> Result<bool, AmtError> {
    let dkg = self.mode == PlayerMode::Dkg;
    let vk = self.params.verifier_key();
    for d in dealings {
      if dkg && d.dealer == self.id {
        debug!(id = self.id, "skipping own dealing");
        continue;
      }
      if dkg && !self.pok_verifies(d) {
        return Ok(false);
      }
      let (share, proof) = d.share_for(self.id)?;
      if !vk.verify_at_id(&d.commitment, &proof, self.id, &share)? {
        error!(id = self.id, dealer = d.dealer, "share proof did not verify");
        return Ok(false);
      }
      if let Some(secret_comm) = d.secret_commitment.as_ref().filter(|_| dkg) {
        if !vk.verify_at_zero(&d.commitment, d.proofs.zero_proof(), secret_comm) {
          error!(id = self.id, dealer = d.dealer, "proof at zero did not verify");
          return Ok(false);
        }
      }
    }
    Ok(true)
  }
}

impl<E: Engine> Player<E> for AmtPlayer<E> {
  type Dealing = Dealing<E>;

  fn id(&self) -> usize {
    self.id
  }

  fn deal<R: RngCore + ?Sized>(&mut self, rng: &mut R) -> Result<Dealing<E>, AmtError> {
    if !matches!(self.state, PlayerState::Created | PlayerState::Dealt) {
      return Err(AmtError::InvalidState {
        expected: "Created or Dealt",
        actual: self.state.as_str(),
      });
    }
    let (_deal_span, deal_t) = start_span!(
      "deal",
      id = self.id,
      t = self.params.t(),
      n = self.params.n()
    );

    let poly = UniPoly::random(self.params.t(), rng);
    let eval = RootsOfUnityEvaluation::new(&poly, self.params.accumulators())?;
    let shares = eval.evaluations();
    let (commitment, auth_eval, zero_proof) = self.authenticate(&poly, &eval)?;
    let proofs = AllAmtProofs::new(
      auth_eval,
      zero_proof,
      self.params.verifier_key().proof_levels(),
    );

    let (secret_commitment, pok) = match self.mode {
      PlayerMode::Vss => (None, None),
      PlayerMode::Dkg => {
        let g1 = self.params.public_params().g1();
        let secret = poly.eval_at_zero();
        let secret_commitment = *g1 * secret;
        let pok = NizkPok::prove(g1, &secret, &secret_commitment, rng);
        (Some(secret_commitment), Some(pok))
      }
    };

    let dealing = Dealing {
      dealer: self.id,
      commitment,
      shares,
      proofs: Arc::new(proofs),
      secret_commitment,
      pok,
    };
    self.dealt = Some(Dealt {
      poly,
      dealing: dealing.clone(),
    });
    self.final_share = None;
    self.state = PlayerState::Dealt;

    info!(elapsed_ms = %deal_t.elapsed().as_millis(), id = self.id, "deal");
    Ok(dealing)
  }

  fn verify_other_players(
    &mut self,
    dealings: &[Dealing<E>],
    aggregate: bool,
  ) -> Result<bool, AmtError> {
    match self.mode {
      PlayerMode::Vss if aggregate => return Err(AmtError::AggregationRequiresDkg),
      PlayerMode::Vss if dealings.len() != 1 => {
        return Err(AmtError::InvalidInputLength {
          expected: 1,
          actual: dealings.len(),
        });
      }
      PlayerMode::Dkg if self.dealt.is_none() => {
        return Err(AmtError::InvalidState {
          expected: "Dealt",
          actual: self.state.as_str(),
        });
      }
      _ => {}
    }
    let (_verify_span, verify_t) = start_span!(
      "verify_other_players",
      id = self.id,
      aggregate = aggregate,
      dealings = dealings.len()
    );

    if !self.dealings_well_formed(dealings) {
      return Ok(false);
    }
    let combined = self.combine(dealings)?;
    let ok = if aggregate {
      self.verify_aggregate(dealings, &combined)?
    } else {
      self.verify_individually(dealings)?
    };
    info!(
      elapsed_ms = %verify_t.elapsed().as_millis(),
      id = self.id,
      ok = ok,
      "verify_other_players"
    );

    if ok {
      self.final_share = Some(combined);
      self.state = PlayerState::Verified;
    }
    Ok(ok)
  }

  fn reconstruction_verify(
    &mut self,
    subset: &[usize],
    fast_track: bool,
  ) -> Result<bool, AmtError> {
    let dealing = &self.require_dealt("Dealt")?.dealing;
    // a DKG participant reconstructs only after accepting the other dealings
    if self.mode == PlayerMode::Dkg
      && !matches!(self.state, PlayerState::Verified | PlayerState::Reconstructed)
    {
      return Err(AmtError::InvalidState {
        expected: "Verified",
        actual: self.state.as_str(),
      });
    }
    self.check_subset(subset)?;
    let (_reconstruct_span, reconstruct_t) =
      start_span!("reconstruction_verify", id = self.id, fast_track = fast_track);

    let vk = self.params.verifier_key();
    let lhs = vk.commitment_pairing(&dealing.commitment);
    let mut memo = PairingMemo::new();
    for &id in subset {
      let (share, proof) = dealing.share_for(id)?;
      if !vk.verify_at_id_prepared(&lhs, &proof, id, &share, Some(&mut memo))? {
        error!(id = self.id, share = id, "reconstruction share did not verify");
        return Ok(false);
      }
    }
    debug!(id = self.id, memo_entries = memo.len(), "verified reconstruction subset");

    if !fast_track {
      for id in (0..self.params.n()).filter(|id| subset.binary_search(id).is_err()) {
        let (share, proof) = dealing.share_for(id)?;
        if !vk.verify_at_id_prepared(&lhs, &proof, id, &share, None)? {
          error!(id = self.id, share = id, "reconstruction share did not verify");
          return Ok(false);
        }
      }
    }
    info!(
      elapsed_ms = %reconstruct_t.elapsed().as_millis(),
      id = self.id,
      "reconstruction_verify"
    );

    self.state = PlayerState::Reconstructed;
    Ok(true)
  }

  fn interpolate(&self, subset: &[usize]) -> Result<E::Scalar, AmtError> {
    let dealt = self.require_dealt("Dealt")?;
    self.check_subset(subset)?;
    let values = subset
      .iter()
      .map(|id| dealt.dealing.shares[*id])
      .collect::<Vec<_>>();
    lagrange::interpolate_at_zero(self.params.omegas(), subset, &values)
  }

  fn secret(&self) -> Result<E::Scalar, AmtError> {
    Ok(self.require_dealt("Dealt")?.poly.eval_at_zero())
  }
}
