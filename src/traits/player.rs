//! The capability interface shared by secret-sharing participants.
//!
//! A participant is driven through `deal`, `verify_other_players`, `reconstruction_verify`
//! and `interpolate`, in that order. Variants differ only in how shares are proven; the
//! orchestration layer selects one at configuration time and talks to it through this trait.
use crate::{errors::AmtError, traits::Engine};
use rand_core::RngCore;

/// A participant in a VSS or DKG run
pub trait Player<E: Engine> {
  /// The public output of `deal`, handed to every other participant
  type Dealing: Clone;

  /// Returns this participant's id in `0..n`
  fn id(&self) -> usize;

  /// Samples a secret polynomial, computes all shares and their proofs
  fn deal<R: RngCore + ?Sized>(&mut self, rng: &mut R) -> Result<Self::Dealing, AmtError>;

  /// Checks the dealings received from all dealers (including this one in DKG mode) and
  /// assembles this participant's final share. Returns `Ok(false)` if any proof is rejected.
  fn verify_other_players(
    &mut self,
    dealings: &[Self::Dealing],
    aggregate: bool,
  ) -> Result<bool, AmtError>;

  /// Verifies the shares of the `t` ids in `subset` (and, unless `fast_track`, all others)
  fn reconstruction_verify(&mut self, subset: &[usize], fast_track: bool)
  -> Result<bool, AmtError>;

  /// Recovers the dealt secret from the shares of the `t` ids in `subset`
  fn interpolate(&self, subset: &[usize]) -> Result<E::Scalar, AmtError>;

  /// Returns the secret `f(0)` this participant dealt
  fn secret(&self) -> Result<E::Scalar, AmtError>;
}
