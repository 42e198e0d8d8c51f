//! Verifiable secret sharing and distributed key generation with AMT share proofs.
//!
//! [`DkgParams`] fixes `(t, n)` and the shared trees; each participant is an [`AmtPlayer`]
//! driven through the [`crate::traits::player::Player`] interface.
pub mod params;
pub mod player;

pub use params::{DkgConfig, DkgParams};
pub use player::{AmtPlayer, Dealing, PlayerMode, PlayerState};
