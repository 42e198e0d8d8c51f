//! This library implements verifiable secret sharing (VSS) and distributed key generation (DKG)
//! in which every share is proven with an authenticated multipoint evaluation tree (AMT).
//! Dealing costs $O(n \log t)$ group operations for all $n$ proofs, and each proof has
//! $O(\log t)$ size and verification time.
#![deny(
  warnings,
  unused,
  future_incompatible,
  nonstandard_style,
  rust_2018_idioms,
  missing_docs
)]
#![allow(clippy::type_complexity)]
#![forbid(unsafe_code)]

// private modules
mod math;

// public modules
pub mod amt;
pub mod dkg;
pub mod errors;
pub mod kzg;
pub mod lagrange;
pub mod nizk;
pub mod polys;
pub mod provider;
pub mod srs;
pub mod traits;

/// Start a span + timer, return `(Span, Instant)`.
macro_rules! start_span {
    ($name:expr $(, $($fmt:tt)+)?) => {{
        let span       = info_span!($name $(, $($fmt)+)?);
        let span_clone = span.clone();    // lives as long as the guard
        let _guard      = span_clone.enter();
        (span, Instant::now())
    }};
}
pub(crate) use start_span;

pub use dkg::{AmtPlayer, Dealing, DkgConfig, DkgParams, PlayerMode, PlayerState};
pub use errors::AmtError;
pub use srs::PublicParams;
