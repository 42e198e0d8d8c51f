//! Authenticated multipoint evaluation trees (AMTs).
//!
//! - [`tree`]: the level-indexed binary tree container.
//! - [`accumulator`]: subproduct trees over roots of unity and their G2 commitments.
//! - [`evaluation`]: fast multipoint evaluation and quotient commitments.
//! - [`proof`]: per-point proofs, their verification and the pairing memo.
pub mod accumulator;
pub mod evaluation;
pub mod proof;
pub mod tree;

pub use accumulator::{AccumulatorTree, AuthAccumulatorTree};
pub use evaluation::{AuthRootsOfUnityEvaluation, EvalNode, RootsOfUnityEvaluation};
pub use proof::{AllAmtProofs, AmtProof, AmtVerifierKey, PairingMemo};
pub use tree::BinaryTree;
