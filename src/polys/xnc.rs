//! `XncPoly`: the binomial $x^m + c$ in constant space.
//!
//! Every node of an accumulator tree over roots of unity has this shape, so
//! the trees never materialize dense coefficient vectors for their nodes.
use crate::polys::univariate::UniPoly;
use core::ops::Mul;
use ff::PrimeField;
use serde::{Deserialize, Serialize};

/// The polynomial $x^{degree} + constant$
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XncPoly<Scalar: PrimeField> {
  degree: usize,
  constant: Scalar,
}

impl<Scalar: PrimeField> XncPoly<Scalar> {
  /// Creates $x^{degree} + constant$
  pub fn new(degree: usize, constant: Scalar) -> Self {
    Self { degree, constant }
  }

  /// Returns the monic linear factor $x - root$
  pub fn linear(root: &Scalar) -> Self {
    Self::new(1, -*root)
  }

  /// Returns the degree $m$
  pub fn degree(&self) -> usize {
    self.degree
  }

  /// Returns the constant term $c$
  pub fn constant(&self) -> &Scalar {
    &self.constant
  }

  /// Evaluates at `x`
  pub fn evaluate(&self, x: &Scalar) -> Scalar {
    x.pow_vartime([self.degree as u64]) + self.constant
  }

  /// Expands into a dense polynomial with `degree + 1` coefficients
  pub fn to_dense(&self) -> UniPoly<Scalar> {
    let mut coeffs = vec![Scalar::ZERO; self.degree + 1];
    coeffs[0] = self.constant;
    coeffs[self.degree] += Scalar::ONE;
    UniPoly::new(coeffs)
  }
}

/// Only exact when the cross terms cancel, i.e. $(x^m + c_1)(x^m + c_2)$ with
/// $c_1 = -c_2$ as for sibling nodes of an accumulator tree.
impl<Scalar: PrimeField> Mul for XncPoly<Scalar> {
  type Output = XncPoly<Scalar>;

  fn mul(self, rhs: XncPoly<Scalar>) -> XncPoly<Scalar> {
    XncPoly {
      degree: self.degree + rhs.degree,
      constant: self.constant * rhs.constant,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::provider::bn254::bn254::Scalar as Fr;
  use ff::Field;

  #[test]
  fn test_sibling_product() {
    let w = Fr::from(7);
    let left = XncPoly::linear(&w);
    let right = XncPoly::linear(&-w);
    let parent = left * right;

    assert_eq!(parent, XncPoly::new(2, -(w * w)));
    assert_eq!(left.to_dense().mul(&right.to_dense()), parent.to_dense());
  }

  #[test]
  fn test_evaluate() {
    let p = XncPoly::new(3, Fr::from(5));
    let x = Fr::from(2);
    assert_eq!(p.evaluate(&x), Fr::from(13));
    assert_eq!(p.to_dense().evaluate(&x), Fr::from(13));
    assert_eq!(XncPoly::new(0, Fr::ONE).to_dense().coeffs(), &[Fr::from(2)]);
  }
}
