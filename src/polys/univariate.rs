//! Main components:
//! - `UniPoly`: an univariate dense polynomial in coefficient form (little endian),
//!   with the two division routines the evaluation trees and KZG openings rely on.
use crate::{errors::AmtError, polys::xnc::XncPoly};
use core::ops::{Add, AddAssign};
use ff::PrimeField;
use rand_core::RngCore;
use serde::{Deserialize, Serialize};

// ax^2 + bx + c stored as vec![c, b, a]
// ax^3 + bx^2 + cx + d stored as vec![d, c, b, a]
/// A univariate dense polynomial in coefficient form.
///
/// For a polynomial $ax^2 + bx + c$, coefficients are stored as `vec![c, b, a]`.
/// Trailing zero coefficients are allowed and ignored by equality.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UniPoly<Scalar: PrimeField> {
  pub(crate) coeffs: Vec<Scalar>,
}

impl<Scalar: PrimeField> UniPoly<Scalar> {
  /// Creates a polynomial from its coefficients, constant term first
  pub fn new(coeffs: Vec<Scalar>) -> Self {
    Self { coeffs }
  }

  /// Samples a polynomial with `num_coeffs` uniformly random coefficients
  pub fn random<R: RngCore + ?Sized>(num_coeffs: usize, rng: &mut R) -> Self {
    Self {
      coeffs: (0..num_coeffs).map(|_| Scalar::random(&mut *rng)).collect(),
    }
  }

  /// Returns the coefficients, constant term first
  pub fn coeffs(&self) -> &[Scalar] {
    &self.coeffs
  }

  /// Returns the number of stored coefficients
  pub fn len(&self) -> usize {
    self.coeffs.len()
  }

  /// Returns true if no coefficients are stored
  pub fn is_empty(&self) -> bool {
    self.coeffs.is_empty()
  }

  /// Returns true if every coefficient is zero
  pub fn is_zero(&self) -> bool {
    self.coeffs.iter().all(|c| bool::from(c.is_zero()))
  }

  /// Returns the degree of the polynomial, i.e., the index of the last non-zero coefficient
  pub fn degree(&self) -> usize {
    self
      .coeffs
      .iter()
      .rposition(|c| !bool::from(c.is_zero()))
      .unwrap_or(0)
  }

  /// Evaluates the polynomial at zero.
  pub fn eval_at_zero(&self) -> Scalar {
    self.coeffs.first().copied().unwrap_or(Scalar::ZERO)
  }

  /// Evaluates the polynomial at a given point `r`.
  pub fn evaluate(&self, r: &Scalar) -> Scalar {
    self
      .coeffs
      .iter()
      .rev()
      .fold(Scalar::ZERO, |acc, coeff| acc * r + coeff)
  }

  /// Schoolbook multiplication
  pub fn mul(&self, other: &Self) -> Self {
    if self.is_empty() || other.is_empty() {
      return Self::default();
    }

    let mut coeffs = vec![Scalar::ZERO; self.len() + other.len() - 1];
    for (i, a) in self.coeffs.iter().enumerate() {
      for (j, b) in other.coeffs.iter().enumerate() {
        coeffs[i + j] += *a * b;
      }
    }
    Self { coeffs }
  }

  /// Divides self by a binomial $x^m + c$, returning `(quotient, remainder)`.
  ///
  /// Runs in time linear in the degree of self, since each step only touches the
  /// leading coefficient and the coefficient `m` positions below it.
  /// If `deg(self) < m` the quotient is the zero polynomial and the remainder is self.
  ///
  /// # Errors
  /// Returns `AmtError::EmptyPolynomial` if self has no coefficients.
  pub fn divide_by_xnc(&self, divisor: &XncPoly<Scalar>) -> Result<(Self, Self), AmtError> {
    if self.is_empty() {
      return Err(AmtError::EmptyPolynomial);
    }

    let m = divisor.degree();
    if self.len() < m + 1 {
      return Ok((Self::new(vec![Scalar::ZERO]), self.clone()));
    }

    let n = self.len() - 1;
    let mut quotient = vec![Scalar::ZERO; n - m + 1];
    let mut rem = self.coeffs.clone();

    // peel off the leading term: a_hi x^hi = a_hi x^{hi-m} (x^m + c) - c a_hi x^{hi-m}
    for hi in (m..=n).rev() {
      let lead = rem[hi];
      quotient[hi - m] = lead;
      rem[hi - m] -= *divisor.constant() * lead;
    }
    rem.truncate(m);

    Ok((Self::new(quotient), Self::new(rem)))
  }

  /// Divides self by $x - z$ via synthetic division, returning `(quotient, self(z))`.
  ///
  /// # Errors
  /// Returns `AmtError::EmptyPolynomial` if self has no coefficients.
  pub fn divide_by_linear(&self, z: &Scalar) -> Result<(Self, Scalar), AmtError> {
    let (last, rest) = self
      .coeffs
      .split_last()
      .ok_or(AmtError::EmptyPolynomial)?;

    let mut quotient = vec![Scalar::ZERO; rest.len()];
    let mut carry = *last;
    for (i, coeff) in rest.iter().enumerate().rev() {
      quotient[i] = carry;
      carry = carry * z + coeff;
    }

    Ok((Self::new(quotient), carry))
  }
}

impl<Scalar: PrimeField> PartialEq for UniPoly<Scalar> {
  fn eq(&self, other: &Self) -> bool {
    let (short, long) = if self.len() <= other.len() {
      (self, other)
    } else {
      (other, self)
    };
    short.coeffs.iter().zip(long.coeffs.iter()).all(|(a, b)| a == b)
      && long.coeffs[short.len()..]
        .iter()
        .all(|c| bool::from(c.is_zero()))
  }
}

impl<Scalar: PrimeField> Eq for UniPoly<Scalar> {}

impl<Scalar: PrimeField> AddAssign<&UniPoly<Scalar>> for UniPoly<Scalar> {
  fn add_assign(&mut self, rhs: &UniPoly<Scalar>) {
    if self.len() < rhs.len() {
      self.coeffs.resize(rhs.len(), Scalar::ZERO);
    }
    for (a, b) in self.coeffs.iter_mut().zip(rhs.coeffs.iter()) {
      *a += b;
    }
  }
}

impl<Scalar: PrimeField> Add for &UniPoly<Scalar> {
  type Output = UniPoly<Scalar>;

  fn add(self, rhs: &UniPoly<Scalar>) -> UniPoly<Scalar> {
    let mut sum = self.clone();
    sum += rhs;
    sum
  }
}
