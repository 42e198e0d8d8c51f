//! This module provides a multi-scalar multiplication routine
//! The implementation is adapted from halo2 (bucket method), with zero and one scalars
//! handled ahead of the bucket passes since polynomial commitments in this crate are
//! frequently sparse.
use crate::{errors::AmtError, start_span};
use ff::{Field, PrimeField};
use halo2curves::{CurveAffine, group::Group};
use rayon::{current_num_threads, prelude::*};
use std::time::Instant;
use tracing::{debug, info_span};

/// Inputs shorter than this are committed on the calling thread.
const PARALLEL_THRESHOLD: usize = 64;

#[derive(Clone, Copy)]
enum Bucket<C: CurveAffine> {
  None,
  Affine(C),
  Projective(C::Curve),
}

impl<C: CurveAffine> Bucket<C> {
  fn add_assign(&mut self, other: &C) {
    *self = match *self {
      Bucket::None => Bucket::Affine(*other),
      Bucket::Affine(a) => Bucket::Projective(a + *other),
      Bucket::Projective(a) => Bucket::Projective(a + other),
    }
  }

  fn add(self, other: C::Curve) -> C::Curve {
    match self {
      Bucket::None => other,
      Bucket::Affine(a) => other + a,
      Bucket::Projective(a) => other + a,
    }
  }
}

fn window_size(len: usize) -> usize {
  if len < 4 {
    1
  } else if len < 32 {
    3
  } else {
    (f64::from(len as u32)).ln().ceil() as usize
  }
}

fn cpu_msm_serial<C: CurveAffine>(coeffs: &[C::Scalar], bases: &[C]) -> C::Curve {
  fn get_at<F: PrimeField>(segment: usize, c: usize, bytes: &F::Repr) -> usize {
    let skip_bits = segment * c;
    let skip_bytes = skip_bits / 8;

    if skip_bytes >= bytes.as_ref().len() {
      return 0;
    }

    let mut v = [0; 8];
    for (v, o) in v.iter_mut().zip(bytes.as_ref()[skip_bytes..].iter()) {
      *v = *o;
    }

    let mut tmp = u64::from_le_bytes(v);
    tmp >>= skip_bits - (skip_bytes * 8);
    tmp %= 1 << c;

    tmp as usize
  }

  // scalars equal to one are summed directly, zeros are dropped
  let mut unit_sum = C::Curve::identity();
  let mut rest = Vec::new();

  for (s, b) in coeffs.iter().zip(bases) {
    if *s == C::Scalar::ONE {
      unit_sum += b;
    } else if *s != C::Scalar::ZERO {
      rest.push((s.to_repr(), *b));
    }
  }

  if rest.is_empty() {
    return unit_sum;
  }

  let c = window_size(rest.len());
  let num_bits = C::Scalar::NUM_BITS as usize;
  let segments = num_bits.div_ceil(c);

  let rest_sum = (0..segments)
    .rev()
    .fold(C::Curve::identity(), |mut acc, segment| {
      (0..c).for_each(|_| acc = acc.double());

      let mut buckets = vec![Bucket::None; (1 << c) - 1];

      for (repr, base) in rest.iter() {
        let coeff = get_at::<C::Scalar>(segment, c, repr);
        if coeff != 0 {
          buckets[coeff - 1].add_assign(base);
        }
      }

      // Summation by parts
      // e.g. 3a + 2b + 1c = a +
      //                    (a) + b +
      //                    ((a) + b) + c
      let mut running_sum = C::Curve::identity();
      for exp in buckets.into_iter().rev() {
        running_sum = exp.add(running_sum);
        acc += &running_sum;
      }
      acc
    });

  unit_sum + rest_sum
}

/// Performs a multi-scalar-multiplication `sum_i coeffs[i] * bases[i]`.
///
/// This will use multithreading if beneficial.
/// Adapted from zcash/halo2
///
/// # Errors
/// Returns `AmtError::InvalidInputLength` if coeffs and bases have different lengths.
pub fn msm<C: CurveAffine>(
  coeffs: &[C::Scalar],
  bases: &[C],
  use_parallelism_internally: bool,
) -> Result<C::Curve, AmtError> {
  if coeffs.len() != bases.len() {
    return Err(AmtError::InvalidInputLength {
      expected: bases.len(),
      actual: coeffs.len(),
    });
  }

  let (_msm_span, msm_t) = start_span!("msm", size = coeffs.len());

  let num_threads = if use_parallelism_internally && coeffs.len() >= PARALLEL_THRESHOLD {
    current_num_threads()
  } else {
    1
  };

  let result = if num_threads > 1 {
    let chunk = coeffs.len().div_ceil(num_threads);
    coeffs
      .par_chunks(chunk)
      .zip(bases.par_chunks(chunk))
      .map(|(coeffs, bases)| cpu_msm_serial(coeffs, bases))
      .reduce(C::Curve::identity, |sum, evl| sum + evl)
  } else {
    cpu_msm_serial(coeffs, bases)
  };

  debug!(elapsed_us = %msm_t.elapsed().as_micros(), size = coeffs.len(), "msm");
  Ok(result)
}
