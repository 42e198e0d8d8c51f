// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the amtvss project.
// See the LICENSE file in the project root for full license information.

pub trait Math {
  /// ceil(log2(self))
  fn log_2(self) -> usize;

  /// floor(log2(self))
  fn log_2_floor(self) -> usize;

  /// reverses the lowest `num_bits` bits of self
  fn bit_reverse(self, num_bits: usize) -> usize;
}

impl Math for usize {
  fn log_2(self) -> usize {
    assert_ne!(self, 0);

    if self.is_power_of_two() {
      (1usize.leading_zeros() - self.leading_zeros()) as usize
    } else {
      (0usize.leading_zeros() - self.leading_zeros()) as usize
    }
  }

  fn log_2_floor(self) -> usize {
    assert_ne!(self, 0);
    self.ilog2() as usize
  }

  fn bit_reverse(self, num_bits: usize) -> usize {
    if num_bits == 0 {
      return 0;
    }
    debug_assert!(num_bits == usize::BITS as usize || self < (1 << num_bits));
    self.reverse_bits() >> (usize::BITS as usize - num_bits)
  }
}

#[cfg(test)]
mod tests {
  use super::Math;

  #[test]
  fn test_logs() {
    assert_eq!(1usize.log_2(), 0);
    assert_eq!(2usize.log_2(), 1);
    assert_eq!(5usize.log_2(), 3);
    assert_eq!(8usize.log_2(), 3);
    assert_eq!(1usize.log_2_floor(), 0);
    assert_eq!(7usize.log_2_floor(), 2);
    assert_eq!(8usize.log_2_floor(), 3);
  }

  #[test]
  fn test_bit_reverse() {
    assert_eq!(0usize.bit_reverse(0), 0);
    assert_eq!(1usize.bit_reverse(1), 1);
    assert_eq!(1usize.bit_reverse(3), 4);
    assert_eq!(3usize.bit_reverse(3), 6);
    assert_eq!(6usize.bit_reverse(3), 3);
    for i in 0..16usize {
      assert_eq!(i.bit_reverse(4).bit_reverse(4), i);
    }
  }
}
