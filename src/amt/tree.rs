//! `BinaryTree`: a full binary tree stored level by level, leaves at level 0.
//!
//! A tree may stop at `max_level` below its full height, in which case level `max_level`
//! holds several roots (a forest of equally sized subtrees).
use crate::{errors::AmtError, math::Math};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A full binary tree over a power-of-two number of leaves, possibly truncated
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryTree<T> {
  levels: Vec<Vec<T>>,
}

fn check_shape(num_leaves: usize, max_level: usize) -> Result<(), AmtError> {
  if !num_leaves.is_power_of_two() {
    return Err(AmtError::InvalidLeafCount { num_leaves });
  }
  let max_possible = num_leaves.log_2();
  if max_level > max_possible {
    return Err(AmtError::InvalidMaxLevel {
      max_level,
      max_possible,
    });
  }
  Ok(())
}

impl<T: Clone + Default> BinaryTree<T> {
  /// Allocates levels `0..=max_level` over `num_leaves` leaves, filled with `T::default()`.
  ///
  /// # Errors
  /// Returns `AmtError::InvalidLeafCount` if `num_leaves` is not a power of two and
  /// `AmtError::InvalidMaxLevel` if `max_level > log2(num_leaves)`.
  pub fn allocate(num_leaves: usize, max_level: usize) -> Result<Self, AmtError> {
    check_shape(num_leaves, max_level)?;
    Ok(Self {
      levels: (0..=max_level)
        .map(|k| vec![T::default(); num_leaves >> k])
        .collect(),
    })
  }
}

impl<T> BinaryTree<T> {
  /// Builds a tree from fully populated levels, `levels[0]` being the leaves.
  ///
  /// # Errors
  /// Returns the errors of [`BinaryTree::allocate`], or `AmtError::InvalidInputLength`
  /// if some level does not have half as many nodes as the one below it.
  pub fn from_levels(levels: Vec<Vec<T>>) -> Result<Self, AmtError> {
    let num_leaves = levels.first().map_or(0, Vec::len);
    check_shape(num_leaves, levels.len().saturating_sub(1))?;
    for (k, level) in levels.iter().enumerate() {
      if level.len() != num_leaves >> k {
        return Err(AmtError::InvalidInputLength {
          expected: num_leaves >> k,
          actual: level.len(),
        });
      }
    }
    Ok(Self { levels })
  }

  /// Returns the number of leaves
  pub fn num_leaves(&self) -> usize {
    self.levels[0].len()
  }

  /// Returns the highest stored level
  pub fn max_level(&self) -> usize {
    self.levels.len() - 1
  }

  /// Returns the number of stored levels, `max_level + 1`
  pub fn num_levels(&self) -> usize {
    self.levels.len()
  }

  /// Returns the node at `(level, idx)`
  ///
  /// # Panics
  /// Panics if the position is outside the tree.
  pub fn get(&self, level: usize, idx: usize) -> &T {
    &self.levels[level][idx]
  }

  /// Returns a mutable reference to the node at `(level, idx)`
  pub fn get_mut(&mut self, level: usize, idx: usize) -> &mut T {
    &mut self.levels[level][idx]
  }

  /// Returns all nodes at `level`, left to right
  pub fn level(&self, level: usize) -> &[T] {
    &self.levels[level]
  }

  /// Returns the nodes on the path from leaf `leaf` up to its root, leaf first
  pub fn path_from_leaf(&self, leaf: usize) -> Vec<&T> {
    self
      .levels
      .iter()
      .enumerate()
      .map(|(k, level)| &level[leaf >> k])
      .collect()
  }

  /// Visits every position root-first, then the left subtree, then the right subtree.
  /// Roots at `max_level` are visited left to right.
  pub fn preorder(&self) -> Preorder<'_, T> {
    let top = self.max_level();
    Preorder {
      tree: self,
      stack: (0..self.levels[top].len()).rev().map(|i| (top, i)).collect(),
    }
  }

  /// Returns true if both trees have the same number of leaves and levels
  pub fn same_shape<U>(&self, other: &BinaryTree<U>) -> bool {
    self.num_leaves() == other.num_leaves() && self.num_levels() == other.num_levels()
  }

  /// Applies the fallible `f` to every node in parallel, keeping positions
  pub fn try_par_map<U, F>(&self, f: F) -> Result<BinaryTree<U>, AmtError>
  where
    T: Sync,
    U: Send,
    F: Fn(usize, usize, &T) -> Result<U, AmtError> + Sync,
  {
    let levels = self
      .levels
      .iter()
      .enumerate()
      .map(|(k, level)| {
        level
          .par_iter()
          .enumerate()
          .map(|(i, node)| f(k, i, node))
          .collect::<Result<Vec<_>, _>>()
      })
      .collect::<Result<Vec<_>, _>>()?;
    Ok(BinaryTree { levels })
  }
}

/// Iterator over `(level, idx)` positions in pre-order, see [`BinaryTree::preorder`]
pub struct Preorder<'a, T> {
  tree: &'a BinaryTree<T>,
  stack: Vec<(usize, usize)>,
}

impl<T> Iterator for Preorder<'_, T> {
  type Item = (usize, usize);

  fn next(&mut self) -> Option<(usize, usize)> {
    let (level, idx) = self.stack.pop()?;
    if level > 0 {
      let below = self.tree.level(level - 1).len();
      if 2 * idx + 1 < below {
        self.stack.push((level - 1, 2 * idx + 1));
      }
      self.stack.push((level - 1, 2 * idx));
    }
    Some((level, idx))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_allocate() {
    let tree = BinaryTree::<u32>::allocate(8, 2).unwrap();
    assert_eq!(tree.num_leaves(), 8);
    assert_eq!(tree.max_level(), 2);
    assert_eq!(tree.level(2).len(), 2);

    assert!(BinaryTree::<u32>::allocate(8, 3).is_ok());
    assert!(BinaryTree::<u32>::allocate(1, 0).is_ok());
    assert_eq!(
      BinaryTree::<u32>::allocate(6, 1),
      Err(AmtError::InvalidLeafCount { num_leaves: 6 })
    );
    assert_eq!(
      BinaryTree::<u32>::allocate(8, 4),
      Err(AmtError::InvalidMaxLevel {
        max_level: 4,
        max_possible: 3
      })
    );
  }

  #[test]
  fn test_from_levels() {
    let tree = BinaryTree::from_levels(vec![vec![1, 2, 3, 4], vec![3, 7], vec![10]]).unwrap();
    assert_eq!(*tree.get(1, 1), 7);
    assert_eq!(tree.path_from_leaf(2), vec![&3, &7, &10]);

    assert!(matches!(
      BinaryTree::from_levels(vec![vec![1, 2, 3, 4], vec![3]]),
      Err(AmtError::InvalidInputLength { .. })
    ));
    assert!(BinaryTree::<u8>::from_levels(vec![]).is_err());
  }

  #[test]
  fn test_preorder() {
    let tree = BinaryTree::<u8>::allocate(4, 2).unwrap();
    let order: Vec<_> = tree.preorder().collect();
    assert_eq!(
      order,
      vec![(2, 0), (1, 0), (0, 0), (0, 1), (1, 1), (0, 2), (0, 3)]
    );

    // a truncated tree is a forest, visited root by root
    let forest = BinaryTree::<u8>::allocate(4, 1).unwrap();
    let order: Vec<_> = forest.preorder().collect();
    assert_eq!(order, vec![(1, 0), (0, 0), (0, 1), (1, 1), (0, 2), (0, 3)]);
  }

  #[test]
  fn test_try_par_map() {
    let tree = BinaryTree::<u8>::allocate(4, 2).unwrap();
    let positions = tree.try_par_map(|k, i, _| Ok((k, i))).unwrap();
    for (k, i) in tree.preorder() {
      assert_eq!(*positions.get(k, i), (k, i));
    }
    assert!(positions.same_shape(&tree));

    let failed = tree.try_par_map(|k, _, _| {
      if k == 1 {
        Err(AmtError::EmptyPolynomial)
      } else {
        Ok(k)
      }
    });
    assert_eq!(failed, Err(AmtError::EmptyPolynomial));
  }
}
