//! Randomness source for battle resolution
//!
//! Every die roll, shuffle and weighted pick in the engine goes through the
//! [`Dice`] trait. Production runs use a seeded ChaCha8 generator; tests use
//! [`FixedDice`] to replay a scripted sequence.

use std::collections::VecDeque;

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of all randomness consumed by one battle
pub trait Dice: Send {
    /// Uniform integer in `0..bound`. `bound` of zero yields zero.
    fn below(&mut self, bound: u32) -> u32;

    /// Single six-sided die
    fn d6(&mut self) -> i32 {
        self.below(6) as i32 + 1
    }

    /// Sum of two six-sided dice
    fn roll_2d6(&mut self) -> i32 {
        self.d6() + self.d6()
    }

    /// Index drawn with probability proportional to its weight, or `None`
    /// when the table is empty or every weight is zero.
    fn pick_weighted(&mut self, weights: &[u32]) -> Option<usize> {
        let total: u32 = weights.iter().sum();
        if total == 0 {
            return None;
        }

        let mut roll = self.below(total);
        for (idx, weight) in weights.iter().enumerate() {
            if roll < *weight {
                return Some(idx);
            }
            roll -= weight;
        }

        None
    }

    /// Random permutation of `0..len`
    fn shuffle_indices(&mut self, len: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..len).collect();
        for i in (1..len).rev() {
            let j = self.below(i as u32 + 1) as usize;
            order.swap(i, j);
        }
        order
    }
}

/// Dice backed by a seedable PRNG
#[derive(Debug, Clone)]
pub struct RngDice<R: RngCore + Send = ChaCha8Rng> {
    rng: R,
}

impl RngDice<ChaCha8Rng> {
    /// Deterministic dice for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl<R: RngCore + Send> RngDice<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore + Send> Dice for RngDice<R> {
    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.rng.gen_range(0..bound)
    }

    fn pick_weighted(&mut self, weights: &[u32]) -> Option<usize> {
        WeightedIndex::new(weights)
            .ok()
            .map(|dist| dist.sample(&mut self.rng))
    }

    fn shuffle_indices(&mut self, len: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(&mut self.rng);
        order
    }
}

/// Scripted dice: each call consumes the next value of the sequence.
///
/// `roll_2d6` and `d6` return the scripted value directly (clamped to the
/// die's range); `below` reduces it modulo the bound. When the script runs
/// out it starts over from the beginning.
#[derive(Debug, Clone, Default)]
pub struct FixedDice {
    script: Vec<i32>,
    queue: VecDeque<i32>,
    consumed: usize,
}

impl FixedDice {
    pub fn new(script: Vec<i32>) -> Self {
        Self {
            queue: script.iter().copied().collect(),
            script,
            consumed: 0,
        }
    }

    /// Dice that always produce the same value
    pub fn constant(value: i32) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    fn next_value(&mut self) -> Option<i32> {
        if self.queue.is_empty() {
            self.queue.extend(self.script.iter().copied());
        }
        let value = self.queue.pop_front()?;
        self.consumed += 1;
        Some(value)
    }
}

impl Dice for FixedDice {
    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        match self.next_value() {
            Some(v) => v.rem_euclid(bound as i32) as u32,
            None => 0,
        }
    }

    fn d6(&mut self) -> i32 {
        self.next_value().unwrap_or(1).clamp(1, 6)
    }

    fn roll_2d6(&mut self) -> i32 {
        self.next_value().unwrap_or(2).clamp(2, 12)
    }
}

/// Pick an index with probability proportional to its weight.
///
/// Returns `None` when the table is empty or every weight is zero.
pub fn weighted_pick(dice: &mut dyn Dice, weights: &[u32]) -> Option<usize> {
    dice.pick_weighted(weights)
}

/// Shuffle in place with the battle dice
pub fn shuffle<T: Clone>(dice: &mut dyn Dice, items: &mut [T]) {
    let order = dice.shuffle_indices(items.len());
    let shuffled: Vec<T> = order.iter().map(|&i| items[i].clone()).collect();
    items.clone_from_slice(&shuffled);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_dice_are_deterministic() {
        let mut a = RngDice::seeded(42);
        let mut b = RngDice::seeded(42);
        for _ in 0..50 {
            assert_eq!(a.roll_2d6(), b.roll_2d6());
        }
    }

    #[test]
    fn test_rolls_stay_in_range() {
        let mut dice = RngDice::seeded(7);
        for _ in 0..500 {
            let roll = dice.roll_2d6();
            assert!((2..=12).contains(&roll));
            let d = dice.d6();
            assert!((1..=6).contains(&d));
        }
    }

    #[test]
    fn test_fixed_dice_replays_script() {
        let mut dice = FixedDice::new(vec![11, 4]);
        assert_eq!(dice.roll_2d6(), 11);
        assert_eq!(dice.roll_2d6(), 4);
        assert_eq!(dice.roll_2d6(), 11);
        assert_eq!(dice.consumed(), 3);
    }

    #[test]
    fn test_fixed_dice_clamps_to_die_range() {
        let mut dice = FixedDice::new(vec![20, 0]);
        assert_eq!(dice.roll_2d6(), 12);
        assert_eq!(dice.d6(), 1);
    }

    #[test]
    fn test_weighted_pick_skips_zero_weights() {
        let mut dice = RngDice::seeded(3);
        for _ in 0..200 {
            let idx = weighted_pick(&mut dice, &[0, 5, 0, 5]).unwrap();
            assert!(idx == 1 || idx == 3);
        }
    }

    #[test]
    fn test_weighted_pick_empty_table() {
        let mut dice = FixedDice::constant(0);
        assert_eq!(weighted_pick(&mut dice, &[]), None);
        assert_eq!(weighted_pick(&mut dice, &[0, 0]), None);
        assert_eq!(dice.consumed(), 0);
    }

    #[test]
    fn test_weighted_pick_boundaries() {
        // below(10) == 2 lands in the first bucket, 3 in the second
        let mut dice = FixedDice::new(vec![2, 3]);
        assert_eq!(weighted_pick(&mut dice, &[3, 7]), Some(0));
        assert_eq!(weighted_pick(&mut dice, &[3, 7]), Some(1));
    }

    #[test]
    fn test_scripted_shuffle_is_fisher_yates() {
        // below(3) == 0 swaps the last item to the front, below(2) == 1 keeps the rest
        let mut dice = FixedDice::new(vec![0, 1]);
        let mut items = vec!['a', 'b', 'c'];
        shuffle(&mut dice, &mut items);
        assert_eq!(items, vec!['c', 'b', 'a']);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let mut a = RngDice::seeded(5);
        let mut b = RngDice::seeded(5);
        assert_eq!(a.shuffle_indices(8), b.shuffle_indices(8));
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut dice = RngDice::seeded(11);
        let mut items = vec![1, 2, 3, 4, 5];
        shuffle(&mut dice, &mut items);
        items.sort();
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
    }
}
