//! Random draws used by the adventure core.
//!
//! Everything that rolls takes `&mut dyn Dice` so the pure rules can run against
//! the thread RNG in production and against scripted rolls when replaying a fight.

use rand::Rng;
use std::collections::VecDeque;

pub trait Dice {
    /// Uniform integer in `[lo, hi]` (bounds are swapped when reversed).
    fn roll(&mut self, lo: i32, hi: i32) -> i32;

    /// Percent check: draws in `[1, 100]` and succeeds when the roll is `<= chance`.
    fn chance(&mut self, chance: i32) -> bool {
        chance > 0 && self.roll(1, 100) <= chance
    }
}

impl<R: Rng + ?Sized> Dice for R {
    fn roll(&mut self, lo: i32, hi: i32) -> i32 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        self.random_range(lo..=hi)
    }
}

/// Replays a fixed list of rolls. Each scripted value is clamped into the requested
/// range; once the script runs out every roll returns the upper bound, which makes
/// every percent check fail unless its chance is 100.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<i32>,
    drawn: usize,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = i32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            drawn: 0,
        }
    }

    /// How many rolls have been drawn so far, scripted or not.
    pub fn drawn(&self) -> usize {
        self.drawn
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, lo: i32, hi: i32) -> i32 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        self.drawn += 1;
        match self.rolls.pop_front() {
            Some(v) => v.clamp(lo, hi),
            None => hi,
        }
    }
}
