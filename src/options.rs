//! Multiple-choice option generation.
//!
//! The generated set always contains the correct answer exactly once. Wrong
//! options are sampled from a pool of candidate meanings; when the pool cannot
//! supply enough distinct distractors within the retry budget, placeholder
//! entries fill the remaining slots so the option count is always exact.

use rand::seq::SliceRandom;
use rand::Rng;

/// Options presented per question.
pub const OPTION_COUNT: usize = 4;
/// Sampling attempts before giving up and padding with placeholders.
/// Bounds worst-case generation time when the pool is mostly duplicates.
const RETRY_BUDGET: usize = 20;
/// Filler shown when the pool has too few distinct wrong answers.
pub const PLACEHOLDER_OPTION: &str = "insufficient distractor data";

/// Build a shuffled option set of exactly `size` entries around `correct`.
///
/// Wrong answers are drawn uniformly from `pool` with duplicates rejected, so
/// the correct answer never appears twice even when the pool contains it.
pub fn generate_options<R: Rng>(correct: &str, pool: &[String], size: usize, rng: &mut R) -> Vec<String> {
  let mut options: Vec<String> = Vec::with_capacity(size);
  options.push(correct.to_string());

  let mut attempts = 0;
  while options.len() < size && attempts < RETRY_BUDGET {
    attempts += 1;
    if pool.len() > 1 {
      let candidate = &pool[rng.gen_range(0..pool.len())];
      if !options.iter().any(|o| o == candidate) {
        options.push(candidate.clone());
      }
    } else {
      options.push(PLACEHOLDER_OPTION.to_string());
    }
  }
  while options.len() < size {
    options.push(PLACEHOLDER_OPTION.to_string());
  }

  options.shuffle(rng);
  options
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pool(meanings: &[&str]) -> Vec<String> {
    meanings.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn always_exactly_size_entries_with_correct_once() {
    let pool = pool(&["a", "b", "c", "d", "e", "correct"]);
    let mut rng = rand::thread_rng();
    for _ in 0..50 {
      let opts = generate_options("correct", &pool, OPTION_COUNT, &mut rng);
      assert_eq!(opts.len(), OPTION_COUNT);
      assert_eq!(opts.iter().filter(|o| *o == "correct").count(), 1);
    }
  }

  #[test]
  fn no_duplicate_non_placeholder_entries() {
    let pool = pool(&["a", "a", "b", "b", "c", "c"]);
    let mut rng = rand::thread_rng();
    for _ in 0..50 {
      let opts = generate_options("z", &pool, OPTION_COUNT, &mut rng);
      let mut real: Vec<&String> = opts.iter().filter(|o| *o != PLACEHOLDER_OPTION).collect();
      real.sort();
      let before = real.len();
      real.dedup();
      assert_eq!(real.len(), before);
    }
  }

  #[test]
  fn two_distinct_wrongs_get_one_placeholder() {
    // Pool offers only two distinct alternatives to the correct answer.
    let pool = pool(&["correct", "wrong1", "wrong2"]);
    let mut rng = rand::thread_rng();
    for _ in 0..20 {
      let opts = generate_options("correct", &pool, OPTION_COUNT, &mut rng);
      assert_eq!(opts.len(), OPTION_COUNT);
      assert_eq!(opts.iter().filter(|o| *o == PLACEHOLDER_OPTION).count(), 1);
      assert!(opts.iter().any(|o| o == "wrong1"));
      assert!(opts.iter().any(|o| o == "wrong2"));
    }
  }

  #[test]
  fn tiny_pool_fills_with_placeholders_instead_of_looping() {
    let pool = pool(&["correct"]);
    let opts = generate_options("correct", &pool, OPTION_COUNT, &mut rand::thread_rng());
    assert_eq!(opts.len(), OPTION_COUNT);
    assert_eq!(opts.iter().filter(|o| *o == PLACEHOLDER_OPTION).count(), 3);
  }

  #[test]
  fn empty_pool_is_safe() {
    let opts = generate_options("correct", &[], OPTION_COUNT, &mut rand::thread_rng());
    assert_eq!(opts.len(), OPTION_COUNT);
    assert_eq!(opts.iter().filter(|o| *o == "correct").count(), 1);
  }
}
