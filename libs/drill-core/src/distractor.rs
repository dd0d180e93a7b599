//! Distractor selection for multiple-choice questions.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::matching::normalize;
use crate::types::Term;

/// Number of wrong options shown next to the correct one.
pub const DISTRACTOR_COUNT: usize = 3;

/// Pick up to `n` distractors for `correct` from `pool`.
///
/// Terms sharing the correct term's normalized `en` or `ko` are never
/// chosen. A small pool yields fewer distractors rather than an error.
pub fn pick<R: Rng + ?Sized>(pool: &[Term], correct: &Term, n: usize, rng: &mut R) -> Vec<Term> {
    let correct_en = normalize(&correct.en);
    let correct_ko = normalize(&correct.ko);

    let mut candidates: Vec<&Term> = pool
        .iter()
        .filter(|t| normalize(&t.en) != correct_en && normalize(&t.ko) != correct_ko)
        .collect();
    candidates.shuffle(rng);
    candidates.into_iter().take(n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool() -> Vec<Term> {
        vec![
            Term::new("정수", "integer"),
            Term::new("유리수", "rational number"),
            Term::new("무리수", "irrational number"),
            Term::new("실수", "real number"),
            Term::new("자연수", "natural number"),
            Term::new("범위(통계)", "range"),
        ]
    }

    #[test]
    fn never_returns_the_correct_term() {
        let pool = pool();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let picked = pick(&pool, &pool[0], DISTRACTOR_COUNT, &mut rng);
            assert_eq!(picked.len(), 3);
            assert!(picked.iter().all(|t| t.ko != "정수"));
        }
    }

    #[test]
    fn excludes_shared_english_or_korean() {
        let mut pool = pool();
        pool.push(Term::new("치역", "Range"));
        pool.push(Term::new(" 정수 ", "whole number"));
        let correct = Term::new("범위(통계)", "range");
        let mut rng = StdRng::seed_from_u64(1);
        let picked = pick(&pool, &correct, 10, &mut rng);
        assert!(picked.iter().all(|t| normalize(&t.en) != "range"));
        // 8 terms, minus the two sharing "range".
        assert_eq!(picked.len(), 6);

        let correct = Term::new("정수", "int");
        let picked = pick(&pool, &correct, 10, &mut rng);
        assert!(picked.iter().all(|t| normalize(&t.ko) != "정수"));
        assert_eq!(picked.len(), 6);
    }

    #[test]
    fn small_pool_yields_fewer() {
        let pool = vec![Term::new("정수", "integer"), Term::new("원점", "origin")];
        let mut rng = StdRng::seed_from_u64(3);
        let picked = pick(&pool, &pool[0], DISTRACTOR_COUNT, &mut rng);
        assert_eq!(picked, vec![Term::new("원점", "origin")]);
        assert!(pick(&[], &pool[0], DISTRACTOR_COUNT, &mut rng).is_empty());
    }

    #[test]
    fn no_duplicates_in_result() {
        let pool = pool();
        let mut rng = StdRng::seed_from_u64(11);
        let picked = pick(&pool, &pool[1], 5, &mut rng);
        let mut keys: Vec<_> = picked.iter().map(Term::key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), picked.len());
    }
}
