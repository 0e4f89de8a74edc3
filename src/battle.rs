use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const MAX_DICE: u32 = 3;

/// Dice and losses of a single attack roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    pub attacker_dice: Vec<u8>,
    pub defender_dice: Vec<u8>,
    pub attacker_losses: u32,
    pub defender_losses: u32,
}

/// Rolls `n` six-sided dice, highest first
pub fn roll_dice<R: Rng + ?Sized>(rng: &mut R, n: u32) -> Vec<u8> {
    (0..n)
        .map(|_| rng.gen_range(1..=6u8))
        .sorted_unstable_by(|a, b| b.cmp(a))
        .collect()
}

/// Compares two descending dice sequences rank for rank.
///
/// Returns `(attacker_losses, defender_losses)`. Ties go to the defender.
pub fn compare_dice(attacker: &[u8], defender: &[u8]) -> (u32, u32) {
    attacker
        .iter()
        .zip(defender.iter())
        .fold((0, 0), |(attacker_losses, defender_losses), (a, d)| {
            if a > d {
                (attacker_losses, defender_losses + 1)
            } else {
                (attacker_losses + 1, defender_losses)
            }
        })
}

pub fn resolve<R: Rng + ?Sized>(rng: &mut R, attacking: u32, defending: u32) -> BattleReport {
    let attacker_dice = roll_dice(rng, attacking);
    let defender_dice = roll_dice(rng, defending);
    let (attacker_losses, defender_losses) = compare_dice(&attacker_dice, &defender_dice);

    BattleReport {
        attacker_dice,
        defender_dice,
        attacker_losses,
        defender_losses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    #[test]
    fn test_attacker_sweeps() {
        assert_eq!(compare_dice(&[6, 5, 4], &[3, 2, 1]), (0, 3));
    }

    #[test]
    fn test_ties_favor_defender() {
        assert_eq!(compare_dice(&[5, 5, 5], &[5, 5, 5]), (3, 0));
    }

    #[test]
    fn test_split_result() {
        assert_eq!(compare_dice(&[6, 3], &[5, 4]), (1, 1));
    }

    #[test]
    fn test_compare_uses_shorter_side() {
        assert_eq!(compare_dice(&[6, 6, 6], &[1]), (0, 1));
        assert_eq!(compare_dice(&[1], &[6, 6, 6]), (1, 0));
        assert_eq!(compare_dice(&[6], &[]), (0, 0));
    }

    #[test]
    fn test_roll_dice_sorted_and_in_range() {
        let mut rng = XorShiftRng::seed_from_u64(42);
        for n in 0..=3 {
            for _ in 0..100 {
                let dice = roll_dice(&mut rng, n);
                assert_eq!(dice.len(), n as usize);
                assert!(dice.iter().all(|d| (1..=6).contains(d)));
                assert!(dice.windows(2).all(|w| w[0] >= w[1]));
            }
        }
    }

    #[test]
    fn test_resolve_losses_match_pairs() {
        let mut rng = XorShiftRng::seed_from_u64(3);
        for _ in 0..200 {
            let report = resolve(&mut rng, 3, 2);
            assert_eq!(report.attacker_losses + report.defender_losses, 2);
        }
    }

    #[test]
    fn test_resolve_is_deterministic_for_seed() {
        let first = resolve(&mut XorShiftRng::seed_from_u64(11), 3, 3);
        let second = resolve(&mut XorShiftRng::seed_from_u64(11), 3, 3);
        assert_eq!(first, second);
    }
}
