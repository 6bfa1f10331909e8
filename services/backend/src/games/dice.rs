//! d100 over/under game.

use rand::Rng;
use shared::{Multiplier, DICE_MAX_TARGET, DICE_MIN_TARGET};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("dice target must be between 1 and 98, got {0}")]
pub struct InvalidTarget(pub u8);

/// Which side of the target the player bets the roll lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    Over,
    Under,
}

/// Roll the d100: uniform integer in [1, 100].
pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.gen_range(1..=100)
}

/// "over" wins on roll > target, "under" on roll < target. Hitting the
/// target exactly loses either way.
pub fn is_win(roll: u8, prediction: Prediction, target: u8) -> bool {
    match prediction {
        Prediction::Over => roll > target,
        Prediction::Under => roll < target,
    }
}

/// Win multiplier for a target, to the cent.
///
/// 98/(99-target) for "over" and 98/target for "under"; the 98 numerator
/// (against 100 possible rolls) is the house edge.
pub fn win_multiplier(prediction: Prediction, target: u8) -> Result<Multiplier, InvalidTarget> {
    if !(DICE_MIN_TARGET..=DICE_MAX_TARGET).contains(&target) {
        return Err(InvalidTarget(target));
    }
    let denominator = match prediction {
        Prediction::Over => 99 - target as i64,
        Prediction::Under => target as i64,
    };
    let hundredths = (9_800_f64 / denominator as f64).round() as i64;
    Ok(Multiplier::from_hundredths(hundredths))
}

/// Whether a submitted win multiplier matches some legal target. The
/// candidate space is small (two predictions x 98 targets), so settlement
/// just scans it.
pub fn multiplier_is_achievable(multiplier: Multiplier) -> bool {
    (DICE_MIN_TARGET..=DICE_MAX_TARGET).any(|target| {
        win_multiplier(Prediction::Over, target) == Ok(multiplier)
            || win_multiplier(Prediction::Under, target) == Ok(multiplier)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_roll_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1_000 {
            let roll = roll(&mut rng);
            assert!((1..=100).contains(&roll));
        }
    }

    #[test]
    fn test_win_conditions() {
        assert!(is_win(75, Prediction::Over, 50));
        assert!(!is_win(50, Prediction::Over, 50));
        assert!(!is_win(25, Prediction::Over, 50));

        assert!(is_win(25, Prediction::Under, 50));
        assert!(!is_win(50, Prediction::Under, 50));
        assert!(!is_win(75, Prediction::Under, 50));
    }

    #[test]
    fn test_multiplier_formula() {
        // over 50: 98/49 = 2.00
        assert_eq!(
            win_multiplier(Prediction::Over, 50).unwrap(),
            Multiplier::from_hundredths(200)
        );
        // under 50: 98/50 = 1.96
        assert_eq!(
            win_multiplier(Prediction::Under, 50).unwrap(),
            Multiplier::from_hundredths(196)
        );
        // over 30: 98/69 = 1.4203 -> 1.42
        assert_eq!(
            win_multiplier(Prediction::Over, 30).unwrap(),
            Multiplier::from_hundredths(142)
        );
        // under 1: 98/1 = 98.00, the highest payout on the board
        assert_eq!(
            win_multiplier(Prediction::Under, 1).unwrap(),
            Multiplier::from_hundredths(9_800)
        );
    }

    #[test]
    fn test_target_bounds_rejected() {
        assert_eq!(
            win_multiplier(Prediction::Over, 0),
            Err(InvalidTarget(0))
        );
        assert_eq!(
            win_multiplier(Prediction::Under, 99),
            Err(InvalidTarget(99))
        );
    }

    #[test]
    fn test_achievable_multipliers() {
        assert!(multiplier_is_achievable(Multiplier::from_hundredths(200)));
        assert!(multiplier_is_achievable(Multiplier::from_hundredths(196)));
        assert!(multiplier_is_achievable(Multiplier::from_hundredths(9_800)));
        // nothing between 98/2 = 49.00 and 98/1 = 98.00
        assert!(!multiplier_is_achievable(Multiplier::from_hundredths(9_700)));
        assert!(!multiplier_is_achievable(Multiplier::from_hundredths(1)));
    }
}
