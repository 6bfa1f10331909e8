//! Outcome generation and payout rules for the three games.
//!
//! Outcomes are pure functions over an injected RNG, so rounds are
//! reproducible under a seeded generator. Settlement reuses the same rules
//! to decide whether a submitted multiplier can occur at all for the
//! claimed game type.

pub mod crash;
pub mod dice;
pub mod slots;

use shared::{GameType, Multiplier};

/// Whether a submitted win multiplier can occur under the game's rules.
///
/// Zero always verifies: it encodes a lost round for every game.
pub fn multiplier_is_achievable(game_type: GameType, multiplier: Multiplier) -> bool {
    if multiplier.is_zero() {
        return true;
    }
    match game_type {
        GameType::Slots => {
            multiplier.is_whole()
                && slots::total_is_achievable((multiplier.as_hundredths() / 100) as u32)
        }
        GameType::Dice => dice::multiplier_is_achievable(multiplier),
        GameType::Crash => crash::cashout_in_range(multiplier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_multiplier_verifies_for_all_games() {
        for game in GameType::ALL {
            assert!(multiplier_is_achievable(game, Multiplier::ZERO));
        }
    }

    #[test]
    fn test_fractional_slots_multiplier_rejected() {
        let m = Multiplier::from_hundredths(250);
        assert!(!multiplier_is_achievable(GameType::Slots, m));
    }

    #[test]
    fn test_dice_multiplier_dispatch() {
        // over target 50: 98/49 = 2.00
        assert!(multiplier_is_achievable(
            GameType::Dice,
            Multiplier::from_hundredths(200)
        ));
        assert!(!multiplier_is_achievable(
            GameType::Dice,
            Multiplier::from_hundredths(9_700)
        ));
    }

    #[test]
    fn test_crash_multiplier_dispatch() {
        assert!(multiplier_is_achievable(
            GameType::Crash,
            Multiplier::from_hundredths(171)
        ));
        assert!(!multiplier_is_achievable(
            GameType::Crash,
            Multiplier::from_hundredths(50)
        ));
    }
}
