//! Crash game: one crash point per round, cash out below it or lose.

use rand::Rng;
use shared::Multiplier;

/// Largest crash point the formula can produce (r = 0).
pub const MAX_CRASH_POINT: Multiplier = Multiplier::from_hundredths(2_618);

/// Smallest crash point the formula can produce (r -> 1).
pub const MIN_CRASH_POINT: Multiplier = Multiplier::from_hundredths(147);

/// Crash point for a uniform draw r in [0, 1):
/// floor(100*e/(r + 0.1) - 100) / 100.
pub fn crash_point_from_unit(r: f64) -> Multiplier {
    let hundredths = ((100.0 * std::f64::consts::E) / (r + 0.1) - 100.0).floor() as i64;
    Multiplier::from_hundredths(hundredths)
}

/// Draw the crash point for one round.
pub fn crash_point<R: Rng + ?Sized>(rng: &mut R) -> Multiplier {
    crash_point_from_unit(rng.gen::<f64>())
}

/// A cash-out strictly below the crash point wins; at or beyond it the
/// whole bet is lost.
pub fn is_win(cashout: Multiplier, crash_point: Multiplier) -> bool {
    cashout < crash_point
}

/// Whether a submitted cash-out multiplier is reachable at all: the ramp
/// starts at 1.00 and every round crashes by MAX_CRASH_POINT.
pub fn cashout_in_range(cashout: Multiplier) -> bool {
    cashout >= Multiplier::ONE && cashout < MAX_CRASH_POINT
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_crash_point_formula() {
        // r = 0: floor(271.828/0.1 - 100) = 2618 -> 26.18
        assert_eq!(crash_point_from_unit(0.0), MAX_CRASH_POINT);
        // r = 0.9: floor(271.828/1.0 - 100) = 171 -> 1.71
        assert_eq!(
            crash_point_from_unit(0.9),
            Multiplier::from_hundredths(171)
        );
        // r = 0.5: floor(271.828/0.6 - 100) = 353 -> 3.53
        assert_eq!(
            crash_point_from_unit(0.5),
            Multiplier::from_hundredths(353)
        );
    }

    #[test]
    fn test_crash_point_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1_000 {
            let point = crash_point(&mut rng);
            assert!(point >= MIN_CRASH_POINT);
            assert!(point <= MAX_CRASH_POINT);
        }
    }

    #[test]
    fn test_crash_point_decreases_with_r() {
        let mut last = crash_point_from_unit(0.0);
        for step in 1..10 {
            let point = crash_point_from_unit(step as f64 / 10.0);
            assert!(point <= last);
            last = point;
        }
    }

    #[test]
    fn test_win_requires_cashing_out_below_crash() {
        let crash = Multiplier::from_hundredths(250);
        assert!(is_win(Multiplier::from_hundredths(249), crash));
        assert!(!is_win(crash, crash));
        assert!(!is_win(Multiplier::from_hundredths(300), crash));
    }

    #[test]
    fn test_cashout_range() {
        assert!(cashout_in_range(Multiplier::ONE));
        assert!(cashout_in_range(Multiplier::from_hundredths(2_617)));
        assert!(!cashout_in_range(Multiplier::from_hundredths(99)));
        assert!(!cashout_in_range(MAX_CRASH_POINT));
    }
}
