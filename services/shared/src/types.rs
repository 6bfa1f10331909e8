/// Type-safe wrappers for domain primitives
///
/// Currency is fixed point with two decimals, carried as i64 cents. The
/// JSON API exchanges plain numbers, so conversion validates range at the
/// boundary and all arithmetic is checked.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::constants::MAX_AMOUNT_CENTS;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoneyError {
    #[error("value is not a finite number")]
    NotFinite,

    #[error("value out of range: {0}")]
    OutOfRange(f64),

    #[error("arithmetic overflow")]
    Overflow,
}

/// Currency amount in cents (fixed point, two decimals).
///
/// Balances may legitimately go negative (losses are applied without a
/// floor), so the inner value is signed. API-submitted amounts are
/// range-checked on deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn as_cents(self) -> i64 {
        self.0
    }

    /// Convert a boundary float to cents, rounding half away from zero.
    pub fn try_from_f64(value: f64) -> Result<Self, MoneyError> {
        if !value.is_finite() {
            return Err(MoneyError::NotFinite);
        }
        let cents = (value * 100.0).round();
        if cents.abs() > MAX_AMOUNT_CENTS as f64 {
            return Err(MoneyError::OutOfRange(value));
        }
        Ok(Self(cents as i64))
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn checked_add(self, other: Amount) -> Result<Self, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    pub fn checked_sub(self, other: Amount) -> Result<Self, MoneyError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Amount::try_from_f64(value)
            .map_err(|e| serde::de::Error::custom(format!("invalid amount: {}", e)))
    }
}

/// Game multiplier in hundredths (fixed point, two decimals).
///
/// Never negative; zero encodes a lost round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Multiplier(i64);

impl Multiplier {
    pub const ZERO: Multiplier = Multiplier(0);
    pub const ONE: Multiplier = Multiplier(100);

    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    pub const fn as_hundredths(self) -> i64 {
        self.0
    }

    pub fn try_from_f64(value: f64) -> Result<Self, MoneyError> {
        if !value.is_finite() {
            return Err(MoneyError::NotFinite);
        }
        if value < 0.0 {
            return Err(MoneyError::OutOfRange(value));
        }
        let hundredths = (value * 100.0).round();
        if hundredths > MAX_AMOUNT_CENTS as f64 {
            return Err(MoneyError::OutOfRange(value));
        }
        Ok(Self(hundredths as i64))
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Whether the multiplier is a whole number (e.g. slot line totals).
    pub fn is_whole(self) -> bool {
        self.0 % 100 == 0
    }

    /// Payout for a bet at this multiplier, rounded half away from zero
    /// to the cent.
    ///
    /// This is the payout calculator: every persisted history row must
    /// satisfy `payout == multiplier.apply(bet)`.
    pub fn apply(self, bet: Amount) -> Result<Amount, MoneyError> {
        let product = bet.as_cents() as i128 * self.0 as i128;
        let cents = if product >= 0 {
            (product + 50) / 100
        } else {
            (product - 50) / 100
        };
        if cents.unsigned_abs() > MAX_AMOUNT_CENTS as u128 {
            return Err(MoneyError::Overflow);
        }
        Ok(Amount::from_cents(cents as i64))
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}x", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Multiplier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Multiplier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Multiplier::try_from_f64(value)
            .map_err(|e| serde::de::Error::custom(format!("invalid multiplier: {}", e)))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown game type: {0}")]
pub struct UnknownGameType(pub String);

/// The games the settlement ledger accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Slots,
    Dice,
    Crash,
}

impl GameType {
    pub const ALL: [GameType; 3] = [GameType::Slots, GameType::Dice, GameType::Crash];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Slots => "slots",
            GameType::Dice => "dice",
            GameType::Crash => "crash",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameType {
    type Err = UnknownGameType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slots" => Ok(GameType::Slots),
            "dice" => Ok(GameType::Dice),
            "crash" => Ok(GameType::Crash),
            other => Err(UnknownGameType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_from_f64_rounds_to_cents() {
        assert_eq!(Amount::try_from_f64(10.0).unwrap().as_cents(), 1_000);
        assert_eq!(Amount::try_from_f64(14.204).unwrap().as_cents(), 1_420);
        assert_eq!(Amount::try_from_f64(14.206).unwrap().as_cents(), 1_421);
        assert_eq!(Amount::try_from_f64(0.01).unwrap().as_cents(), 1);
    }

    #[test]
    fn test_amount_rejects_non_finite() {
        assert_eq!(Amount::try_from_f64(f64::NAN), Err(MoneyError::NotFinite));
        assert_eq!(
            Amount::try_from_f64(f64::INFINITY),
            Err(MoneyError::NotFinite)
        );
    }

    #[test]
    fn test_amount_rejects_out_of_range() {
        assert!(Amount::try_from_f64(1.0e12).is_err());
        assert!(Amount::try_from_f64(-1.0e12).is_err());
    }

    #[test]
    fn test_amount_checked_arithmetic() {
        let a = Amount::from_cents(1_000);
        let b = Amount::from_cents(250);
        assert_eq!(a.checked_add(b).unwrap().as_cents(), 1_250);
        assert_eq!(a.checked_sub(b).unwrap().as_cents(), 750);
        assert!(Amount::from_cents(i64::MAX).checked_add(b).is_err());
    }

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::from_cents(1_000).to_string(), "10.00");
        assert_eq!(Amount::from_cents(5).to_string(), "0.05");
        assert_eq!(Amount::from_cents(-1_050).to_string(), "-10.50");
    }

    #[test]
    fn test_amount_json_round_trip() {
        let amount = Amount::from_cents(1_234);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "12.34");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn test_amount_deserializes_json_integers() {
        let amount: Amount = serde_json::from_str("10").unwrap();
        assert_eq!(amount.as_cents(), 1_000);
    }

    #[test]
    fn test_multiplier_rejects_negative() {
        assert!(Multiplier::try_from_f64(-0.5).is_err());
    }

    #[test]
    fn test_multiplier_apply_exact() {
        let bet = Amount::from_cents(1_000);
        let m = Multiplier::from_hundredths(200);
        assert_eq!(m.apply(bet).unwrap().as_cents(), 2_000);
    }

    #[test]
    fn test_multiplier_apply_rounds_half_up() {
        // 10.01 * 1.42 = 14.2142 -> 14.21
        let bet = Amount::from_cents(1_001);
        let m = Multiplier::from_hundredths(142);
        assert_eq!(m.apply(bet).unwrap().as_cents(), 1_421);

        // 0.25 * 1.42 = 0.355 -> 0.36
        let bet = Amount::from_cents(25);
        assert_eq!(m.apply(bet).unwrap().as_cents(), 36);
    }

    #[test]
    fn test_multiplier_apply_zero_is_zero() {
        let bet = Amount::from_cents(123_456);
        assert_eq!(Multiplier::ZERO.apply(bet).unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_game_type_round_trip() {
        for game in GameType::ALL {
            assert_eq!(game.as_str().parse::<GameType>().unwrap(), game);
        }
        assert!("roulette".parse::<GameType>().is_err());
    }

    #[test]
    fn test_game_type_serde_lowercase() {
        assert_eq!(serde_json::to_string(&GameType::Slots).unwrap(), "\"slots\"");
        let game: GameType = serde_json::from_str("\"crash\"").unwrap();
        assert_eq!(game, GameType::Crash);
    }
}
