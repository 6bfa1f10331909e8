/// Shared constants for the casino settlement service
///
/// This module centralizes all magic numbers and configuration constants
/// to prevent inconsistencies between the API surface, the settlement
/// core, and the storage backends.

/// Balance granted to every freshly registered account, in cents ($1000.00).
pub const STARTING_BALANCE_CENTS: i64 = 100_000;

/// Largest representable currency value in cents.
///
/// Matches the relational schema's NUMERIC(10,2) columns; amounts beyond
/// this are rejected at the JSON boundary rather than silently truncated.
pub const MAX_AMOUNT_CENTS: i64 = 9_999_999_999;

/// Size of verification, reset, and session tokens before hex encoding.
///
/// 32 random bytes (64 hex chars), the same entropy the original
/// verification links carried.
pub const TOKEN_BYTES: usize = 32;

/// Lifetime of a password-reset token (1 hour).
pub const RESET_TOKEN_TTL_SECS: i64 = 3_600;

/// Lifetime of a login session (24 hours).
pub const SESSION_TTL_SECS: i64 = 86_400;

/// Default interval between sweeps of expired sessions (24 hours).
pub const SESSION_SWEEP_INTERVAL_SECS: u64 = 86_400;

/// Name of the session cookie carrying the opaque session id.
pub const SESSION_COOKIE: &str = "session_id";

/// Lowest dice target a player may choose.
pub const DICE_MIN_TARGET: u8 = 1;

/// Highest dice target a player may choose.
///
/// The win multiplier is 98/(99-target) for "over" and 98/target for
/// "under"; targets outside [1, 98] make the formula degenerate.
pub const DICE_MAX_TARGET: u8 = 98;
