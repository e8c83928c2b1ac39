//! Engine constants. All fractional values and token amounts are scaled
//! integers with an implicit denominator of [`SCALE`] (10^18).

/// Fixed-point scale: `1.0 == SCALE`.
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Number of decimal digits carried by [`SCALE`].
pub const SCALE_DECIMALS: usize = 18;

/// Minimum number of votes (both sides) before any decision is considered.
pub const MIN_VOTERS: u64 = 22;

/// A side wins once its hybrid score is at least this multiple of the other.
pub const THRESHOLD_RATIO: u128 = 2;

/// Exchange rate meaning "price reference and stake share one unit".
pub const ONE_TO_ONE_EXCHANGE_RATE: u128 = SCALE;

/// Upper bound on the victory factor. A total landslide still leaves the
/// minority one part in 10^18 of its stake.
pub const MAX_VICTORY_FACTOR: u128 = SCALE - 1;

/// Seconds in one hour, used for vote-window extensions.
pub const SECONDS_PER_HOUR: u64 = 3_600;
