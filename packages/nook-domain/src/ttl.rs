use regex::Regex;
use time::{Duration, OffsetDateTime};

const TTL_PATTERN: &str = r"^\s*(\d+)\s*(ms|s|m|h|d|w)\s*$";

/// Parses `<n><unit>` where unit is one of `ms`, `s`, `m`, `h`, `d`, `w`.
///
/// Returns `None` for malformed input and for zero durations.
pub fn parse_ttl(raw: &str) -> Option<Duration> {
	let re = Regex::new(TTL_PATTERN).ok()?;
	let captures = re.captures(raw)?;
	let amount: i64 = captures.get(1)?.as_str().parse().ok()?;
	let unit_ms: i64 = match captures.get(2)?.as_str() {
		"ms" => 1,
		"s" => 1_000,
		"m" => 60_000,
		"h" => 3_600_000,
		"d" => 86_400_000,
		"w" => 604_800_000,
		_ => return None,
	};
	let duration = Duration::milliseconds(amount.checked_mul(unit_ms)?);

	if duration.is_positive() { Some(duration) } else { None }
}

pub fn compute_expires_at(ttl: Option<Duration>, now: OffsetDateTime) -> Option<OffsetDateTime> {
	ttl.filter(|ttl| ttl.is_positive()).and_then(|ttl| now.checked_add(ttl))
}
