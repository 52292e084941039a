use std::{cmp::Ordering, fmt, str::FromStr};

use crate::text;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Vector dimensions differ: {left} vs {right}.")]
pub struct DimensionMismatch {
	pub left: usize,
	pub right: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Unknown score mapping {0:?}; expected inverse or linear.")]
pub struct UnknownScoreMapping(pub String);

/// Converts a vector distance into the shared 0-100 score scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScoreMapping {
	/// `100 / (1 + d)`.
	#[default]
	Inverse,
	/// `100 * (1 - d / minimal_distance)`.
	Linear,
}
impl ScoreMapping {
	/// Returns `None` when the candidate lies beyond `minimal_distance` and must be excluded.
	pub fn to_score(self, distance: f64, minimal_distance: f64) -> Option<f64> {
		if !distance.is_finite() || distance < 0.0 || distance > minimal_distance {
			return None;
		}

		let raw = match self {
			Self::Inverse => MAX_SCORE / (1.0 + distance),
			Self::Linear =>
				if minimal_distance <= 0.0 {
					MAX_SCORE
				} else {
					MAX_SCORE * (1.0 - distance / minimal_distance)
				},
		};

		Some(clamp_score(raw))
	}
}
impl FromStr for ScoreMapping {
	type Err = UnknownScoreMapping;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"inverse" => Ok(Self::Inverse),
			"linear" => Ok(Self::Linear),
			_ => Err(UnknownScoreMapping(raw.to_string())),
		}
	}
}
impl fmt::Display for ScoreMapping {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Inverse => f.write_str("inverse"),
			Self::Linear => f.write_str("linear"),
		}
	}
}

/// Jaro-Winkler similarity on normalized text, scaled to 0-100.
///
/// Case and whitespace layout do not affect the score. Blank input never matches anything,
/// including another blank input.
pub fn fuzzy_score(a: &str, b: &str) -> f64 {
	let a = text::normalize(a);
	let b = text::normalize(b);

	if a.is_empty() || b.is_empty() {
		return MIN_SCORE;
	}
	if a == b {
		return MAX_SCORE;
	}

	// Fixed argument order keeps the score symmetric.
	let (first, second) = if a <= b { (&a, &b) } else { (&b, &a) };

	clamp_score(strsim::jaro_winkler(first, second) * MAX_SCORE)
}

/// Edit-distance ratio in 0.0-1.0, used to snap a query onto a catalog description.
pub fn correction_ratio(a: &str, b: &str) -> f64 {
	let a = text::normalize(a);
	let b = text::normalize(b);

	if a.is_empty() || b.is_empty() {
		return 0.0;
	}

	strsim::normalized_levenshtein(&a, &b).clamp(0.0, 1.0)
}

/// Euclidean distance between two vectors of the same length.
pub fn vector_distance(u: &[f32], v: &[f32]) -> Result<f64, DimensionMismatch> {
	if u.len() != v.len() {
		return Err(DimensionMismatch { left: u.len(), right: v.len() });
	}

	let sum: f64 = u
		.iter()
		.zip(v)
		.map(|(a, b)| {
			let diff = f64::from(*a) - f64::from(*b);

			diff * diff
		})
		.sum();

	Ok(sum.sqrt())
}

/// Clamps to 0-100 and rounds to two decimals. NaN maps to zero.
pub fn clamp_score(raw: f64) -> f64 {
	if raw.is_nan() {
		return MIN_SCORE;
	}

	let clamped = raw.clamp(MIN_SCORE, MAX_SCORE);

	(clamped * 100.0).round() / 100.0
}

/// Score descending, then code ascending.
pub fn rank_order(a_score: f64, a_code: &str, b_score: f64, b_code: &str) -> Ordering {
	b_score.total_cmp(&a_score).then_with(|| a_code.cmp(b_code))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn identical_text_scores_full() {
		assert_eq!(fuzzy_score("Harry Potter", "Harry Potter"), MAX_SCORE);
		assert_eq!(fuzzy_score("Harry  Potter", "harry potter "), MAX_SCORE);
	}

	#[test]
	fn blank_text_scores_zero() {
		assert_eq!(fuzzy_score("", ""), MIN_SCORE);
		assert_eq!(fuzzy_score("   ", "abc"), MIN_SCORE);
	}

	#[test]
	fn fuzzy_score_is_symmetric() {
		let ab = fuzzy_score("Customer 43", "Custmer 43");
		let ba = fuzzy_score("Custmer 43", "Customer 43");

		assert_eq!(ab, ba);
	}

	#[test]
	fn distance_requires_equal_dimensions() {
		let err = vector_distance(&[1.0, 2.0], &[1.0]).expect_err("expected mismatch");

		assert_eq!(err, DimensionMismatch { left: 2, right: 1 });
		assert_eq!(vector_distance(&[0.0, 3.0], &[4.0, 0.0]), Ok(5.0));
	}

	#[test]
	fn inverse_mapping_excludes_far_candidates() {
		assert_eq!(ScoreMapping::Inverse.to_score(0.0, 1.0), Some(100.0));
		assert_eq!(ScoreMapping::Inverse.to_score(1.0, 1.0), Some(50.0));
		assert_eq!(ScoreMapping::Inverse.to_score(1.01, 1.0), None);
	}

	#[test]
	fn linear_mapping_spans_full_range() {
		assert_eq!(ScoreMapping::Linear.to_score(0.0, 2.0), Some(100.0));
		assert_eq!(ScoreMapping::Linear.to_score(1.0, 2.0), Some(50.0));
		assert_eq!(ScoreMapping::Linear.to_score(2.0, 2.0), Some(0.0));
		assert_eq!(ScoreMapping::Linear.to_score(0.0, 0.0), Some(100.0));
	}

	#[test]
	fn parses_mapping_names() {
		assert_eq!("Linear".parse::<ScoreMapping>(), Ok(ScoreMapping::Linear));
		assert_eq!(" inverse ".parse::<ScoreMapping>(), Ok(ScoreMapping::Inverse));
		assert!("cosine".parse::<ScoreMapping>().is_err());
	}

	#[test]
	fn clamp_handles_nan_and_rounding() {
		assert_eq!(clamp_score(f64::NAN), 0.0);
		assert_eq!(clamp_score(123.0), 100.0);
		assert_eq!(clamp_score(-4.0), 0.0);
		assert_eq!(clamp_score(85.5549), 85.55);
	}

	#[test]
	fn ranks_by_score_then_code() {
		assert_eq!(rank_order(90.0, "b", 80.0, "a"), Ordering::Less);
		assert_eq!(rank_order(80.0, "b", 80.0, "a"), Ordering::Greater);
		assert_eq!(rank_order(80.0, "a", 80.0, "a"), Ordering::Equal);
	}
}
