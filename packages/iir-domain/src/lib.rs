//! Pure similarity primitives shared by product and invoice resolution.

pub mod similarity;
pub mod text;

pub use similarity::{
	DimensionMismatch, MAX_SCORE, MIN_SCORE, ScoreMapping, clamp_score, correction_ratio,
	fuzzy_score, rank_order, vector_distance,
};
