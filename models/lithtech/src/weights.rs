use thiserror::Error;

use ltbkit_core::scene::Weight;

use crate::ltb::UNUSED_BONE;

pub const WEIGHT_EPSILON: f32 = 1e-4;

/// Influence read from the file whose bone may still be unknown. Skinned
/// vertices get their bones from the palette bytes or a later bone combo.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawWeight {
	pub bone: Option<u32>,
	pub weight: f32,
}

impl RawWeight {
	pub fn unresolved(weight: f32) -> RawWeight {
		RawWeight {
			bone: None,
			weight: weight,
		}
	}

	pub fn rigid(bone: u32) -> RawWeight {
		RawWeight {
			bone: Some(bone),
			weight: 1.0,
		}
	}
}

#[derive(Error, Debug, PartialEq)]
pub enum WeightError {
	#[error("Bone index {bone} out of range for {num_bones} bones")]
	BoneIndex {
		bone: u32,
		num_bones: u32,
	},
	#[error("Vertex has no resolved bone influences")]
	NoInfluences,
	#[error("Bone weights sum to {0}")]
	Sum(f32),
}

/// Completes the stored weights with the implied residual `1 - sum`
pub fn with_residual(mut weights: Vec<RawWeight>) -> Vec<RawWeight> {
	let sum: f32 = weights.iter().map(|w| w.weight).sum();

	if 1.0 - sum > f32::EPSILON {
		weights.push(RawWeight::unresolved(1.0 - sum));
	}

	weights
}

/// Canonicalizes the influences of one vertex: unusable slots are dropped,
/// duplicate bones merged, the list sorted heaviest first and the residual
/// folded into the heaviest influence so the weights sum to one.
pub fn resolve(raw: &[RawWeight], num_bones: u32) -> Result<Vec<Weight>, WeightError> {
	let mut weights: Vec<Weight> = vec![];

	for w in raw.iter() {
		let bone = match w.bone {
			Some(b) if b < UNUSED_BONE as u32 => b,
			_ => continue,
		};

		if w.weight <= 0.0 {
			continue;
		}

		if bone >= num_bones {
			return Err(WeightError::BoneIndex { bone, num_bones });
		}

		match weights.iter_mut().find(|x| x.bone == bone) {
			Some(x) => x.weight += w.weight,
			None => weights.push(Weight { bone: bone, weight: w.weight }),
		}
	}

	weights.sort_by(|a, b| b.weight.total_cmp(&a.weight).then(a.bone.cmp(&b.bone)));

	let sum: f32 = weights.iter().map(|w| w.weight).sum();
	let heaviest = weights.first_mut().ok_or(WeightError::NoInfluences)?;

	let folded = heaviest.weight + (1.0 - sum);
	if !(-WEIGHT_EPSILON..=1.0 + WEIGHT_EPSILON).contains(&folded) {
		return Err(WeightError::Sum(sum));
	}
	heaviest.weight = folded.clamp(0.0, 1.0);

	Ok(weights)
}
