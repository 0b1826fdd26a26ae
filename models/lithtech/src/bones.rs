use log::{
	debug,
	warn
};

use ltbkit_core::scene::{
	rot3_from_transform,
	rot3_to_vec4,
	translation_of,
	vec4_to_rot3,
	Bone
};

use crate::{
	ltb::import::LtbImportError,
	names::{
		bone_identifier,
		NameNormalizer
	},
	reader::LtbReader,
	root_correction,
	tree::parents_from_subtree_sizes,
	ImportCfg,
	ImportFlag
};

/// Reads the bone list and links every bone to its parent
pub(crate) fn read_bones<N>(buf: &mut LtbReader, num_bones: u32, cfg: &ImportCfg, names: &N)
	-> Result<Vec<Bone>, LtbImportError>
where
	N: NameNormalizer + ?Sized,
{
	let mut bones = vec![];
	let mut sizes = vec![];

	for i in 0..(num_bones as usize) {
		let raw_name = buf.lstr16()?;
		let offset = buf.position();
		let id = buf.u8()?;
		if id as usize != i {
			return Err(LtbImportError::corrupt(offset, format!("bone {} is stored with id {}", i, id)));
		}

		let _spare = buf.u16()?;
		let transform = buf.mat4()?;
		sizes.push(buf.u32()?);

		let mut bone = Bone::new(id, bone_identifier(names, &raw_name, cfg.encoding));
		bone.global_position = translation_of(&transform);
		bone.global_rotation = rot3_to_vec4(rot3_from_transform(&transform));

		if cfg.mirror() {
			bone.global_position.x *= -1.0;
			bone.global_rotation.y *= -1.0;
			bone.global_rotation.z *= -1.0;
		}

		if id == 0 && cfg.flags.contains(ImportFlag::ORIENT_ROOT) {
			bone.global_rotation = rot3_to_vec4(vec4_to_rot3(bone.global_rotation) * root_correction());
		}

		bones.push(bone);
	}

	let (parents, unclaimed) = parents_from_subtree_sizes(&sizes)
		.map_err(|e| buf.corrupt(e.to_string()))?;

	if unclaimed > 0 {
		warn!("Bone tree leaves {} subtree slots unclaimed", unclaimed);
	}

	for (bone, parent) in bones.iter_mut().zip(parents) {
		bone.parent = parent;
		debug!("Bone {} \"{}\" parent {:?}", bone.id, bone.name, bone.parent);
	}

	Ok(bones)
}
