use std::collections::BTreeMap;

use log::debug;

use ultraviolet::vec::{
	Vec3,
	Vec4
};

use ltbkit_core::scene::{
	rot3_to_vec4,
	vec4_to_rot3,
	AnimationClip,
	Bone,
	BoneTrack,
	Key,
	Quat
};

use crate::{
	ltb::{
		import::LtbImportError,
		AnimCompression,
		QUANT_SCALE
	},
	reader::LtbReader,
	root_correction,
	ImportCfg,
	ImportFlag
};

/// Reads the animation section, keying every clip by its output file name
pub(crate) fn read_animations(buf: &mut LtbReader, bones: &[Bone], cfg: &ImportCfg)
	-> Result<BTreeMap<String, AnimationClip>, LtbImportError>
{
	let count = buf.u32()?;
	debug!("Animation count: {}", count);

	let mut clips = BTreeMap::new();
	for _ in 0..count {
		let offset = buf.position();
		let clip = read_clip(buf, bones, cfg)?;
		let key = cfg.clip_key(&clip.name);

		if clips.contains_key(&key) {
			return Err(LtbImportError::corrupt(offset, format!("duplicate animation \"{}\"", clip.name)));
		}
		clips.insert(key, clip);
	}

	Ok(clips)
}

fn read_clip(buf: &mut LtbReader, bones: &[Bone], cfg: &ImportCfg) -> Result<AnimationClip, LtbImportError> {
	let _dims = buf.vec3()?;
	let mut clip = AnimationClip::new(buf.text(cfg.encoding)?);

	let offset = buf.position();
	let raw_compression = buf.u32()?;
	let compression = AnimCompression::from_u32(raw_compression).ok_or_else(||
		LtbImportError::unsupported(offset, format!("animation compression {}", raw_compression)))?;

	clip.interpolation_ms = buf.u32()?;
	let num_keyframes = buf.u32()?;

	for i in 0..num_keyframes {
		clip.frame_times.push(buf.u32()?);

		let note = buf.text(cfg.encoding)?;
		if !note.is_empty() {
			clip.add_note(note, i);
		}
	}

	for (i, bone) in bones.iter().enumerate() {
		let mut track = BoneTrack {
			bone: bone.name.clone(),
			..Default::default()
		};
		let correct = i == 0 && cfg.flags.contains(ImportFlag::ORIENT_ROOT);

		match compression {
			AnimCompression::None => read_raw_track(buf, &mut track, num_keyframes, correct)?,
			_ => read_quantized_track(buf, &mut track, correct, cfg.mirror())?,
		}

		clip.tracks.push(track);
	}

	debug!("{} ({:?}) has {} keyframes", clip.name, compression, num_keyframes);

	Ok(clip)
}

fn corrected(q: Quat, correct: bool) -> Quat {
	if correct {
		rot3_to_vec4(vec4_to_rot3(q) * root_correction())
	} else {
		q
	}
}

/// Track with independently sampled 16-bit fixed point keys
fn read_quantized_track(buf: &mut LtbReader, track: &mut BoneTrack, correct: bool, mirror: bool)
	-> Result<(), LtbImportError>
{
	let num_pos = buf.u32()?;
	for frame in 0..num_pos {
		let x = buf.i16()? as f32 / QUANT_SCALE;
		let y = buf.i16()? as f32 / QUANT_SCALE;
		let z = buf.i16()? as f32 / QUANT_SCALE;

		let mut v = Vec3::new(x, y, z);
		if mirror {
			v.x *= -1.0;
		}
		track.translations.push(Key { frame, value: v });
	}

	let num_rot = buf.u32()?;
	for frame in 0..num_rot {
		let x = buf.i16()? as f32 / QUANT_SCALE;
		let y = buf.i16()? as f32 / QUANT_SCALE;
		let z = buf.i16()? as f32 / QUANT_SCALE;
		let w = buf.i16()? as f32 / QUANT_SCALE;

		let mut q = Vec4::new(x, -y, -z, w);
		if mirror {
			q.y *= -1.0;
			q.z *= -1.0;
		}
		track.rotations.push(Key { frame, value: corrected(q, correct) });
	}

	Ok(())
}

/// Track with one float key per clip keyframe. The mirror flag does not
/// apply here; translations always arrive with X negated.
fn read_raw_track(buf: &mut LtbReader, track: &mut BoneTrack, num_keyframes: u32, correct: bool)
	-> Result<(), LtbImportError>
{
	let offset = buf.position();
	if buf.bool()? {
		return Err(LtbImportError::unsupported(offset, "vertex animation track"));
	}

	for frame in 0..num_keyframes {
		let v = buf.vec3()?;
		track.translations.push(Key { frame, value: Vec3::new(-v.x, v.y, v.z) });
	}

	for frame in 0..num_keyframes {
		let x = buf.f32()?;
		let y = buf.f32()?;
		let z = buf.f32()?;
		let w = buf.f32()?;
		track.rotations.push(Key { frame, value: corrected(Vec4::new(x, -y, -z, w), correct) });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use byteorder::{
		LE,
		WriteBytesExt
	};

	use super::*;

	#[test]
	fn test_quantized_track_counts() {
		let mut data: Vec<u8> = vec![];
		data.write_u32::<LE>(1).unwrap();
		for v in [16i16, -32, 48] {
			data.write_i16::<LE>(v).unwrap();
		}
		data.write_u32::<LE>(2).unwrap();
		for _ in 0..2 {
			for v in [0i16, 0, 0, 16] {
				data.write_i16::<LE>(v).unwrap();
			}
		}

		let mut track = BoneTrack::default();
		read_quantized_track(&mut LtbReader::new(&data), &mut track, false, true).unwrap();

		assert_eq!(1, track.translations.len());
		assert_eq!(2, track.rotations.len());
		assert_eq!(Vec3::new(-1.0, -2.0, 3.0), track.translations[0].value);
		assert_eq!(Vec4::new(0.0, 0.0, 0.0, 1.0), track.rotations[1].value);
		assert_eq!(1, track.rotations[1].frame);
	}

	#[test]
	fn test_quantized_rotation_sign() {
		let mut data: Vec<u8> = vec![];
		data.write_u32::<LE>(0).unwrap();
		data.write_u32::<LE>(1).unwrap();
		for v in [8i16, 4, 2, 1] {
			data.write_i16::<LE>(v).unwrap();
		}

		let mut plain = BoneTrack::default();
		read_quantized_track(&mut LtbReader::new(&data), &mut plain, false, false).unwrap();
		assert_eq!(Vec4::new(0.5, -0.25, -0.125, 0.0625), plain.rotations[0].value);

		let mut mirrored = BoneTrack::default();
		read_quantized_track(&mut LtbReader::new(&data), &mut mirrored, false, true).unwrap();
		assert_eq!(Vec4::new(0.5, 0.25, 0.125, 0.0625), mirrored.rotations[0].value);
	}

	#[test]
	fn test_vertex_animation_rejected() {
		let data = [1u8, 0, 0, 0];
		let mut track = BoneTrack::default();
		assert!(matches!(read_raw_track(&mut LtbReader::new(&data), &mut track, 1, false),
			Err(LtbImportError::UnsupportedFeature { offset: 0, .. })));
	}
}
