use log::debug;

use ltbkit_core::scene::{
	Face,
	Vertex
};

use crate::{
	ltb::{
		import::LtbImportError,
		PieceType,
		StreamFlags,
		MAX_PALETTE_BONES,
		MAX_PIECE_TEXTURES,
		UNUSED_BONE,
		VERTEX_STREAMS
	},
	reader::LtbReader,
	weights::{
		resolve,
		with_residual,
		RawWeight,
		WEIGHT_EPSILON
	},
	ImportCfg,
	ImportFlag
};

#[derive(Clone, Debug, PartialEq)]
pub struct PieceHeader {
	pub num_textures: u32,
	pub textures: [u32; MAX_PIECE_TEXTURES],
	pub render_style: u32,
	pub render_priority: u8,
	pub kind: PieceType,
	pub size: u32,
}

impl PieceHeader {
	pub(crate) fn read(buf: &mut LtbReader) -> Result<PieceHeader, LtbImportError> {
		let num_textures = buf.u32()?;

		// all texture slots are stored, used or not
		let mut textures = [0; MAX_PIECE_TEXTURES];
		for t in textures.iter_mut() {
			*t = buf.u32()?;
		}

		let render_style = buf.u32()?;
		let render_priority = buf.u8()?;

		let offset = buf.position();
		let raw_kind = buf.u32()?;
		let kind = PieceType::from_u32(raw_kind)
			.ok_or_else(|| LtbImportError::unsupported(offset, format!("piece type {}", raw_kind)))?;

		Ok(PieceHeader {
			num_textures: num_textures,
			textures: textures,
			render_style: render_style,
			render_priority: render_priority,
			kind: kind,
			size: buf.u32()?,
		})
	}
}

/// How the vertices of a piece are bound to bones, decided once per piece
#[derive(Clone, Debug, PartialEq)]
pub enum Skinning {
	/// Everything follows a single bone
	Rigid(u32),
	/// Each vertex stores its own palette bone bytes, optionally through a
	/// local to global bone table
	Palette(Option<Vec<u32>>),
	/// Bones are assigned per vertex range by the combo table after the faces
	Combos,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PieceGeometry {
	pub vertices: Vec<Vertex>,
	pub faces: Vec<Face>,
}

/// Decodes the payload of a piece whose header announced a nonzero size
pub(crate) fn read_piece(buf: &mut LtbReader, header: &PieceHeader, num_bones: u32, cfg: &ImportCfg)
	-> Result<PieceGeometry, LtbImportError>
{
	let num_verts = buf.u32()?;
	let num_tris = buf.u32()?;
	let max_bones_per_tri = buf.u32()?;
	let max_bones_per_vert = buf.u32()?;

	debug!("    {:?} piece: {} vertices, {} triangles", header.kind, num_verts, num_tris);

	let reindexed = header.kind == PieceType::Skeletal && buf.bool()?;

	let mut streams = [StreamFlags::empty(); VERTEX_STREAMS];
	for s in streams.iter_mut() {
		*s = StreamFlags::from_bits_truncate(buf.u32()?);
	}

	let mut palette = false;
	let rigid_bone = match header.kind {
		PieceType::Rigid => {
			let offset = buf.position();
			let bone = buf.u32()?;
			if bone >= num_bones {
				return Err(LtbImportError::corrupt(offset,
					format!("rigid bone {} out of range for {} bones", bone, num_bones)));
			}
			Some(bone)
		},
		PieceType::Skeletal => {
			palette = buf.bool()?;
			if palette {
				let min_bone = buf.u32()?;
				let max_bone = buf.u32()?;
				debug!("        Matrix palette bones {} to {}", min_bone, max_bone);
			}
			None
		},
		PieceType::VertexAnimated => return Err(buf.unsupported("vertex animated piece")),
	};

	let bone_map = if reindexed {
		let n = buf.u32()?;
		let mut map = vec![];
		for _ in 0..n {
			map.push(buf.u32()?);
		}
		Some(map)
	} else {
		None
	};

	let skinning = match (rigid_bone, palette) {
		(Some(bone), _) => Skinning::Rigid(bone),
		(None, true) => Skinning::Palette(bone_map),
		(None, false) => Skinning::Combos,
	};

	let max_weights = if palette { max_bones_per_vert } else { max_bones_per_tri };

	let mut vertices = vec![];
	let mut raw_weights = vec![];

	for flags in streams.iter().filter(|f| f.contains(StreamFlags::POSITION)) {
		for _ in 0..num_verts {
			let (vert, weights) = read_vertex(buf, *flags, &skinning, max_weights, cfg)?;
			vertices.push(vert);
			raw_weights.push(weights);
		}
	}

	let mut faces = vec![];
	for _ in 0..num_tris {
		let offset = buf.position();
		let face = [buf.u16()? as usize, buf.u16()? as usize, buf.u16()? as usize];

		if face.iter().any(|&i| i >= vertices.len()) {
			return Err(LtbImportError::corrupt(offset,
				format!("triangle {:?} references a vertex past {}", face, vertices.len())));
		}
		faces.push(face);
	}

	if skinning == Skinning::Combos {
		apply_bone_combos(buf, &mut raw_weights)?;
	}

	let trailer = buf.u8()?;
	buf.skip(trailer as u64)?;

	for (vert, raw) in vertices.iter_mut().zip(raw_weights.iter()) {
		vert.weights = resolve(raw, num_bones).map_err(|e| buf.corrupt(e.to_string()))?;
	}

	Ok(PieceGeometry {
		vertices: vertices,
		faces: faces,
	})
}

fn read_vertex(buf: &mut LtbReader, flags: StreamFlags, skinning: &Skinning, max_weights: u32, cfg: &ImportCfg)
	-> Result<(Vertex, Vec<RawWeight>), LtbImportError>
{
	let mut position = buf.vec3()?;
	if cfg.mirror() {
		position.x *= -1.0;
	}

	let mut vert = Vertex::new(position);

	let weights = match skinning {
		Skinning::Rigid(bone) => vec![RawWeight::rigid(*bone)],
		Skinning::Palette(bone_map) => {
			let mut weights = read_blend_weights(buf, max_weights)?;

			let bones: [u8; MAX_PALETTE_BONES] = buf.bytes()?;
			for (slot, b) in weights.iter_mut().zip(bones.iter()) {
				slot.bone = match bone_map {
					Some(map) if *b != UNUSED_BONE => {
						let global = map.get(*b as usize).ok_or_else(|| buf.corrupt(
							format!("palette bone {} past the {} entry bone table", b, map.len())))?;
						Some(*global)
					},
					_ => Some(*b as u32),
				};
			}

			weights
		},
		Skinning::Combos => read_blend_weights(buf, max_weights)?,
	};

	if flags.contains(StreamFlags::NORMAL) {
		let mut normal = buf.vec3()?;
		if cfg.mirror() {
			normal.x *= -1.0;
		}
		vert.normal = Some(normal);
	}

	if flags.contains(StreamFlags::COLOR) {
		buf.skip(4)?;
	}

	if flags.contains(StreamFlags::UV_SET_1) {
		let mut uv = buf.vec2()?;
		if cfg.flags.contains(ImportFlag::WRAP_UVS) && uv.x > 1.0 {
			uv.x -= 1.0;
		}
		vert.uvs.push(uv);
	}

	for extra in [StreamFlags::UV_SET_2, StreamFlags::UV_SET_3, StreamFlags::UV_SET_4] {
		if flags.contains(extra) {
			buf.skip(8)?;
		}
	}

	if flags.contains(StreamFlags::BASIS_VECTORS) {
		buf.skip(24)?;
	}

	if weights.is_empty() {
		return Err(buf.corrupt("vertex has no bone weights"));
	}

	Ok((vert, weights))
}

/// Reads all but the last blend weight; the last one is implied
fn read_blend_weights(buf: &mut LtbReader, max_weights: u32) -> Result<Vec<RawWeight>, LtbImportError> {
	let mut weights = vec![];
	let mut sum = 0.0;

	for _ in 0..max_weights.saturating_sub(1) {
		let offset = buf.position();
		let w = buf.f32()?;
		if !(0.0..=1.0).contains(&w) {
			return Err(LtbImportError::corrupt(offset, format!("blend weight {} outside 0..1", w)));
		}

		sum += w;
		if sum > 1.0 + WEIGHT_EPSILON {
			return Err(LtbImportError::corrupt(offset, format!("blend weights sum to {}", sum)));
		}
		weights.push(RawWeight::unresolved(w));
	}

	Ok(with_residual(weights))
}

/// Assigns palette bones to vertex ranges. Slots are filled in order until
/// the first unused bone marker or the end of the vertex's weights.
fn apply_bone_combos(buf: &mut LtbReader, raw_weights: &mut [Vec<RawWeight>]) -> Result<(), LtbImportError> {
	let num_combos = buf.u32()?;

	for _ in 0..num_combos {
		let offset = buf.position();
		let start = buf.u16()? as usize;
		let end = start + buf.u16()? as usize;
		let bones: [u8; MAX_PALETTE_BONES] = buf.bytes()?;
		let _index_start = buf.u32()?;

		debug!("        Bone combo: vertices {} to {}, bones {:?}", start, end, bones);

		let num_verts = raw_weights.len();
		let range = raw_weights.get_mut(start..end).ok_or_else(|| LtbImportError::corrupt(offset,
			format!("bone combo range {}..{} past {} vertices", start, end, num_verts)))?;

		for weights in range.iter_mut() {
			for (slot, b) in weights.iter_mut().zip(bones.iter()).take_while(|(_, b)| **b != UNUSED_BONE) {
				slot.bone = Some(*b as u32);
			}
		}
	}

	Ok(())
}
