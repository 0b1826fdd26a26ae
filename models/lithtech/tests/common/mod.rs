#![allow(dead_code)]

use byteorder::{
	LE,
	WriteBytesExt
};

pub const POSITION: u32 = 0x0001;
pub const NORMAL: u32 = 0x0002;
pub const UV_SET_1: u32 = 0x0010;

pub const RIGID: u32 = 4;
pub const SKELETAL: u32 = 5;
pub const VERTEX_ANIMATED: u32 = 6;

pub const IDENTITY: [[f32; 4]; 4] = [
	[1.0, 0.0, 0.0, 0.0],
	[0.0, 1.0, 0.0, 0.0],
	[0.0, 0.0, 1.0, 0.0],
	[0.0, 0.0, 0.0, 1.0],
];

pub fn lstr16(out: &mut Vec<u8>, s: &[u8]) {
	out.write_u16::<LE>(s.len() as u16).unwrap();
	out.extend_from_slice(s);
}

pub fn vec3(out: &mut Vec<u8>, v: [f32; 3]) {
	for c in v {
		out.write_f32::<LE>(c).unwrap();
	}
}

pub fn translate(x: f32, y: f32, z: f32) -> [[f32; 4]; 4] {
	let mut m = IDENTITY;
	m[0][3] = x;
	m[1][3] = y;
	m[2][3] = z;
	m
}

pub struct PieceDef {
	pub kind: u32,
	pub payload: Vec<u8>,
}

impl PieceDef {
	pub fn empty() -> PieceDef {
		PieceDef {
			kind: SKELETAL,
			payload: vec![],
		}
	}
}

pub struct NodeDef {
	pub name: Vec<u8>,
	pub pieces: Vec<PieceDef>,
}

pub struct BoneDef {
	pub name: Vec<u8>,
	pub id: u8,
	pub transform: [[f32; 4]; 4],
	pub subtree: u32,
}

pub struct ClipDef {
	pub name: String,
	pub compression: u32,
	pub keyframes: Vec<(u32, String)>,
	/// Track bytes for every bone, in bone order
	pub tracks: Vec<u8>,
}

/// Assembles an uncompressed LTB container section by section
pub struct LtbBuilder {
	pub num_obbs: u32,
	pub nodes: Vec<NodeDef>,
	pub bones: Vec<BoneDef>,
	pub children: Vec<(String, u32)>,
	pub clips: Vec<ClipDef>,
}

impl LtbBuilder {
	/// A model with the given subtree sizes, one identity bone per entry
	pub fn with_tree(sizes: &[u32]) -> LtbBuilder {
		let bones = sizes.iter().enumerate().map(|(i, s)| BoneDef {
			name: format!("bone{}", i).into_bytes(),
			id: i as u8,
			transform: IDENTITY,
			subtree: *s,
		}).collect();

		LtbBuilder {
			num_obbs: 0,
			nodes: vec![],
			bones: bones,
			children: vec![],
			clips: vec![],
		}
	}

	pub fn node(mut self, name: &str, pieces: Vec<PieceDef>) -> LtbBuilder {
		self.nodes.push(NodeDef {
			name: name.as_bytes().to_vec(),
			pieces: pieces,
		});
		self
	}

	pub fn build(&self) -> Vec<u8> {
		let mut out: Vec<u8> = vec![];

		out.write_u16::<LE>(1).unwrap();
		out.resize(0x14, 0);

		out.write_u32::<LE>(25).unwrap();
		let counters = [
			self.clips.iter().map(|c| c.keyframes.len() as u32).sum::<u32>(),
			self.clips.len() as u32,
			self.bones.len() as u32,
			self.nodes.iter().map(|n| n.pieces.len() as u32).sum::<u32>(),
			self.children.len() as u32,
		];
		for c in counters {
			out.write_u32::<LE>(c).unwrap();
		}
		for _ in counters.len()..15 {
			out.write_u32::<LE>(0).unwrap();
		}
		lstr16(&mut out, b"");
		out.write_f32::<LE>(10.0).unwrap();

		out.write_u32::<LE>(self.num_obbs).unwrap();

		out.write_u32::<LE>(self.nodes.len() as u32).unwrap();
		for node in self.nodes.iter() {
			lstr16(&mut out, &node.name);
			out.write_u32::<LE>(node.pieces.len() as u32).unwrap();
			out.resize(out.len() + node.pieces.len() * 4 + 8, 0);

			for piece in node.pieces.iter() {
				out.write_u32::<LE>(1).unwrap();
				for t in 0..4 {
					out.write_u32::<LE>(t).unwrap();
				}
				out.write_u32::<LE>(0).unwrap();
				out.write_u8(0).unwrap();
				out.write_u32::<LE>(piece.kind).unwrap();
				out.write_u32::<LE>(piece.payload.len() as u32).unwrap();
				out.extend_from_slice(&piece.payload);
			}
		}

		for bone in self.bones.iter() {
			lstr16(&mut out, &bone.name);
			out.write_u8(bone.id).unwrap();
			out.write_u16::<LE>(0).unwrap();
			for row in bone.transform {
				for c in row {
					out.write_f32::<LE>(c).unwrap();
				}
			}
			out.write_u32::<LE>(bone.subtree).unwrap();
		}

		out.write_u32::<LE>(self.children.len() as u32).unwrap();
		for (name, relations) in self.children.iter() {
			lstr16(&mut out, name.as_bytes());
			out.write_u32::<LE>(*relations).unwrap();
			for r in 0..*relations {
				out.write_u32::<LE>(r).unwrap();
			}
		}
		out.write_u32::<LE>(0).unwrap();

		if !self.clips.is_empty() {
			out.write_u32::<LE>(self.clips.len() as u32).unwrap();
		}
		for clip in self.clips.iter() {
			vec3(&mut out, [1.0, 2.0, 3.0]);
			lstr16(&mut out, clip.name.as_bytes());
			out.write_u32::<LE>(clip.compression).unwrap();
			out.write_u32::<LE>(33).unwrap();
			out.write_u32::<LE>(clip.keyframes.len() as u32).unwrap();
			for (time, note) in clip.keyframes.iter() {
				out.write_u32::<LE>(*time).unwrap();
				lstr16(&mut out, note.as_bytes());
			}
			out.extend_from_slice(&clip.tracks);
		}

		out
	}
}

/// Rigid piece bound to `bone`; every vertex carries a normal and one UV set
pub fn rigid_piece(bone: u32, positions: &[[f32; 3]], faces: &[[u16; 3]]) -> PieceDef {
	let mut out: Vec<u8> = vec![];
	out.write_u32::<LE>(positions.len() as u32).unwrap();
	out.write_u32::<LE>(faces.len() as u32).unwrap();
	out.write_u32::<LE>(1).unwrap();
	out.write_u32::<LE>(1).unwrap();

	for s in [POSITION | NORMAL | UV_SET_1, 0, 0, 0] {
		out.write_u32::<LE>(s).unwrap();
	}
	out.write_u32::<LE>(bone).unwrap();

	for p in positions {
		vec3(&mut out, *p);
		vec3(&mut out, [0.0, 1.0, 0.0]);
		out.write_f32::<LE>(1.25).unwrap();
		out.write_f32::<LE>(0.5).unwrap();
	}

	write_faces(&mut out, faces);
	out.write_u8(2).unwrap();
	out.extend_from_slice(&[0xAA, 0xBB]);

	PieceDef {
		kind: RIGID,
		payload: out,
	}
}

/// Matrix palette piece with three bones per vertex and a local to global bone table
pub fn palette_piece(bone_map: &[u32], verts: &[([f32; 3], [f32; 2], [u8; 4])], faces: &[[u16; 3]]) -> PieceDef {
	let mut out: Vec<u8> = vec![];
	out.write_u32::<LE>(verts.len() as u32).unwrap();
	out.write_u32::<LE>(faces.len() as u32).unwrap();
	out.write_u32::<LE>(3).unwrap();
	out.write_u32::<LE>(3).unwrap();
	out.write_u8(1).unwrap();

	for s in [POSITION, 0, 0, 0] {
		out.write_u32::<LE>(s).unwrap();
	}
	out.write_u8(1).unwrap();
	out.write_u32::<LE>(0).unwrap();
	out.write_u32::<LE>(bone_map.len() as u32).unwrap();

	out.write_u32::<LE>(bone_map.len() as u32).unwrap();
	for b in bone_map {
		out.write_u32::<LE>(*b).unwrap();
	}

	for (pos, weights, bones) in verts {
		vec3(&mut out, *pos);
		for w in weights {
			out.write_f32::<LE>(*w).unwrap();
		}
		out.extend_from_slice(bones);
	}

	write_faces(&mut out, faces);
	out.write_u8(0).unwrap();

	PieceDef {
		kind: SKELETAL,
		payload: out,
	}
}

/// Skinned piece with two weights per vertex whose bones come from a combo table
pub fn combo_piece(weights: &[f32], combos: &[(u16, u16, [u8; 4])], faces: &[[u16; 3]]) -> PieceDef {
	let mut out: Vec<u8> = vec![];
	out.write_u32::<LE>(weights.len() as u32).unwrap();
	out.write_u32::<LE>(faces.len() as u32).unwrap();
	out.write_u32::<LE>(2).unwrap();
	out.write_u32::<LE>(2).unwrap();
	out.write_u8(0).unwrap();

	for s in [0, POSITION, 0, 0] {
		out.write_u32::<LE>(s).unwrap();
	}
	out.write_u8(0).unwrap();

	for (i, w) in weights.iter().enumerate() {
		vec3(&mut out, [i as f32, 0.0, 0.0]);
		out.write_f32::<LE>(*w).unwrap();
	}

	write_faces(&mut out, faces);

	out.write_u32::<LE>(combos.len() as u32).unwrap();
	for (start, count, bones) in combos {
		out.write_u16::<LE>(*start).unwrap();
		out.write_u16::<LE>(*count).unwrap();
		out.extend_from_slice(bones);
		out.write_u32::<LE>(0).unwrap();
	}
	out.write_u8(0).unwrap();

	PieceDef {
		kind: SKELETAL,
		payload: out,
	}
}

fn write_faces(out: &mut Vec<u8>, faces: &[[u16; 3]]) {
	for f in faces {
		for i in f {
			out.write_u16::<LE>(*i).unwrap();
		}
	}
}

/// Float track with one key per clip keyframe
pub fn raw_track(out: &mut Vec<u8>, positions: &[[f32; 3]], rotations: &[[f32; 4]]) {
	out.write_u8(0).unwrap();
	for p in positions {
		vec3(out, *p);
	}
	for r in rotations {
		for c in r {
			out.write_f32::<LE>(*c).unwrap();
		}
	}
}

/// 16-bit track with its own key counts
pub fn quantized_track(out: &mut Vec<u8>, positions: &[[i16; 3]], rotations: &[[i16; 4]]) {
	out.write_u32::<LE>(positions.len() as u32).unwrap();
	for p in positions {
		for c in p {
			out.write_i16::<LE>(*c).unwrap();
		}
	}

	out.write_u32::<LE>(rotations.len() as u32).unwrap();
	for r in rotations {
		for c in r {
			out.write_i16::<LE>(*c).unwrap();
		}
	}
}

pub fn compress(data: &[u8]) -> Vec<u8> {
	let mut input = data;
	let mut out: Vec<u8> = vec![];
	lzma_rs::lzma_compress(&mut input, &mut out).unwrap();
	out
}
