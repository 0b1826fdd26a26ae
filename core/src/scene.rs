use std::collections::{
	BTreeMap,
	HashMap
};

use thiserror::Error;

use ultraviolet::{
	mat::Mat3,
	rotor::Rotor3,
	vec::{
		Vec2,
		Vec3,
		Vec4
	}
};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MatPropValueID {
	Diffuse,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MatPropValue {
	Text(String),
}

/// [`HashMap`] type alias for material properties
pub type MaterialPropertyMap = HashMap<MatPropValueID, MatPropValue>;

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
	pub name: String,
	pub properties: MaterialPropertyMap,
}

impl Material {
	/// Creates a simple material referencing a single diffuse map
	pub fn with_diffuse(name: String, diffuse_map: String) -> Material {
		let mut properties = MaterialPropertyMap::new();
		properties.insert(MatPropValueID::Diffuse, MatPropValue::Text(diffuse_map));

		Material {
			name: name,
			properties: properties,
		}
	}

	pub fn diffuse_map(&self) -> Option<&str> {
		match self.properties.get(&MatPropValueID::Diffuse) {
			Some(MatPropValue::Text(s)) => Some(s.as_str()),
			_ => None,
		}
	}
}

/// Quaternion stored as `(x, y, z, w)`
pub type Quat = Vec4;

#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
	pub id: u8,
	pub name: String,
	/// Index of the parent bone, `None` for the root
	pub parent: Option<usize>,
	pub global_position: Vec3,
	pub global_rotation: Quat,
	pub local_position: Vec3,
	pub local_rotation: Quat,
}

impl Bone {
	pub fn new(id: u8, name: String) -> Bone {
		Bone {
			id: id,
			name: name,
			parent: None,
			global_position: Vec3::zero(),
			global_rotation: rot3_to_vec4(Rotor3::identity()),
			local_position: Vec3::zero(),
			local_rotation: rot3_to_vec4(Rotor3::identity()),
		}
	}
}

/// A single bone influence on a vertex
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weight {
	pub bone: u32,
	pub weight: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
	pub position: Vec3,
	pub normal: Option<Vec3>,
	pub uvs: Vec<Vec2>,
	pub weights: Vec<Weight>,
}

impl Vertex {
	pub fn new(position: Vec3) -> Vertex {
		Vertex {
			position: position,
			normal: None,
			uvs: vec![],
			weights: vec![],
		}
	}

	pub fn weight_sum(&self) -> f32 {
		self.weights.iter().map(|w| w.weight).sum()
	}
}

pub type Face = [usize; 3];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
	pub name: String,
	pub lod: u32,
	pub material: usize,
	pub vertices: Vec<Vertex>,
	pub faces: Vec<Face>,
}

/// A value sampled at a keyframe index
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Key<T> {
	pub frame: u32,
	pub value: T,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoneTrack {
	pub bone: String,
	pub translations: Vec<Key<Vec3>>,
	pub rotations: Vec<Key<Quat>>,
}

/// Named marker attached to a keyframe
#[derive(Clone, Debug, PartialEq)]
pub struct NoteTrack {
	pub frame: u32,
	pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationClip {
	pub name: String,
	pub interpolation_ms: u32,
	pub frame_times: Vec<u32>,
	pub tracks: Vec<BoneTrack>,
	pub notes: Vec<NoteTrack>,
}

impl AnimationClip {
	pub fn new(name: String) -> AnimationClip {
		AnimationClip {
			name: name,
			..Default::default()
		}
	}

	pub fn track(&self, bone: &str) -> Option<&BoneTrack> {
		self.tracks.iter().find(|t| t.bone == bone)
	}

	pub fn add_note(&mut self, name: String, frame: u32) {
		self.notes.push(NoteTrack { frame, name });
	}
}

#[derive(Error, Debug, PartialEq)]
pub enum SceneError {
	#[error("Skeleton has no root bone")]
	NoRoot,
	#[error("Skeleton has more than one root: bones {0} and {1}")]
	MultipleRoots(usize, usize),
	#[error("Bone {bone} references missing parent {parent}")]
	DanglingParent {
		bone: usize,
		parent: usize,
	},
	#[error("Bone {0} is part of a parent cycle")]
	Cycle(usize),
}

/// Vendor neutral model: skeleton, geometry, materials and animation clips
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
	pub bones: Vec<Bone>,
	pub meshes: Vec<Mesh>,
	pub materials: Vec<Material>,
	/// Clips keyed by their output file name
	pub animations: BTreeMap<String, AnimationClip>,
}

impl Model {
	pub fn new() -> Model {
		Model::default()
	}

	pub fn material_index(&self, name: &str) -> Option<usize> {
		self.materials.iter().position(|m| m.name == name)
	}

	/// Adds the material unless one with the same name exists, returning its index
	pub fn add_material(&mut self, material: Material) -> usize {
		if let Some(i) = self.material_index(&material.name) {
			return i;
		}

		self.materials.push(material);
		self.materials.len() - 1
	}

	pub fn bone_index(&self, name: &str) -> Option<usize> {
		self.bones.iter().position(|b| b.name == name)
	}

	pub fn root(&self) -> Option<usize> {
		self.bones.iter().position(|b| b.parent.is_none())
	}

	/// Checks that every bone reaches the single root by following parent links
	pub fn validate_skeleton(&self) -> Result<(), SceneError> {
		let mut root = None;

		for (i, bone) in self.bones.iter().enumerate() {
			match bone.parent {
				None => match root {
					Some(r) => return Err(SceneError::MultipleRoots(r, i)),
					None => root = Some(i),
				},
				Some(p) if p >= self.bones.len() => {
					return Err(SceneError::DanglingParent { bone: i, parent: p });
				},
				Some(_) => (),
			}
		}

		if root.is_none() && !self.bones.is_empty() {
			return Err(SceneError::NoRoot);
		}

		for i in 0..self.bones.len() {
			let mut cur = i;
			let mut steps = 0;

			while let Some(p) = self.bones[cur].parent {
				steps += 1;
				if steps > self.bones.len() {
					return Err(SceneError::Cycle(i));
				}
				cur = p;
			}
		}

		Ok(())
	}

	/// Derives parent relative transforms from the global ones
	pub fn generate_local_transforms(&mut self) {
		for i in 0..self.bones.len() {
			let (pos, rot) = match self.bones[i].parent {
				Some(p) if p < self.bones.len() => {
					let parent = &self.bones[p];
					let inv = vec4_to_rot3(parent.global_rotation).reversed();
					let delta = self.bones[i].global_position - parent.global_position;

					(inv * delta, rot3_to_vec4(inv * vec4_to_rot3(self.bones[i].global_rotation)))
				},
				_ => (self.bones[i].global_position, self.bones[i].global_rotation),
			};

			self.bones[i].local_position = pos;
			self.bones[i].local_rotation = rot;
		}
	}
}

pub fn vec4_to_rot3(v: Vec4) -> Rotor3 {
	Rotor3::from_quaternion_array([v.x, v.y, v.z, v.w])
}

pub fn rot3_to_vec4(r: Rotor3) -> Quat {
	let [x, y, z, w] = r.into_quaternion_array();
	Vec4::new(x, y, z, w)
}

/// Rotation about X, then Y, then Z, in radians
pub fn rot3_from_euler(x: f32, y: f32, z: f32) -> Rotor3 {
	// an xz plane rotor turns against +Y
	Rotor3::from_rotation_xy(z) * Rotor3::from_rotation_xz(-y) * Rotor3::from_rotation_yz(x)
}

/// Rotation part of a row-major transform whose translation lives in the last column
pub fn rot3_from_transform(m: &[[f32; 4]; 4]) -> Rotor3 {
	let basis = Mat3::new(
		Vec3::new(m[0][0], m[1][0], m[2][0]),
		Vec3::new(m[0][1], m[1][1], m[2][1]),
		Vec3::new(m[0][2], m[1][2], m[2][2]),
	);

	basis.into_rotor3().normalized()
}

/// Translation part of a row-major transform
pub fn translation_of(m: &[[f32; 4]; 4]) -> Vec3 {
	Vec3::new(m[0][3], m[1][3], m[2][3])
}
