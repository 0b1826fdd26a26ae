pub mod ltb;
pub mod names;
pub mod tree;
pub mod weights;

#[cfg(feature = "import")]
pub mod anim;
#[cfg(feature = "import")]
pub mod bones;
#[cfg(feature = "import")]
pub mod decoder;
#[cfg(feature = "import")]
pub mod lzma;
#[cfg(feature = "import")]
pub mod piece;
#[cfg(feature = "import")]
pub mod reader;

use bitflags::bitflags;
use encoding_rs::{
	Encoding,
	EUC_KR
};

use std::{
	f32::consts::FRAC_PI_2,
	path::Path
};

#[cfg(feature = "import")]
use std::fs;

use ultraviolet::rotor::Rotor3;

use ltbkit_core::scene::rot3_from_euler;

#[cfg(feature = "import")]
use ltbkit_core::scene::Model;

#[cfg(feature = "import")]
pub use decoder::LtbModel;
#[cfg(feature = "import")]
pub use ltb::import::LtbImportError;
pub use names::{
	HangulRomanizer,
	NameNormalizer
};

/// File name prefix of assets authored for the mirrored side
pub const MIRROR_PREFIX: &str = "PV";

bitflags! {
	pub struct ImportFlag: u32 {
		const MIRROR_X = 1;
		const WRAP_UVS = 2;
		const ORIENT_ROOT = 4;
		const LOCAL_TRANSFORMS = 8;
	}
}

impl Default for ImportFlag {
	fn default() -> Self {
		ImportFlag::WRAP_UVS | ImportFlag::ORIENT_ROOT | ImportFlag::LOCAL_TRANSFORMS
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportCfg {
	pub flags: ImportFlag,
	/// Code page of mesh, bone and clip names
	pub encoding: &'static Encoding,
	pub anim_extension: String,
	pub texture_extension: String,
}

impl Default for ImportCfg {
	fn default() -> Self {
		Self {
			flags: ImportFlag::default(),
			encoding: EUC_KR,
			anim_extension: "seanim".to_string(),
			texture_extension: "png".to_string(),
		}
	}
}

impl ImportCfg {
	/// Default configuration, mirrored when the file name carries [`MIRROR_PREFIX`]
	pub fn for_file(path: &Path) -> ImportCfg {
		let mut cfg = ImportCfg::default();
		cfg.flags.set(ImportFlag::MIRROR_X, is_mirrored_file_name(path));
		cfg
	}

	pub fn mirror(&self) -> bool {
		self.flags.contains(ImportFlag::MIRROR_X)
	}

	pub fn clip_key(&self, clip: &str) -> String {
		format!("{}.{}", clip, self.anim_extension)
	}

	pub fn diffuse_map(&self, mesh: &str) -> String {
		format!("{}.{}", mesh, self.texture_extension)
	}
}

pub fn is_mirrored_file_name(path: &Path) -> bool {
	path.file_name()
		.and_then(|n| n.to_str())
		.map_or(false, |n| n.starts_with(MIRROR_PREFIX))
}

/// Fixed re-orientation applied to the root bone and its rotation keys
pub fn root_correction() -> Rotor3 {
	rot3_from_euler(-FRAC_PI_2, 0.0, -FRAC_PI_2)
}

/// Decodes an LTB file from disk. Errors carry the file path.
#[cfg(feature = "import")]
pub fn read(filepath: &Path, cfg: &ImportCfg) -> Result<Model, LtbImportError> {
	let data = fs::read(filepath).map_err(|e| LtbImportError::from(e).in_file(filepath))?;

	LtbModel::read(&data, cfg)
		.map(|ltb| ltb.model)
		.map_err(|e| e.in_file(filepath))
}

#[cfg(test)]
mod tests {
	use std::path::Path;

	use super::*;

	#[test]
	fn test_mirror_prefix() {
		assert!(ImportCfg::for_file(Path::new("data/models/PV_knight.ltb")).mirror());
		assert!(!ImportCfg::for_file(Path::new("data/PV/knight.ltb")).mirror());
		assert!(!ImportCfg::default().mirror());
	}

	#[test]
	fn test_names() {
		let cfg = ImportCfg::default();
		assert_eq!("idle.seanim", cfg.clip_key("idle"));
		assert_eq!("body.png", cfg.diffuse_map("body"));
	}
}
