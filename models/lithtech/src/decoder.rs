use log::{
	debug,
	info
};

use ltbkit_core::scene::{
	Material,
	Mesh,
	Model
};

use crate::{
	anim::read_animations,
	bones::read_bones,
	ltb::{
		import::LtbImportError,
		ChildModel,
		Header
	},
	lzma::unwrap_container,
	names::{
		mesh_identifier,
		HangulRomanizer,
		NameNormalizer
	},
	piece::{
		read_piece,
		PieceHeader
	},
	reader::LtbReader,
	ImportCfg,
	ImportFlag
};

/// A decoded LTB file: the raw header, the external models it references
/// and the vendor neutral model built from it
#[derive(Clone, Debug, PartialEq)]
pub struct LtbModel {
	pub header: Header,
	pub child_models: Vec<ChildModel>,
	pub model: Model,
}

impl LtbModel {
	pub fn read(data: &[u8], cfg: &ImportCfg) -> Result<LtbModel, LtbImportError> {
		LtbModel::read_with(data, cfg, &HangulRomanizer)
	}

	/// Decodes with a caller supplied name normalizer
	pub fn read_with<N>(data: &[u8], cfg: &ImportCfg, names: &N) -> Result<LtbModel, LtbImportError>
	where
		N: NameNormalizer + ?Sized,
	{
		let data = unwrap_container(data)?;
		let mut buf = LtbReader::new(&data);

		let header = Header::read(&mut buf, cfg.encoding)?;
		debug!("LTB version {}, {} bones, {} animations", header.version, header.num_bones, header.num_anims);

		let offset = buf.position();
		let num_obbs = buf.u32()?;
		if num_obbs != 0 {
			return Err(LtbImportError::unsupported(offset, format!("{} oriented bounding boxes", num_obbs)));
		}

		let mut model = Model::new();
		read_mesh_nodes(&mut buf, &header, cfg, names, &mut model)?;

		if header.num_bones == 0 {
			return Err(buf.corrupt("model has no bones"));
		}

		model.bones = read_bones(&mut buf, header.num_bones, cfg, names)?;
		model.validate_skeleton().map_err(|e| buf.corrupt(e.to_string()))?;

		if cfg.flags.contains(ImportFlag::LOCAL_TRANSFORMS) {
			model.generate_local_transforms();
		}

		let child_models = read_child_models(&mut buf, cfg)?;
		buf.skip(4)?;

		if header.num_anims > 0 {
			model.animations = read_animations(&mut buf, &model.bones, cfg)?;
		}

		info!("Decoded {} meshes, {} materials, {} bones, {} animations",
			model.meshes.len(), model.materials.len(), model.bones.len(), model.animations.len());

		Ok(LtbModel {
			header: header,
			child_models: child_models,
			model: model,
		})
	}
}

fn read_mesh_nodes<N>(buf: &mut LtbReader, header: &Header, cfg: &ImportCfg, names: &N, model: &mut Model)
	-> Result<(), LtbImportError>
where
	N: NameNormalizer + ?Sized,
{
	let num_nodes = buf.u32()?;

	for _ in 0..num_nodes {
		let raw_name = buf.lstr16()?;
		let name = mesh_identifier(names, &raw_name, cfg.encoding);
		let num_lods = buf.u32()?;

		debug!("{} - {} LODs", name, num_lods);

		// per-LOD distances plus the node trailer
		buf.skip(num_lods as u64 * 4 + 8)?;

		for lod in 0..num_lods {
			let piece = PieceHeader::read(buf)?;
			if piece.size == 0 {
				debug!("    LOD {} is empty", lod);
				continue;
			}

			let geometry = read_piece(buf, &piece, header.num_bones, cfg)?;
			let material = model.add_material(Material::with_diffuse(format!("mtl_{}", name), cfg.diffuse_map(&name)));

			model.meshes.push(Mesh {
				name: name.clone(),
				lod: lod,
				material: material,
				vertices: geometry.vertices,
				faces: geometry.faces,
			});
		}
	}

	Ok(())
}

fn read_child_models(buf: &mut LtbReader, cfg: &ImportCfg) -> Result<Vec<ChildModel>, LtbImportError> {
	let count = buf.u32()?;
	let mut children = vec![];

	for _ in 0..count {
		let name = buf.text(cfg.encoding)?;
		let num_relations = buf.u32()?;
		buf.skip(num_relations as u64 * 4)?;

		debug!("Child model {}", name);
		children.push(ChildModel {
			name: name,
			num_relations: num_relations,
		});
	}

	Ok(children)
}
