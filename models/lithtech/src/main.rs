use std::{
	env,
	path::PathBuf,
	process
};

use log::{
	error,
	info
};

use rayon::prelude::*;

use ltbkit_models_lithtech::{
	read,
	ImportCfg
};

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.init();

	let files: Vec<PathBuf> = env::args().skip(1).map(PathBuf::from).collect();
	if files.is_empty() {
		eprintln!("usage: ltbconv <file.ltb>...");
		process::exit(2);
	}

	// one bad file never stops the rest of the batch
	let failed = files
		.par_iter()
		.filter(|path| {
			let cfg = ImportCfg::for_file(path);

			match read(path, &cfg) {
				Ok(model) => {
					info!("{}: {} meshes, {} bones, {} animations (mirrored: {})",
						path.display(), model.meshes.len(), model.bones.len(), model.animations.len(), cfg.mirror());
					for clip in model.animations.keys() {
						info!("    {}", clip);
					}
					false
				},
				Err(e) => {
					error!("{}", e);
					true
				},
			}
		})
		.count();

	if failed > 0 {
		error!("{} of {} files failed", failed, files.len());
		process::exit(1);
	}
}
