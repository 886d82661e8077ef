
// Tools for particle galleries: micrographs made of equally-sized particle images laid out on a grid.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use fastrand::Rng;
use tracing::info;

use crate::micrograph::Micrograph;
use crate::mrc;
use crate::particles::{Particle, ParticleTable};

pub use crate::rand::rng;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
	pub rows: u32,
	pub cols: u32,
	pub tile_width: u32,
	pub tile_height: u32
}

impl GridGeometry {

	/// The pixel coordinates of the center of the tile at (row, col).
	pub fn center(&self, row: u32, col: u32) -> (u32, u32) {
		(
			col*self.tile_width + self.tile_width/2,
			row*self.tile_height + self.tile_height/2
		)
	}

	/// Tile centers in row-major order.
	pub fn centers(&self) -> Vec<(u32, u32)> {
		(0 .. self.rows)
			.flat_map(|row| (0 .. self.cols).map(move |col| (row, col)))
			.map(|(row, col)| self.center(row, col))
			.collect()
	}
}


/// One center particle per tile, for every micrograph in the folder.
/// Micrographs are named by their file stem, and visited in name order.
pub fn calc_centers(geometry: &GridGeometry, micrographs_dir: impl AsRef<Path>) -> Result<ParticleTable> {

	let dir = micrographs_dir.as_ref();
	let mut names = Vec::<String>::new();
	let entries = fs::read_dir(dir)
		.context(format!("Failed to read micrographs folder: {}", dir.to_string_lossy()))?;
	for entry in entries {
		let entry = entry
			.context(format!("Failed to read entry in: {}", dir.to_string_lossy()))?;
		let is_file = entry.file_type()
			.context(format!("Failed to inspect: {}", entry.path().to_string_lossy()))?
			.is_file();
		if !is_file {
			continue;
		}
		let Some(stem) = entry.path().file_stem().map(|s| s.to_string_lossy().to_string())
			else { continue; };
		names.push(stem);
	}
	names.sort();

	let centers = geometry.centers();
	let mut table = ParticleTable::new();
	for name in &names {
		for &(x, y) in &centers {
			table.push(Particle::new(name.clone(), x as i64, y as i64));
		}
	}

	info!("Found {} micrographs, {} particles each", names.len(), centers.len());
	Ok(table)
}


/// A gallery to draw particles from when building a composite, written as `label:tile_size:path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeSource {
	pub label: String,
	pub tile_size: u32,
	pub path: PathBuf
}

impl FromStr for CompositeSource {

	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self> {

		let mut parts = s.splitn(3, ':');
		let (Some(label), Some(tile_size), Some(path)) = (parts.next(), parts.next(), parts.next())
			else { bail!("Expected label:tile_size:path, not: {}", s); };

		if label.is_empty() {
			bail!("Missing label in: {}", s);
		}
		let tile_size = tile_size.parse::<u32>()
			.context(format!("Tile size was not a number: {}", tile_size))?;
		if tile_size == 0 {
			bail!("Tile size must be positive: {}", s);
		}
		if path.is_empty() {
			bail!("Missing path in: {}", s);
		}

		Ok(Self {
			label: label.to_string(),
			tile_size,
			path: PathBuf::from(path)
		})
	}
}


/// The tiles of one source gallery.
pub struct Gallery {
	pub label: String,
	pub tiles: Vec<Micrograph>
}

impl Gallery {

	pub fn load(source: &CompositeSource, rows: u32, cols: u32) -> Result<Self> {
		let micrograph = mrc::read(&source.path)?;
		let tiles = micrograph.tiles(source.tile_size, source.tile_size, rows, cols)
			.context(format!("Failed to cut {} into {}x{} tiles of {} pixels", source.path.to_string_lossy(), rows, cols, source.tile_size))?;
		info!("Loaded {} {} particles from {}", tiles.len(), source.label, source.path.to_string_lossy());
		Ok(Self {
			label: source.label.clone(),
			tiles
		})
	}
}


pub struct Composite {
	pub image: Micrograph,
	/// which cells came from which gallery, in the same order as the galleries
	pub provenance: Vec<(String, ParticleTable)>
}


/// Fills a rows x cols grid with tiles drawn at random from the galleries.
/// Every cell is as big as the biggest tile, smaller tiles sit in the middle of their cell
/// over a gaussian noise background.
pub fn build_composite(
	galleries: &[Gallery],
	rows: u32,
	cols: u32,
	image_name: &str,
	rng: &mut Rng
) -> Result<Composite> {

	if galleries.is_empty() {
		bail!("A composite needs at least one gallery");
	}
	if let Some(empty) = galleries.iter().find(|g| g.tiles.is_empty()) {
		bail!("Gallery {} has no tiles", empty.label);
	}
	// each label names a provenance file, so they can't repeat
	for (i, gallery) in galleries.iter().enumerate() {
		if galleries[.. i].iter().any(|g| g.label == gallery.label) {
			bail!("Gallery label {} is used more than once", gallery.label);
		}
	}

	let all_tiles = || galleries.iter().flat_map(|g| g.tiles.iter());
	let cell = GridGeometry {
		rows,
		cols,
		tile_width: all_tiles().map(Micrograph::width).max().unwrap_or(0),
		tile_height: all_tiles().map(Micrograph::height).max().unwrap_or(0)
	};

	let mut image = Micrograph::gaussian(cols*cell.tile_width, rows*cell.tile_height, 0.5, 0.1, rng);
	let mut provenance = galleries.iter()
		.map(|g| (g.label.clone(), ParticleTable::new()))
		.collect::<Vec<_>>();

	for row in 0 .. rows {
		for col in 0 .. cols {

			let gallery_i = rng.usize(0 .. galleries.len());
			let gallery = &galleries[gallery_i];
			let tile = &gallery.tiles[rng.usize(0 .. gallery.tiles.len())];

			let x = col*cell.tile_width + (cell.tile_width - tile.width())/2;
			let y = row*cell.tile_height + (cell.tile_height - tile.height())/2;
			image.paste(tile, x, y)?;

			let (cx, cy) = cell.center(row, col);
			provenance[gallery_i].1.push(Particle::new(image_name, cx as i64, cy as i64));
		}
	}

	Ok(Composite {
		image,
		provenance
	})
}


impl Composite {

	/// Writes `<label>_<name>.txt` for each gallery, then `<name>.png` and `<name>.mrc`.
	pub fn save(&self, out_dir: impl AsRef<Path>, name: &str) -> Result<()> {

		let out_dir = out_dir.as_ref();
		fs::create_dir_all(out_dir)
			.context(format!("Failed to create folder: {}", out_dir.to_string_lossy()))?;

		for (label, table) in &self.provenance {
			let path = out_dir.join(format!("{}_{}.txt", label, name));
			table.write(&path)?;
			info!("Saved {} {} particles to: {}", table.particles.len(), label, path.to_string_lossy());
		}

		self.image.save_png(out_dir.join(format!("{}.png", name)))?;

		let mrc_path = out_dir.join(format!("{}.mrc", name));
		mrc::write(&self.image, &mrc_path)?;
		info!("Saved image: {}", mrc_path.to_string_lossy());

		Ok(())
	}
}
