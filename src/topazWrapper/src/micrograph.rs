
use std::path::Path;

use anyhow::{bail, Context, Result};
use fastrand::Rng;
use image::GrayImage;
use tracing::info;

use crate::rand::Gaussian;


/// A single-channel 2D image with float pixels, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Micrograph {
	width: u32,
	height: u32,
	pixels: Vec<f32>
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
	pub min: f32,
	pub max: f32,
	pub mean: f32,
	pub stddev: f32
}

impl Micrograph {

	pub fn new(width: u32, height: u32) -> Self {
		Self {
			width,
			height,
			pixels: vec![0.0; (width as usize)*(height as usize)]
		}
	}

	pub fn from_pixels(width: u32, height: u32, pixels: Vec<f32>) -> Result<Self> {
		let expected = (width as usize)*(height as usize);
		if pixels.len() != expected {
			bail!("A {}x{} image needs {} pixels, got {}", width, height, expected, pixels.len());
		}
		Ok(Self {
			width,
			height,
			pixels
		})
	}

	/// An image filled with gaussian noise.
	pub fn gaussian(width: u32, height: u32, mean: f64, stddev: f64, rng: &mut Rng) -> Self {
		let dist = Gaussian::new(mean, stddev);
		let mut img = Self::new(width, height);
		for p in img.pixels.iter_mut() {
			*p = dist.sample(rng) as f32;
		}
		img
	}

	pub fn width(&self) -> u32 {
		self.width
	}

	pub fn height(&self) -> u32 {
		self.height
	}

	pub fn pixels(&self) -> &[f32] {
		&self.pixels
	}

	fn index(&self, x: u32, y: u32) -> usize {
		(y as usize)*(self.width as usize) + (x as usize)
	}

	pub fn get(&self, x: u32, y: u32) -> f32 {
		self.pixels[self.index(x, y)]
	}

	pub fn set(&mut self, x: u32, y: u32, val: f32) {
		let i = self.index(x, y);
		self.pixels[i] = val;
	}

	pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Self> {

		if x as u64 + width as u64 > self.width as u64 || y as u64 + height as u64 > self.height as u64 {
			bail!("Crop {}x{} at ({},{}) is outside the {}x{} image", width, height, x, y, self.width, self.height);
		}

		let mut out = Self::new(width, height);
		for dy in 0 .. height {
			let src = self.index(x, y + dy);
			let dst = out.index(0, dy);
			out.pixels[dst .. dst + width as usize]
				.copy_from_slice(&self.pixels[src .. src + width as usize]);
		}
		Ok(out)
	}

	/// Cuts a gallery into its tiles, in row-major order.
	pub fn tiles(&self, tile_width: u32, tile_height: u32, rows: u32, cols: u32) -> Result<Vec<Self>> {
		let mut tiles = Vec::with_capacity((rows as usize)*(cols as usize));
		for row in 0 .. rows {
			for col in 0 .. cols {
				let tile = self.crop(col*tile_width, row*tile_height, tile_width, tile_height)
					.context(format!("Gallery has no tile at row {}, col {}", row, col))?;
				tiles.push(tile);
			}
		}
		Ok(tiles)
	}

	/// Copies the other image over this one, with its top-left corner at (x,y).
	pub fn paste(&mut self, other: &Micrograph, x: u32, y: u32) -> Result<()> {

		if x as u64 + other.width as u64 > self.width as u64 || y as u64 + other.height as u64 > self.height as u64 {
			bail!("Can't paste {}x{} at ({},{}) into a {}x{} image", other.width, other.height, x, y, self.width, self.height);
		}

		for dy in 0 .. other.height {
			let src = other.index(0, dy);
			let dst = self.index(x, y + dy);
			self.pixels[dst .. dst + other.width as usize]
				.copy_from_slice(&other.pixels[src .. src + other.width as usize]);
		}
		Ok(())
	}

	pub fn stats(&self) -> Stats {

		if self.pixels.is_empty() {
			return Stats {
				min: 0.0,
				max: 0.0,
				mean: 0.0,
				stddev: 0.0
			};
		}

		let mut min = f32::INFINITY;
		let mut max = f32::NEG_INFINITY;
		let mut sum = 0f64;
		for &p in &self.pixels {
			min = min.min(p);
			max = max.max(p);
			sum += p as f64;
		}
		let n = self.pixels.len() as f64;
		let mean = sum/n;
		let var = self.pixels.iter()
			.map(|&p| (p as f64 - mean).powi(2))
			.sum::<f64>()/n;

		Stats {
			min,
			max,
			mean: mean as f32,
			stddev: var.sqrt() as f32
		}
	}

	/// Stretches the pixel range onto 0-255. A flat image comes out black.
	pub fn to_gray8(&self) -> GrayImage {
		let Stats { min, max, .. } = self.stats();
		let range = max - min;
		GrayImage::from_fn(self.width, self.height, |x, y| {
			let v = if range > 0.0 {
				(self.get(x, y) - min)/range*255.0
			} else {
				0.0
			};
			image::Luma([v.clamp(0.0, 255.0) as u8])
		})
	}

	pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
		let path = path.as_ref();
		self.to_gray8()
			.save(path)
			.context(format!("Failed to save image to: {}", path.to_string_lossy()))?;
		info!("Saved image: {}", path.to_string_lossy());
		Ok(())
	}
}
