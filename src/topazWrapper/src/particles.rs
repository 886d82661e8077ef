
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};


pub const COL_IMAGE_NAME: &'static str = "image_name";
pub const COL_X: &'static str = "x_coord";
pub const COL_Y: &'static str = "y_coord";
pub const COL_SCORE: &'static str = "score";


#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
	pub image_name: String,
	pub x: i64,
	pub y: i64,
	/// only predicted particles have scores
	pub score: Option<f64>
}

impl Particle {

	pub fn new(image_name: impl Into<String>, x: i64, y: i64) -> Self {
		Self {
			image_name: image_name.into(),
			x,
			y,
			score: None
		}
	}
}


/// A tab-separated particle coordinates file, as read and written by topaz:
/// a header line naming the columns, then one particle per line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParticleTable {
	pub particles: Vec<Particle>
}

impl ParticleTable {

	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, particle: Particle) {
		self.particles.push(particle);
	}

	pub fn read(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = fs::read_to_string(path)
			.context(format!("Failed to read {}", path.to_string_lossy()))?;
		Self::parse(&content)
			.context(format!("Failed to parse particles from {}", path.to_string_lossy()))
	}

	pub fn parse(content: impl AsRef<str>) -> Result<Self> {

		let mut lines = content.as_ref().lines();

		// find the columns we need by name, topaz adds extra ones sometimes
		let header = lines.next()
			.context("Missing header line")?
			.split('\t')
			.map(str::trim)
			.collect::<Vec<_>>();
		let col = |name: &str| -> Result<usize> {
			header.iter()
				.position(|h| *h == name)
				.context(format!("Missing column: {}", name))
		};
		let col_name = col(COL_IMAGE_NAME)?;
		let col_x = col(COL_X)?;
		let col_y = col(COL_Y)?;
		let col_score = col(COL_SCORE).ok();

		let mut particles = Vec::<Particle>::new();
		for (linei, line) in lines.enumerate() {

			if line.trim().is_empty() {
				continue;
			}

			// the header was line 1
			let lineno = linei + 2;
			let parts = line.split('\t')
				.collect::<Vec<_>>();

			let image_name = field(&parts, col_name, COL_IMAGE_NAME, lineno)?;
			let x = parse_coord(field(&parts, col_x, COL_X, lineno)?)
				.context(format!("Failed to read {}, line {}", COL_X, lineno))?;
			let y = parse_coord(field(&parts, col_y, COL_Y, lineno)?)
				.context(format!("Failed to read {}, line {}", COL_Y, lineno))?;
			let score = match col_score {
				Some(i) => Some(
					field(&parts, i, COL_SCORE, lineno)?
						.parse::<f64>()
						.context(format!("Failed to read {}, line {}", COL_SCORE, lineno))?
				),
				None => None
			};

			particles.push(Particle {
				image_name: image_name.to_string(),
				x,
				y,
				score
			});
		}

		Ok(Self {
			particles
		})
	}

	pub fn to_string(&self) -> String {
		let mut out = format!("{}\t{}\t{}\n", COL_IMAGE_NAME, COL_X, COL_Y);
		for particle in &self.particles {
			out.push_str(&format!("{}\t{}\t{}\n", particle.image_name, particle.x, particle.y));
		}
		out
	}

	pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
		let path = path.as_ref();
		fs::write(path, self.to_string())
			.context(format!("Failed to write particles to {}", path.to_string_lossy()))
	}

	/// How many particles have a score at or above the threshold.
	/// Particles without scores never count.
	pub fn count_at_least(&self, threshold: f64) -> usize {
		self.particles.iter()
			.filter(|p| p.score.is_some_and(|s| s >= threshold))
			.count()
	}
}


fn field<'a>(parts: &[&'a str], i: usize, name: &str, lineno: usize) -> Result<&'a str> {
	parts.get(i)
		.map(|s| s.trim())
		.context(format!("Missing {}, line {}", name, lineno))
}


fn parse_coord(s: &str) -> Result<i64> {
	if let Ok(i) = s.parse::<i64>() {
		return Ok(i);
	}
	// some tools write coordinates as floats, eg after rescaling
	let f = s.parse::<f64>()
		.context(format!("not a number: {}", s))?;
	if !f.is_finite() {
		bail!("not a finite number: {}", s);
	}
	Ok(f.round() as i64)
}
