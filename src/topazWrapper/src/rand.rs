
use std::f64::consts::TAU;

use fastrand::Rng;


/// Normal distribution, sampled with the Box-Muller transform.
#[derive(Debug, Clone, Copy)]
pub struct Gaussian {
	pub mean: f64,
	pub stddev: f64
}

impl Gaussian {

	pub const fn new(mean: f64, stddev: f64) -> Self {
		Self {
			mean,
			stddev
		}
	}

	pub fn sample(&self, rng: &mut Rng) -> f64 {
		// rng.f64() is in [0,1), flip it so the log never sees zero
		let radius = (-2.0*(1.0 - rng.f64()).ln()).sqrt();
		let angle = TAU*rng.f64();
		self.mean + self.stddev*radius*angle.cos()
	}
}


/// A seeded generator when asked for one, so composite grids can be reproduced.
pub fn rng(seed: Option<u64>) -> Rng {
	match seed {
		Some(seed) => Rng::with_seed(seed),
		None => Rng::new()
	}
}
