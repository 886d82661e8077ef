
use anyhow::{bail, Result};

use crate::config::Config;


/// Named values for the `{placeholder}` tokens in path templates.
#[derive(Debug, Clone, Default)]
pub struct Placeholders {
	vars: Vec<(String,String)>
}

impl Placeholders {

	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_config(config: &Config) -> Self {
		let mut placeholders = Self::new();
		placeholders.set("base_project_path", &config.input.base_project_path);
		placeholders.set("session", &config.experiment.session);
		placeholders.set("specimen", &config.experiment.specimen);
		placeholders.set("run", &config.experiment.run);
		placeholders.set("slabPickRun", &config.experiment.slab_pick_run);
		placeholders
	}

	pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let value = value.into();
		match self.vars.iter_mut().find(|(k, _)| *k == name) {
			Some((_, v)) => *v = value,
			None => self.vars.push((name, value))
		}
	}

	pub fn get(&self, name: impl AsRef<str>) -> Option<&str> {
		let name = name.as_ref();
		self.vars.iter()
			.find(|(k, _)| k == name)
			.map(|(_, v)| v.as_str())
	}

	/// Replaces every `{name}` in the template with its value.
	/// `{{` and `}}` are literal braces. Values are not expanded again.
	pub fn fill(&self, template: impl AsRef<str>) -> Result<String> {

		let template = template.as_ref();
		let mut out = String::with_capacity(template.len());
		let mut chars = template.chars().peekable();

		while let Some(c) = chars.next() {
			match c {

				'{' if chars.peek() == Some(&'{') => {
					chars.next();
					out.push('{');
				}

				'{' => {
					let mut name = String::new();
					loop {
						match chars.next() {
							Some('}') => break,
							Some('{') | None => bail!("Unbalanced '{{' in path template: {}", template),
							Some(c) => name.push(c)
						}
					}
					if name.is_empty() {
						bail!("Empty placeholder in path template: {}", template);
					}
					let Some(value) = self.get(&name)
						else { bail!("Unknown placeholder {{{}}} in path template: {}", name, template); };
					out.push_str(value);
				}

				'}' if chars.peek() == Some(&'}') => {
					chars.next();
					out.push('}');
				}

				'}' => bail!("Unbalanced '}}' in path template: {}", template),

				c => out.push(c)
			}
		}

		Ok(out)
	}

	/// Fills a template made from a base path and a suffix,
	/// eg the output folder and a file name from the system parameters.
	pub fn resolve(&self, base: impl AsRef<str>, suffix: impl AsRef<str>) -> Result<String> {
		self.fill(format!("{}{}", base.as_ref(), suffix.as_ref()))
	}
}
