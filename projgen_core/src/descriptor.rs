use std::collections::BTreeMap;

use crate::Macro;
use crate::SourceGroup;

/// A project with all of its fragments merged and its toolchain and target
/// resolved. This is what exporters render.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDescriptor {
	/// Project name as written in the projects file.
	pub project: String,
	/// File-name-safe form of [`Self::project`], used for output files.
	pub display_name: String,
	pub source_groups: Vec<SourceGroup>,
	pub includes: Vec<String>,
	pub macros: Vec<Macro>,
	pub toolchain: String,
	pub target: String,
	/// Unrecognized fragment keys, last fragment wins per key.
	pub extra: BTreeMap<String, serde_json::Value>,
}

impl ProjectDescriptor {
	/// All source files across groups, in merge order.
	pub fn sources(&self) -> Vec<&str> {
		self.source_groups
			.iter()
			.flat_map(|group| group.files.iter().map(String::as_str))
			.collect()
	}

	/// Compiler-style `NAME` / `NAME=value` definitions.
	pub fn defines(&self) -> Vec<String> {
		self.macros.iter().map(Macro::define).collect()
	}
}

/// Derive the output file stem for a project name. Characters other than
/// ASCII alphanumerics, `.`, `_` and `-` are replaced with `_`.
pub fn display_name(project: &str) -> String {
	let name: String = project
		.trim()
		.chars()
		.map(|c| {
			if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
				c
			} else {
				'_'
			}
		})
		.collect();

	if name.is_empty() {
		"project".to_string()
	} else {
		name
	}
}
