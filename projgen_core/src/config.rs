use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::DocumentFormat;
use crate::ProjgenError;
use crate::ProjgenResult;

/// Default template search directory, relative to the root directory.
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// How list-valued fragment keys (`sources`, `includes`, `macros`) combine
/// when several fragments contribute to one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
	/// Append in fragment order and drop entries that were already seen,
	/// keeping the first occurrence.
	#[default]
	Dedup,
	/// Append in fragment order and keep every entry.
	Concatenate,
}

/// What to do with fragment keys that are not one of `sources`, `includes`,
/// `macros`, `toolchain` or `target`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeyPolicy {
	/// Forward the key to templates under `extra`.
	#[default]
	Allow,
	/// Fail the fragment with [`ProjgenError::UnknownFragmentKey`].
	Deny,
}

/// Root projects file.
///
/// ```yaml
/// projects:
///   blinky:
///     - records/common.yaml
///     - records/blinky.yaml
///   bootloader:
///     - records/common.yaml
///     - records/bootloader.yaml
///
/// templates: [templates]
/// output: generated
/// merge: dedup
/// unknown_keys: allow
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RootConfig {
	/// Project name to the ordered list of fragment files describing it.
	/// Paths are relative to the root directory.
	pub projects: BTreeMap<String, Vec<PathBuf>>,
	/// Template search directories, first match wins. Defaults to
	/// `templates/`.
	#[serde(default)]
	pub templates: Option<Vec<PathBuf>>,
	/// Directory generated files are written to. Defaults to the root
	/// directory.
	#[serde(default)]
	pub output: Option<PathBuf>,
	#[serde(default)]
	pub merge: MergePolicy,
	#[serde(default)]
	pub unknown_keys: UnknownKeyPolicy,
}

impl RootConfig {
	/// Load the projects file at `path`. The format follows the file
	/// extension (`.json`, `.toml`, otherwise YAML).
	pub fn load(path: &Path) -> ProjgenResult<Self> {
		let content = std::fs::read_to_string(path).map_err(|e| ProjgenError::ConfigNotFound {
			path: path.display().to_string(),
			reason: e.to_string(),
		})?;

		Self::parse(&content, DocumentFormat::from_path(path)).map_err(|reason| {
			ProjgenError::ConfigParse {
				path: path.display().to_string(),
				reason,
			}
		})
	}

	/// Parse a projects file from a string.
	pub fn parse(content: &str, format: DocumentFormat) -> Result<Self, String> {
		format.parse(content)
	}

	/// Fragment files listed for `project`, in the order they are stored.
	pub fn resolve_fragment_paths(&self, project: &str) -> ProjgenResult<&[PathBuf]> {
		let paths = self
			.projects
			.get(project)
			.ok_or_else(|| ProjgenError::UnknownProject(project.to_string()))?;

		if paths.is_empty() {
			return Err(ProjgenError::EmptyProjectRecord(project.to_string()));
		}

		Ok(paths.as_slice())
	}

	/// Project names in processing order.
	pub fn project_names(&self) -> impl Iterator<Item = &str> {
		self.projects.keys().map(String::as_str)
	}

	/// Template directories from the config, or the default when unset.
	pub fn template_dirs(&self) -> Vec<PathBuf> {
		self.templates
			.clone()
			.unwrap_or_else(|| vec![PathBuf::from(DEFAULT_TEMPLATES_DIR)])
	}
}
