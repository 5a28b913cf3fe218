use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use serde_yaml_ng::Mapping;
use serde_yaml_ng::Value;

use crate::DocumentFormat;
use crate::MergePolicy;
use crate::ProjgenError;
use crate::ProjgenResult;

/// Group that flat `sources` lists are placed in.
pub const DEFAULT_SOURCE_GROUP: &str = "Source";

/// A named group of source files, shown as a folder by IDEs that support it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceGroup {
	pub name: String,
	pub files: Vec<String>,
}

/// A preprocessor macro definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Macro {
	pub name: String,
	pub value: Option<String>,
}

impl Macro {
	/// Parse `NAME` or `NAME=value`.
	pub fn parse(definition: &str) -> Self {
		match definition.split_once('=') {
			Some((name, value)) => {
				Self {
					name: name.trim().to_string(),
					value: Some(value.trim().to_string()),
				}
			}
			None => {
				Self {
					name: definition.trim().to_string(),
					value: None,
				}
			}
		}
	}

	/// The `NAME` / `NAME=value` form passed to compilers.
	pub fn define(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for Macro {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.value {
			Some(value) => write!(f, "{}={value}", self.name),
			None => write!(f, "{}", self.name),
		}
	}
}

/// One parsed fragment file, normalized but not yet merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFragment {
	pub source_groups: Vec<SourceGroup>,
	pub includes: Vec<String>,
	pub macros: Vec<Macro>,
	pub toolchain: Option<String>,
	pub target: Option<String>,
	/// Keys other than `sources`, `includes`, `macros`, `toolchain` and
	/// `target`, kept verbatim.
	pub extra: BTreeMap<String, serde_json::Value>,
}

impl ProjectFragment {
	/// Parse a fragment document. An empty document is an empty fragment.
	pub fn parse(content: &str, format: DocumentFormat) -> Result<Self, String> {
		if content.trim().is_empty() {
			return Ok(Self::default());
		}

		let raw: Option<RawFragment> = format.parse(content)?;
		raw.map_or_else(|| Ok(Self::default()), RawFragment::normalize)
	}

	/// Flattened source list across all groups, in group order.
	pub fn sources(&self) -> impl Iterator<Item = &str> {
		self.source_groups
			.iter()
			.flat_map(|group| group.files.iter().map(String::as_str))
	}

	/// Fold `next` into `self`. List-valued keys are appended according to
	/// `policy`, scalar keys and extra keys take the value from `next` when it
	/// sets one.
	#[must_use]
	pub fn combine(mut self, next: ProjectFragment, policy: MergePolicy) -> Self {
		let mut seen_sources: HashSet<String> = self.sources().map(str::to_string).collect();
		for group in next.source_groups {
			let files: Vec<String> = match policy {
				MergePolicy::Dedup => {
					group
						.files
						.into_iter()
						.filter(|file| seen_sources.insert(file.clone()))
						.collect()
				}
				MergePolicy::Concatenate => group.files,
			};

			match self.source_groups.iter_mut().find(|g| g.name == group.name) {
				Some(existing) => existing.files.extend(files),
				None => {
					self.source_groups.push(SourceGroup {
						name: group.name,
						files,
					});
				}
			}
		}

		match policy {
			MergePolicy::Dedup => {
				let mut seen: HashSet<String> = self.includes.iter().cloned().collect();
				self.includes
					.extend(next.includes.into_iter().filter(|i| seen.insert(i.clone())));
			}
			MergePolicy::Concatenate => self.includes.extend(next.includes),
		}

		for definition in next.macros {
			if policy == MergePolicy::Dedup {
				if let Some(existing) = self.macros.iter().find(|m| m.name == definition.name) {
					if existing.value != definition.value {
						tracing::warn!(
							name = %definition.name,
							kept = %existing,
							ignored = %definition,
							"conflicting macro definition ignored"
						);
					}
					continue;
				}
			}
			self.macros.push(definition);
		}

		if next.toolchain.is_some() {
			self.toolchain = next.toolchain;
		}
		if next.target.is_some() {
			self.target = next.target;
		}
		self.extra.extend(next.extra);

		self
	}
}

/// Load and normalize the fragment file at `path`.
pub fn load_fragment(path: &Path) -> ProjgenResult<ProjectFragment> {
	let content = std::fs::read_to_string(path).map_err(|e| ProjgenError::FragmentNotFound {
		path: path.display().to_string(),
		reason: e.to_string(),
	})?;

	let fragment =
		ProjectFragment::parse(&content, DocumentFormat::from_path(path)).map_err(|reason| {
			ProjgenError::FragmentParse {
				path: path.display().to_string(),
				reason,
			}
		})?;

	tracing::debug!(
		path = %path.display(),
		sources = fragment.sources().count(),
		includes = fragment.includes.len(),
		macros = fragment.macros.len(),
		"loaded fragment"
	);

	Ok(fragment)
}

#[derive(Debug, Deserialize)]
struct RawFragment {
	#[serde(default)]
	sources: Option<RawSources>,
	#[serde(default)]
	includes: Option<StringList>,
	#[serde(default)]
	macros: Option<RawMacros>,
	#[serde(default)]
	toolchain: Option<String>,
	#[serde(default)]
	target: Option<String>,
	#[serde(flatten)]
	extra: BTreeMap<String, serde_json::Value>,
}

impl RawFragment {
	fn normalize(self) -> Result<ProjectFragment, String> {
		let source_groups = match self.sources {
			None => Vec::new(),
			Some(RawSources::Flat(files)) => {
				vec![SourceGroup {
					name: DEFAULT_SOURCE_GROUP.to_string(),
					files: files.into_vec(),
				}]
			}
			Some(RawSources::Grouped(groups)) => {
				groups
					.into_iter()
					.map(|(name, files)| {
						let name = mapping_key(name)?;
						let files: Option<StringList> = serde_yaml_ng::from_value(files)
							.map_err(|e| format!("source group `{name}`: {e}"))?;
						Ok(SourceGroup {
							name,
							files: files.map(StringList::into_vec).unwrap_or_default(),
						})
					})
					.collect::<Result<_, String>>()?
			}
		};

		let macros = match self.macros {
			None => Vec::new(),
			Some(RawMacros::List(entries)) => {
				let mut macros = Vec::with_capacity(entries.len());
				for entry in entries {
					match entry {
						RawMacro::Definition(definition) => macros.push(Macro::parse(&definition)),
						RawMacro::Pairs(pairs) => macros.extend(pairs_to_macros(pairs)?),
					}
				}
				macros
			}
			Some(RawMacros::Map(pairs)) => pairs_to_macros(pairs)?,
		};

		Ok(ProjectFragment {
			source_groups,
			includes: self.includes.map(StringList::into_vec).unwrap_or_default(),
			macros,
			toolchain: self.toolchain,
			target: self.target,
			extra: self.extra,
		})
	}
}

/// Macros from a `NAME: value` mapping, in document order.
fn pairs_to_macros(pairs: Mapping) -> Result<Vec<Macro>, String> {
	pairs
		.into_iter()
		.map(|(name, value)| {
			let name = mapping_key(name)?;
			let value = macro_value(&name, value)?;
			Ok(Macro { name, value })
		})
		.collect()
}

fn mapping_key(key: Value) -> Result<String, String> {
	match key {
		Value::String(key) => Ok(key),
		Value::Number(key) => Ok(key.to_string()),
		Value::Bool(key) => Ok(key.to_string()),
		other => Err(format!("expected a name, found `{other:?}`")),
	}
}

/// Scalar macro values. Booleans become `1` / `0`. Numbers are written in
/// decimal, so a value like `0x400` must be quoted to keep its spelling.
fn macro_value(name: &str, value: Value) -> Result<Option<String>, String> {
	match value {
		Value::Null => Ok(None),
		Value::Bool(true) => Ok(Some("1".to_string())),
		Value::Bool(false) => Ok(Some("0".to_string())),
		Value::Number(number) => Ok(Some(number.to_string())),
		Value::String(text) => Ok(Some(text)),
		Value::Tagged(tagged) => macro_value(name, tagged.value),
		Value::Sequence(_) | Value::Mapping(_) => {
			Err(format!("macro `{name}` must have a scalar value"))
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringList {
	One(String),
	Many(Vec<String>),
}

impl StringList {
	fn into_vec(self) -> Vec<String> {
		match self {
			Self::One(value) => vec![value],
			Self::Many(values) => values,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSources {
	Flat(StringList),
	Grouped(Mapping),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMacros {
	List(Vec<RawMacro>),
	Map(Mapping),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMacro {
	Definition(String),
	Pairs(Mapping),
}
