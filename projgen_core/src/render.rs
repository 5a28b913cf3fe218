use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::Macro;
use crate::ProjectDescriptor;
use crate::ProjgenError;
use crate::ProjgenResult;

/// How an IDE should treat a source file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
	C,
	Cpp,
	Asm,
	Header,
	Object,
	Library,
	Other,
}

impl SourceKind {
	pub fn from_path(path: &str) -> Self {
		let extension = Path::new(path)
			.extension()
			.and_then(|e| e.to_str())
			.unwrap_or("")
			.to_ascii_lowercase();

		match extension.as_str() {
			"c" => Self::C,
			"cpp" | "cc" | "cxx" | "c++" => Self::Cpp,
			"s" | "asm" => Self::Asm,
			"h" | "hpp" | "hh" | "hxx" | "inc" => Self::Header,
			"o" | "obj" => Self::Object,
			"a" | "lib" => Self::Library,
			_ => Self::Other,
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextSourceFile<'a> {
	pub path: &'a str,
	pub name: &'a str,
	pub group: &'a str,
	pub kind: SourceKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextSourceGroup<'a> {
	pub name: &'a str,
	pub files: Vec<ContextSourceFile<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextMacro<'a> {
	pub name: &'a str,
	pub value: Option<&'a str>,
	pub define: String,
}

/// The variables every project template can use.
///
/// | variable | value |
/// | --- | --- |
/// | `name` | output file stem |
/// | `project` | project name from the projects file |
/// | `toolchain`, `target` | selected identifiers |
/// | `sources` | source paths |
/// | `source_files` | `{path, name, group, kind}` per source |
/// | `source_groups` | `{name, files}` per group |
/// | `includes` | include directories |
/// | `macros` | `{name, value, define}` per macro |
/// | `defines` | `NAME` / `NAME=value` strings |
/// | `extra` | unrecognized fragment keys |
#[derive(Debug, Clone, Serialize)]
pub struct TemplateContext<'a> {
	pub name: &'a str,
	pub project: &'a str,
	pub toolchain: &'a str,
	pub target: &'a str,
	pub sources: Vec<&'a str>,
	pub source_files: Vec<ContextSourceFile<'a>>,
	pub source_groups: Vec<ContextSourceGroup<'a>>,
	pub includes: &'a [String],
	pub macros: Vec<ContextMacro<'a>>,
	pub defines: Vec<String>,
	pub extra: &'a BTreeMap<String, serde_json::Value>,
}

impl<'a> TemplateContext<'a> {
	pub fn new(descriptor: &'a ProjectDescriptor) -> Self {
		let source_groups: Vec<ContextSourceGroup<'a>> = descriptor
			.source_groups
			.iter()
			.map(|group| {
				ContextSourceGroup {
					name: group.name.as_str(),
					files: group
						.files
						.iter()
						.map(|path| source_file(path, &group.name))
						.collect(),
				}
			})
			.collect();
		let source_files = source_groups
			.iter()
			.flat_map(|group| group.files.iter().cloned())
			.collect();

		Self {
			name: &descriptor.display_name,
			project: &descriptor.project,
			toolchain: &descriptor.toolchain,
			target: &descriptor.target,
			sources: descriptor.sources(),
			source_files,
			source_groups,
			includes: &descriptor.includes,
			macros: descriptor.macros.iter().map(context_macro).collect(),
			defines: descriptor.defines(),
			extra: &descriptor.extra,
		}
	}
}

fn source_file<'a>(path: &'a str, group: &'a str) -> ContextSourceFile<'a> {
	let name = Path::new(path)
		.file_name()
		.and_then(|n| n.to_str())
		.unwrap_or(path);

	ContextSourceFile {
		path,
		name,
		group,
		kind: SourceKind::from_path(path),
	}
}

fn context_macro(definition: &Macro) -> ContextMacro<'_> {
	ContextMacro {
		name: &definition.name,
		value: definition.value.as_deref(),
		define: definition.define(),
	}
}

/// Render one template source against `context`.
///
/// Undefined variables are errors: a template that asks for something the
/// descriptor does not provide fails instead of emitting an empty string.
pub fn render_template(
	template_name: &str,
	source: &str,
	context: &TemplateContext<'_>,
) -> ProjgenResult<String> {
	let render_error = |e: minijinja::Error| {
		ProjgenError::TemplateRender {
			template: template_name.to_string(),
			reason: e.to_string(),
		}
	};

	let mut env = minijinja::Environment::new();
	env.set_keep_trailing_newline(true);
	env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
	env.add_template(template_name, source)
		.map_err(render_error)?;

	let template = env.get_template(template_name).map_err(render_error)?;
	template
		.render(minijinja::Value::from_serialize(context))
		.map_err(render_error)
}
