use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::ProjectDescriptor;
use crate::ProjgenError;
use crate::ProjgenResult;
use crate::TemplateContext;
use crate::render_template;

/// Suffix shared by all template files.
pub const TEMPLATE_SUFFIX: &str = "tmpl";

/// Where exporters read templates from and write output to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportContext {
	/// Template search directories, first match wins.
	pub template_dirs: Vec<PathBuf>,
	/// Directory generated files are written to. Created when missing.
	pub output_dir: PathBuf,
	/// Render everything but write nothing.
	pub dry_run: bool,
}

/// A file produced by an exporter, before it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
	pub path: PathBuf,
	pub content: String,
}

/// Turns a [`ProjectDescriptor`] into IDE project files for one toolchain.
pub trait Exporter: fmt::Debug {
	/// Toolchain identifier this exporter is registered under.
	fn toolchain(&self) -> &str;

	/// Write the project files for `descriptor` and return their paths.
	/// Nothing is written unless every file rendered, and files written by a
	/// call that fails part way are removed again.
	fn generate(
		&self,
		descriptor: &ProjectDescriptor,
		ctx: &ExportContext,
	) -> ProjgenResult<Vec<PathBuf>>;
}

/// Exporter driven by `{toolchain}_{target}.{ext}.tmpl` templates, one per
/// output extension. Each template renders to `{name}.{ext}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateExporter {
	toolchain: String,
	extensions: Vec<String>,
}

impl TemplateExporter {
	pub fn new<I, S>(toolchain: impl Into<String>, extensions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			toolchain: toolchain.into(),
			extensions: extensions.into_iter().map(Into::into).collect(),
		}
	}

	/// Project definition plus options file.
	pub fn legacy() -> Self {
		Self::new("legacy", ["proj", "opts"])
	}

	/// Keil uVision 4 project and debugger options.
	pub fn uvision4() -> Self {
		Self::new("uvision4", ["uvproj", "uvopt"])
	}

	pub fn extensions(&self) -> &[String] {
		&self.extensions
	}

	/// Template file name for one output extension.
	pub fn template_name(&self, target: &str, extension: &str) -> String {
		format!("{}_{target}.{extension}.{TEMPLATE_SUFFIX}", self.toolchain)
	}

	fn find_template(&self, template_name: &str, ctx: &ExportContext) -> ProjgenResult<PathBuf> {
		for dir in &ctx.template_dirs {
			let candidate = dir.join(template_name);
			if candidate.is_file() {
				tracing::debug!(template = %candidate.display(), "using template");
				return Ok(candidate);
			}
		}

		let searched = ctx
			.template_dirs
			.iter()
			.map(|dir| format!("`{}`", dir.display()))
			.collect::<Vec<_>>()
			.join(", ");

		Err(ProjgenError::MissingTemplate {
			template: template_name.to_string(),
			searched: if searched.is_empty() {
				"no template directories".to_string()
			} else {
				searched
			},
		})
	}

	/// Render every output file for `descriptor` without writing anything.
	pub fn render(
		&self,
		descriptor: &ProjectDescriptor,
		ctx: &ExportContext,
	) -> ProjgenResult<Vec<RenderedFile>> {
		let context = TemplateContext::new(descriptor);
		let mut rendered = Vec::with_capacity(self.extensions.len());

		for extension in &self.extensions {
			let template_name = self.template_name(&descriptor.target, extension);
			let template_path = self.find_template(&template_name, ctx)?;
			let source = std::fs::read_to_string(&template_path).map_err(|e| {
				ProjgenError::TemplateRender {
					template: template_path.display().to_string(),
					reason: e.to_string(),
				}
			})?;
			let content = render_template(&template_name, &source, &context)?;

			rendered.push(RenderedFile {
				path: ctx
					.output_dir
					.join(format!("{}.{extension}", descriptor.display_name)),
				content,
			});
		}

		Ok(rendered)
	}
}

impl Exporter for TemplateExporter {
	fn toolchain(&self) -> &str {
		&self.toolchain
	}

	fn generate(
		&self,
		descriptor: &ProjectDescriptor,
		ctx: &ExportContext,
	) -> ProjgenResult<Vec<PathBuf>> {
		let rendered = self.render(descriptor, ctx)?;

		if ctx.dry_run {
			for file in &rendered {
				tracing::info!(path = %file.path.display(), "would write");
			}
			return Ok(rendered.into_iter().map(|file| file.path).collect());
		}

		std::fs::create_dir_all(&ctx.output_dir)?;

		let mut written = Vec::with_capacity(rendered.len());
		for file in rendered {
			if let Err(error) = std::fs::write(&file.path, &file.content) {
				remove_written(&written);
				return Err(error.into());
			}
			tracing::info!(path = %file.path.display(), "wrote project file");
			written.push(file.path);
		}

		Ok(written)
	}
}

fn remove_written(paths: &[PathBuf]) {
	for path in paths {
		if let Err(error) = std::fs::remove_file(path) {
			tracing::warn!(path = %path.display(), %error, "could not remove partial output");
		}
	}
}

/// Exporters keyed by toolchain identifier.
#[derive(Debug, Default)]
pub struct ExporterRegistry {
	exporters: BTreeMap<String, Box<dyn Exporter>>,
}

impl ExporterRegistry {
	/// An empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry with every exporter that ships with projgen.
	pub fn builtin() -> Self {
		let mut registry = Self::new();
		registry.register(TemplateExporter::legacy());
		registry.register(TemplateExporter::uvision4());
		registry
	}

	/// Register `exporter` under its toolchain identifier, returning the
	/// exporter it replaced.
	pub fn register(&mut self, exporter: impl Exporter + 'static) -> Option<Box<dyn Exporter>> {
		self.exporters
			.insert(exporter.toolchain().to_string(), Box::new(exporter))
	}

	/// Look up the exporter for `toolchain`.
	pub fn resolve(&self, toolchain: &str) -> ProjgenResult<&dyn Exporter> {
		match self.exporters.get(toolchain) {
			Some(exporter) => Ok(exporter.as_ref()),
			None => {
				Err(ProjgenError::UnsupportedToolchain {
					name: toolchain.to_string(),
					available: self.toolchains().collect::<Vec<_>>().join(", "),
				})
			}
		}
	}

	/// Registered toolchain identifiers in sorted order.
	pub fn toolchains(&self) -> impl Iterator<Item = &str> {
		self.exporters.keys().map(String::as_str)
	}
}
