use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ProjgenError {
	#[error(transparent)]
	#[diagnostic(code(projgen::io_error))]
	Io(#[from] std::io::Error),

	#[error("cannot open config file `{path}`: {reason}")]
	#[diagnostic(
		code(projgen::config_not_found),
		help("pass the path of an existing projects file with `--file`")
	)]
	ConfigNotFound { path: String, reason: String },

	#[error("failed to parse config file `{path}`: {reason}")]
	#[diagnostic(
		code(projgen::config_parse),
		help("the config needs a top-level `projects` mapping of project name to fragment files")
	)]
	ConfigParse { path: String, reason: String },

	#[error("unknown project `{0}`")]
	#[diagnostic(
		code(projgen::unknown_project),
		help("run `projgen --list` to see the projects defined in the config")
	)]
	UnknownProject(String),

	#[error("project record for `{0}` is empty")]
	#[diagnostic(
		code(projgen::empty_project_record),
		help("list at least one fragment file under the project")
	)]
	EmptyProjectRecord(String),

	#[error("cannot open fragment file `{path}`: {reason}")]
	#[diagnostic(code(projgen::fragment_not_found))]
	FragmentNotFound { path: String, reason: String },

	#[error("failed to parse fragment file `{path}`: {reason}")]
	#[diagnostic(
		code(projgen::fragment_parse),
		help(
			"`sources` is a path, a list of paths, or a mapping of group name to paths; `macros` \
			 is a list of `NAME` / `NAME=value` strings and `NAME: value` pairs, or a mapping of \
			 `NAME: value`"
		)
	)]
	FragmentParse { path: String, reason: String },

	#[error("unknown key `{key}` in fragment `{path}`")]
	#[diagnostic(
		code(projgen::unknown_fragment_key),
		help("recognized keys: sources, includes, macros, toolchain, target")
	)]
	UnknownFragmentKey { path: String, key: String },

	#[error("no toolchain selected in records for project `{0}`")]
	#[diagnostic(
		code(projgen::no_toolchain_selected),
		help("set `toolchain` in one of the project's fragments")
	)]
	NoToolchainSelected(String),

	#[error("no target selected in records for project `{0}`")]
	#[diagnostic(
		code(projgen::no_target_selected),
		help("set `target` in one of the project's fragments")
	)]
	NoTargetSelected(String),

	#[error("unsupported toolchain: `{name}`")]
	#[diagnostic(code(projgen::unsupported_toolchain), help("available toolchains: {available}"))]
	UnsupportedToolchain { name: String, available: String },

	#[error("template `{template}` not found in: {searched}")]
	#[diagnostic(
		code(projgen::missing_template),
		help("add the template to a templates directory or pass one with `--templates`")
	)]
	MissingTemplate { template: String, searched: String },

	#[error("template `{template}` failed to render: {reason}")]
	#[diagnostic(code(projgen::template_render))]
	TemplateRender { template: String, reason: String },
}

impl ProjgenError {
	/// Returns `true` for errors in the `TemplateRenderError` family, which
	/// includes a template that could not be found.
	pub fn is_template_error(&self) -> bool {
		matches!(self, Self::MissingTemplate { .. } | Self::TemplateRender { .. })
	}
}

pub type ProjgenResult<T> = Result<T, ProjgenError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
