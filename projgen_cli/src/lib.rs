use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;
use projgen_core::GenerateOptions;
use projgen_core::MergePolicy;
use projgen_core::RootConfig;
use projgen_core::UnknownKeyPolicy;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Generate IDE project files from YAML project records.",
	long_about = "projgen reads a projects file that maps each project to the record fragments \
	              describing it (sources, includes, macros, toolchain and target), merges the \
	              fragments, and renders the toolchain's templates into IDE project \
	              files.\n\nQuick start:\n  projgen -f projects.yaml             Generate every \
	              project\n  projgen -f projects.yaml -p blinky   Generate one project\n  projgen \
	              -f projects.yaml --list      Show projects and their records"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct ProjgenCli {
	/// Projects file (YAML, JSON or TOML) mapping project names to record
	/// fragment files.
	#[arg(long, short)]
	pub file: PathBuf,

	/// Generate only this project. All projects are generated when omitted.
	#[arg(long, short)]
	pub project: Option<String>,

	/// Directory that fragment, template and output paths in the projects
	/// file are relative to. Defaults to the directory of the projects file.
	#[arg(long)]
	pub root: Option<PathBuf>,

	/// Write generated files to this directory instead of the configured
	/// output directory.
	#[arg(long, short)]
	pub output: Option<PathBuf>,

	/// Template directory to search. Repeat to search several directories in
	/// order. Replaces the configured template directories.
	#[arg(long = "templates", short = 't')]
	pub templates: Vec<PathBuf>,

	/// How list-valued keys from several records are combined.
	#[arg(long, value_enum)]
	pub merge: Option<MergeArg>,

	/// Whether records may contain keys projgen does not recognize.
	#[arg(long, value_enum)]
	pub unknown_keys: Option<UnknownKeysArg>,

	/// Render every project without writing any files.
	#[arg(long, default_value_t = false)]
	pub dry_run: bool,

	/// Stop at the first project that fails instead of reporting every
	/// failure.
	#[arg(long, default_value_t = false)]
	pub fail_fast: bool,

	/// List projects and their record files, then exit.
	#[arg(long, default_value_t = false)]
	pub list: bool,

	/// Output format for the generation report.
	#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
	pub format: OutputFormat,

	/// Enable verbose output.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

impl ProjgenCli {
	/// Root directory for relative paths in the projects file.
	pub fn root_dir(&self) -> PathBuf {
		if let Some(root) = &self.root {
			return root.clone();
		}

		match self.file.parent() {
			Some(parent) if parent != Path::new("") => parent.to_path_buf(),
			_ => PathBuf::from("."),
		}
	}

	/// Generation options from the projects file with command line
	/// overrides applied.
	pub fn generate_options(&self, config: &RootConfig) -> GenerateOptions {
		let mut options = GenerateOptions::from_config(config, &self.root_dir());

		if let Some(output) = &self.output {
			options.output_dir.clone_from(output);
		}
		if !self.templates.is_empty() {
			options.template_dirs.clone_from(&self.templates);
		}
		if let Some(merge) = self.merge {
			options.merge = merge.into();
		}
		if let Some(unknown_keys) = self.unknown_keys {
			options.unknown_keys = unknown_keys.into();
		}
		options.dry_run = self.dry_run;
		options.fail_fast = self.fail_fast;

		options
	}
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MergeArg {
	/// Append records in order, dropping entries already seen.
	Dedup,
	/// Append records in order, keeping duplicates.
	Concatenate,
}

impl From<MergeArg> for MergePolicy {
	fn from(value: MergeArg) -> Self {
		match value {
			MergeArg::Dedup => Self::Dedup,
			MergeArg::Concatenate => Self::Concatenate,
		}
	}
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnknownKeysArg {
	/// Pass unknown keys to templates as `extra`.
	Allow,
	/// Fail records that contain unknown keys.
	Deny,
}

impl From<UnknownKeysArg> for UnknownKeyPolicy {
	fn from(value: UnknownKeysArg) -> Self {
		match value {
			UnknownKeysArg::Allow => Self::Allow,
			UnknownKeysArg::Deny => Self::Deny,
		}
	}
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Each project entry includes
	/// its name, status, the files it produced, or the error.
	Json,
}
