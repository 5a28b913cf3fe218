use std::path::Path;
use std::path::PathBuf;

use derive_more::Deref;
use derive_more::DerefMut;

use crate::ExportContext;
use crate::ExporterRegistry;
use crate::MergePolicy;
use crate::ProjgenError;
use crate::ProjgenResult;
use crate::RootConfig;
use crate::UnknownKeyPolicy;
use crate::aggregate_project;

/// Everything a generation run needs besides the projects file itself.
///
/// Relative paths in the projects file are resolved against `root`;
/// `template_dirs` and `output_dir` are used as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
	pub root: PathBuf,
	pub template_dirs: Vec<PathBuf>,
	pub output_dir: PathBuf,
	pub merge: MergePolicy,
	pub unknown_keys: UnknownKeyPolicy,
	pub dry_run: bool,
	/// Stop the batch at the first failing project.
	pub fail_fast: bool,
}

impl GenerateOptions {
	/// Options taken from the projects file, with paths anchored at `root`.
	pub fn from_config(config: &RootConfig, root: &Path) -> Self {
		Self {
			root: root.to_path_buf(),
			template_dirs: config
				.template_dirs()
				.iter()
				.map(|dir| root.join(dir))
				.collect(),
			output_dir: config
				.output
				.as_ref()
				.map_or_else(|| root.to_path_buf(), |dir| root.join(dir)),
			merge: config.merge,
			unknown_keys: config.unknown_keys,
			dry_run: false,
			fail_fast: false,
		}
	}

	pub fn export_context(&self) -> ExportContext {
		ExportContext {
			template_dirs: self.template_dirs.clone(),
			output_dir: self.output_dir.clone(),
			dry_run: self.dry_run,
		}
	}
}

/// Aggregate and export one project, returning the files it produced.
pub fn run_generator(
	config: &RootConfig,
	project: &str,
	options: &GenerateOptions,
	registry: &ExporterRegistry,
) -> ProjgenResult<Vec<PathBuf>> {
	let descriptor = aggregate_project(config, project, options)?;
	let exporter = registry.resolve(&descriptor.toolchain)?;

	tracing::info!(
		project,
		toolchain = %descriptor.toolchain,
		device = %descriptor.target,
		"Generating project: {project}"
	);

	exporter.generate(&descriptor, &options.export_context())
}

/// Result of generating one project in a batch.
#[derive(Debug)]
pub struct ProjectOutcome {
	pub project: String,
	pub result: ProjgenResult<Vec<PathBuf>>,
}

impl ProjectOutcome {
	pub fn is_ok(&self) -> bool {
		self.result.is_ok()
	}
}

/// Outcomes of a batch run, in processing order.
#[derive(Debug, Default, Deref, DerefMut)]
pub struct BatchReport(Vec<ProjectOutcome>);

impl BatchReport {
	/// Returns true if every processed project generated successfully.
	pub fn is_ok(&self) -> bool {
		self.iter().all(ProjectOutcome::is_ok)
	}

	/// Failed projects with their errors.
	pub fn failures(&self) -> impl Iterator<Item = (&str, &ProjgenError)> {
		self.iter().filter_map(|outcome| {
			outcome
				.result
				.as_ref()
				.err()
				.map(|error| (outcome.project.as_str(), error))
		})
	}

	/// Every file produced by successful projects.
	pub fn written_files(&self) -> impl Iterator<Item = &Path> {
		self.iter()
			.filter_map(|outcome| outcome.result.as_ref().ok())
			.flatten()
			.map(PathBuf::as_path)
	}
}

impl IntoIterator for BatchReport {
	type IntoIter = std::vec::IntoIter<ProjectOutcome>;
	type Item = ProjectOutcome;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

/// Generate every project in the projects file.
///
/// A failing project is recorded and the batch moves on, unless
/// `options.fail_fast` is set. Files written by earlier projects are left in
/// place either way.
pub fn generate_all(
	config: &RootConfig,
	options: &GenerateOptions,
	registry: &ExporterRegistry,
) -> BatchReport {
	let mut report = BatchReport::default();

	for project in config.project_names() {
		let result = run_generator(config, project, options, registry);

		if let Err(error) = &result {
			tracing::warn!(project, %error, "project generation failed");
		}

		let failed = result.is_err();
		report.push(ProjectOutcome {
			project: project.to_string(),
			result,
		});

		if failed && options.fail_fast {
			break;
		}
	}

	report
}
