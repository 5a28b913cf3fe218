use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use projgen_cli::OutputFormat;
use projgen_cli::ProjgenCli;
use projgen_core::BatchReport;
use projgen_core::ExporterRegistry;
use projgen_core::ProjgenError;
use projgen_core::RootConfig;
use projgen_core::generate_all;
use projgen_core::run_generator;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "PROJGEN_LOG";

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = ProjgenCli::parse();

	// Respect NO_COLOR env var, --no-color flag, and terminals without color.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stdout).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let code = match run(&args) {
		Ok(code) => code,
		Err(e) => {
			match e.downcast::<ProjgenError>() {
				Ok(projgen_err) => {
					let report: miette::Report = (*projgen_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			2
		}
	};

	process::exit(code);
}

fn init_tracing(verbose: bool, use_color: bool) {
	let default_directive = if verbose { "info" } else { "warn" };
	let filter =
		EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

/// Returns the process exit code: `0` when everything generated, `1` when a
/// project in the batch failed.
fn run(args: &ProjgenCli) -> Result<i32, Box<dyn std::error::Error>> {
	let config = RootConfig::load(&args.file)?;

	if args.list {
		print_projects(&config, args.format)?;
		return Ok(0);
	}

	let options = args.generate_options(&config);
	tracing::debug!(?options, "resolved generation options");
	let registry = ExporterRegistry::builtin();

	if let Some(project) = &args.project {
		let files = run_generator(&config, project, &options, &registry)?;
		match args.format {
			OutputFormat::Json => {
				let report = JsonReport {
					ok: true,
					dry_run: options.dry_run,
					projects: vec![JsonProject::generated(project, &files)],
				};
				println!("{}", serde_json::to_string_pretty(&report)?);
			}
			OutputFormat::Text => print_generated(project, &files, options.dry_run),
		}
		return Ok(0);
	}

	let report = generate_all(&config, &options, &registry);
	let code = i32::from(!report.is_ok());

	match args.format {
		OutputFormat::Json => print_json_report(&report, options.dry_run)?,
		OutputFormat::Text => print_text_report(report, options.dry_run),
	}

	Ok(code)
}

fn print_projects(config: &RootConfig, format: OutputFormat) -> Result<(), serde_json::Error> {
	match format {
		OutputFormat::Json => {
			let projects: BTreeMap<&str, Vec<String>> = config
				.projects
				.iter()
				.map(|(name, paths)| (name.as_str(), display_paths(paths)))
				.collect();
			println!(
				"{}",
				serde_json::to_string_pretty(&serde_json::json!({ "projects": projects }))?
			);
		}
		OutputFormat::Text => {
			if config.projects.is_empty() {
				println!("No projects defined.");
			}
			for (name, paths) in &config.projects {
				println!("{}", colored!(name, bold));
				if paths.is_empty() {
					println!("  (no records)");
				}
				for path in paths {
					println!("  {}", path.display());
				}
			}
		}
	}

	Ok(())
}

fn print_generated(project: &str, files: &[PathBuf], dry_run: bool) {
	let verb = if dry_run { "Would generate" } else { "Generated" };
	println!("{} {project}", colored!(verb, green));
	for file in files {
		println!("  {}", file.display());
	}
}

fn print_text_report(report: BatchReport, dry_run: bool) {
	let total = report.len();
	let mut failed = 0;

	for outcome in report {
		match outcome.result {
			Ok(files) => print_generated(&outcome.project, &files, dry_run),
			Err(error) => {
				failed += 1;
				let report =
					miette::Report::new(error).wrap_err(format!("project `{}` failed", outcome.project));
				eprintln!("{report:?}");
			}
		}
	}

	let generated = total - failed;
	if failed == 0 {
		println!("{generated} project(s) generated.");
	} else {
		println!(
			"{generated} project(s) generated, {}",
			colored!(format!("{failed} failed."), red)
		);
	}
}

#[derive(Serialize)]
struct JsonReport {
	ok: bool,
	dry_run: bool,
	projects: Vec<JsonProject>,
}

#[derive(Serialize)]
struct JsonProject {
	project: String,
	ok: bool,
	files: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<String>,
}

impl JsonProject {
	fn generated(project: &str, files: &[PathBuf]) -> Self {
		Self {
			project: project.to_string(),
			ok: true,
			files: display_paths(files),
			error: None,
		}
	}

	fn failed(project: &str, error: &ProjgenError) -> Self {
		Self {
			project: project.to_string(),
			ok: false,
			files: Vec::new(),
			error: Some(error.to_string()),
		}
	}
}

fn print_json_report(report: &BatchReport, dry_run: bool) -> Result<(), serde_json::Error> {
	let projects = report
		.iter()
		.map(|outcome| {
			match &outcome.result {
				Ok(files) => JsonProject::generated(&outcome.project, files),
				Err(error) => JsonProject::failed(&outcome.project, error),
			}
		})
		.collect();

	let json = JsonReport {
		ok: report.is_ok(),
		dry_run,
		projects,
	};
	println!("{}", serde_json::to_string_pretty(&json)?);

	Ok(())
}

fn display_paths<P: AsRef<Path>>(paths: &[P]) -> Vec<String> {
	paths
		.iter()
		.map(|path| path.as_ref().display().to_string())
		.collect()
}
