use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn projgen_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("projgen"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("PROJGEN_LOG");
	cmd
}

pub fn write_file(root: &Path, relative: &str, content: &str) -> std::io::Result<()> {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)
}

/// Lay out the two-record `demo` project with `legacy` templates for
/// target `cpuA`.
pub fn write_demo(root: &Path) -> std::io::Result<()> {
	write_file(
		root,
		"projects.yaml",
		"projects:\n  demo:\n    - records/common.yaml\n    - records/demo.yaml\n",
	)?;
	write_file(
		root,
		"records/common.yaml",
		"sources: [main.c]\ntoolchain: legacy\n",
	)?;
	write_file(root, "records/demo.yaml", "includes: [inc/]\ntarget: cpuA\n")?;
	write_file(
		root,
		"templates/legacy_cpuA.proj.tmpl",
		"<project name=\"{{ name }}\">\n{% for file in sources %}  <file>{{ file }}</file>\n{% \
		 endfor %}{% for dir in includes %}  <include>{{ dir }}</include>\n{% endfor %}</project>\n",
	)?;
	write_file(
		root,
		"templates/legacy_cpuA.opts.tmpl",
		"target={{ target }}\nsources={{ sources|join(\",\") }}\nincludes={{ includes|join(\";\") \
		 }}\n",
	)
}

/// The demo project plus a `broken` project whose record selects no
/// toolchain.
pub fn write_batch_with_failure(root: &Path) -> std::io::Result<()> {
	write_demo(root)?;
	write_file(
		root,
		"projects.yaml",
		"projects:\n  broken: [records/broken.yaml]\n  demo: [records/common.yaml, \
		 records/demo.yaml]\n",
	)?;
	write_file(root, "records/broken.yaml", "sources: [a.c]\n")
}
