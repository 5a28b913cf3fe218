use std::path::Path;

use tempfile::TempDir;

use crate::DocumentFormat;
use crate::ProjectFragment;

pub(crate) const DEMO_CONFIG: &str = "projects:
  demo:
    - records/common.yaml
    - records/demo.yaml
";

pub(crate) const DEMO_COMMON_FRAGMENT: &str = "sources: [main.c]
toolchain: legacy
";

pub(crate) const DEMO_FRAGMENT: &str = "includes: [inc/]
target: cpuA
";

pub(crate) const LEGACY_PROJ_TEMPLATE: &str = r#"<project name="{{ name }}" target="{{ target }}">
{% for file in source_files %}  <file kind="{{ file.kind }}">{{ file.path }}</file>
{% endfor %}{% for dir in includes %}  <include>{{ dir }}</include>
{% endfor %}</project>
"#;

pub(crate) const LEGACY_OPTS_TEMPLATE: &str = "toolchain={{ toolchain }}
sources={{ sources|join(\",\") }}
includes={{ includes|join(\";\") }}
defines={{ defines|join(\" \") }}
";

/// Parse a YAML fragment, panicking on malformed input.
pub(crate) fn fragment(yaml: &str) -> ProjectFragment {
	ProjectFragment::parse(yaml, DocumentFormat::Yaml)
		.unwrap_or_else(|e| panic!("invalid test fragment: {e}\n{yaml}"))
}

/// Write `content` to `root/relative`, creating parent directories.
pub(crate) fn write_file(root: &Path, relative: &str, content: &str) -> std::io::Result<()> {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)
}

/// A root directory holding the two-fragment `demo` project and the
/// `legacy` templates for target `cpuA`.
pub(crate) fn demo_root() -> std::io::Result<TempDir> {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "projects.yaml", DEMO_CONFIG)?;
	write_file(tmp.path(), "records/common.yaml", DEMO_COMMON_FRAGMENT)?;
	write_file(tmp.path(), "records/demo.yaml", DEMO_FRAGMENT)?;
	write_file(
		tmp.path(),
		"templates/legacy_cpuA.proj.tmpl",
		LEGACY_PROJ_TEMPLATE,
	)?;
	write_file(
		tmp.path(),
		"templates/legacy_cpuA.opts.tmpl",
		LEGACY_OPTS_TEMPLATE,
	)?;
	Ok(tmp)
}
