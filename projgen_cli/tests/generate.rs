mod common;

use predicates::prelude::PredicateBooleanExt;
use projgen_core::AnyEmptyResult;
use serde_json::Value;

#[test]
fn generates_every_project() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_demo(tmp.path())?;

	common::projgen_cmd()
		.arg("--file")
		.arg(tmp.path().join("projects.yaml"))
		.assert()
		.success()
		.stdout(predicates::str::contains("Generated demo"))
		.stdout(predicates::str::contains("1 project(s) generated."));

	let proj = std::fs::read_to_string(tmp.path().join("demo.proj"))?;
	assert_eq!(
		proj,
		"<project name=\"demo\">\n  <file>main.c</file>\n  <include>inc/</include>\n</project>\n"
	);

	let opts = std::fs::read_to_string(tmp.path().join("demo.opts"))?;
	assert_eq!(opts, "target=cpuA\nsources=main.c\nincludes=inc/\n");

	Ok(())
}

#[test]
fn generates_single_project() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_demo(tmp.path())?;

	common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("projects.yaml"))
		.arg("-p")
		.arg("demo")
		.assert()
		.success()
		.stdout(predicates::str::contains("Generated demo"));

	assert!(tmp.path().join("demo.proj").is_file());
	assert!(tmp.path().join("demo.opts").is_file());

	Ok(())
}

#[test]
fn root_flag_overrides_config_directory() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_demo(tmp.path())?;
	let config_dir = tempfile::tempdir()?;
	std::fs::copy(
		tmp.path().join("projects.yaml"),
		config_dir.path().join("projects.yaml"),
	)?;

	common::projgen_cmd()
		.arg("-f")
		.arg(config_dir.path().join("projects.yaml"))
		.arg("--root")
		.arg(tmp.path())
		.assert()
		.success();

	assert!(tmp.path().join("demo.proj").is_file());
	assert!(!config_dir.path().join("demo.proj").exists());

	Ok(())
}

#[test]
fn output_and_templates_flags_override_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_demo(tmp.path())?;
	common::write_file(
		tmp.path(),
		"alt/legacy_cpuA.proj.tmpl",
		"alt {{ name }}\n",
	)?;
	common::write_file(
		tmp.path(),
		"alt/legacy_cpuA.opts.tmpl",
		"alt {{ target }}\n",
	)?;
	let out = tmp.path().join("out/ide");

	common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("projects.yaml"))
		.arg("--templates")
		.arg(tmp.path().join("alt"))
		.arg("--output")
		.arg(&out)
		.assert()
		.success();

	assert_eq!(std::fs::read_to_string(out.join("demo.proj"))?, "alt demo\n");
	assert_eq!(std::fs::read_to_string(out.join("demo.opts"))?, "alt cpuA\n");
	assert!(!tmp.path().join("demo.proj").exists());

	Ok(())
}

#[test]
fn unknown_project_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_demo(tmp.path())?;

	common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("projects.yaml"))
		.arg("-p")
		.arg("lib")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("unknown project `lib`"));

	Ok(())
}

#[test]
fn empty_project_record_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "projects.yaml", "projects:\n  app: []\n")?;

	common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("projects.yaml"))
		.arg("-p")
		.arg("app")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("project record for `app` is empty"));

	Ok(())
}

#[test]
fn missing_config_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("missing.yaml"))
		.assert()
		.code(2)
		.stderr(predicates::str::contains("cannot open config file"));

	Ok(())
}

#[test]
fn malformed_config_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "projects.yaml", "projects: [unterminated\n")?;

	common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("projects.yaml"))
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}

#[test]
fn file_argument_is_required() {
	common::projgen_cmd()
		.assert()
		.failure()
		.stderr(predicates::str::contains("--file"));
}

#[test]
fn missing_toolchain_fails_single_project() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_batch_with_failure(tmp.path())?;

	common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("projects.yaml"))
		.arg("-p")
		.arg("broken")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("no toolchain selected"));

	Ok(())
}

#[test]
fn unsupported_toolchain_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_demo(tmp.path())?;
	common::write_file(
		tmp.path(),
		"records/common.yaml",
		"sources: [main.c]\ntoolchain: iar\n",
	)?;

	common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("projects.yaml"))
		.arg("-p")
		.arg("demo")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("unsupported toolchain"));

	Ok(())
}

#[test]
fn batch_continues_after_failed_project() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_batch_with_failure(tmp.path())?;

	common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("projects.yaml"))
		.assert()
		.code(1)
		.stderr(predicates::str::contains("project `broken` failed"))
		.stderr(predicates::str::contains("no toolchain selected"))
		.stdout(predicates::str::contains("Generated demo"))
		.stdout(predicates::str::contains("1 failed."));

	assert!(tmp.path().join("demo.proj").is_file());
	assert!(tmp.path().join("demo.opts").is_file());

	Ok(())
}

#[test]
fn fail_fast_stops_batch() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_batch_with_failure(tmp.path())?;

	common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("projects.yaml"))
		.arg("--fail-fast")
		.assert()
		.code(1)
		.stdout(predicates::str::contains("Generated demo").not());

	assert!(!tmp.path().join("demo.proj").exists());

	Ok(())
}

#[test]
fn dry_run_does_not_write() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_demo(tmp.path())?;

	common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("projects.yaml"))
		.arg("--dry-run")
		.assert()
		.success()
		.stdout(predicates::str::contains("Would generate demo"))
		.stdout(predicates::str::contains("demo.proj"));

	assert!(!tmp.path().join("demo.proj").exists());
	assert!(!tmp.path().join("demo.opts").exists());

	Ok(())
}

#[test]
fn unknown_keys_deny_flag_rejects_records() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_demo(tmp.path())?;
	common::write_file(
		tmp.path(),
		"records/demo.yaml",
		"includes: [inc/]\ntarget: cpuA\nlinker_file: app.ld\n",
	)?;

	common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("projects.yaml"))
		.assert()
		.success();

	common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("projects.yaml"))
		.arg("-p")
		.arg("demo")
		.arg("--unknown-keys")
		.arg("deny")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("unknown key `linker_file`"));

	Ok(())
}

#[test]
fn merge_flag_selects_concatenation() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_demo(tmp.path())?;
	common::write_file(
		tmp.path(),
		"records/demo.yaml",
		"sources: [main.c]\nincludes: [inc/]\ntarget: cpuA\n",
	)?;

	common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("projects.yaml"))
		.assert()
		.success();
	assert!(std::fs::read_to_string(tmp.path().join("demo.opts"))?.contains("sources=main.c\n"));

	common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("projects.yaml"))
		.arg("--merge")
		.arg("concatenate")
		.assert()
		.success();
	assert!(
		std::fs::read_to_string(tmp.path().join("demo.opts"))?.contains("sources=main.c,main.c\n")
	);

	Ok(())
}

#[test]
fn list_prints_projects_and_records() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_batch_with_failure(tmp.path())?;

	common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("projects.yaml"))
		.arg("--list")
		.assert()
		.success()
		.stdout(predicates::str::contains("broken\n  records/broken.yaml"))
		.stdout(predicates::str::contains(
			"demo\n  records/common.yaml\n  records/demo.yaml",
		));

	assert!(!tmp.path().join("demo.proj").exists());

	Ok(())
}

#[test]
fn json_report_lists_outcomes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_batch_with_failure(tmp.path())?;

	let output = common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("projects.yaml"))
		.arg("--format")
		.arg("json")
		.output()?;
	assert_eq!(output.status.code(), Some(1));

	let report: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(report["ok"], Value::Bool(false));
	assert_eq!(report["dry_run"], Value::Bool(false));

	let projects = report["projects"]
		.as_array()
		.ok_or("projects should be an array")?;
	assert_eq!(projects.len(), 2);
	assert_eq!(projects[0]["project"], "broken");
	assert_eq!(projects[0]["ok"], Value::Bool(false));
	assert!(
		projects[0]["error"]
			.as_str()
			.is_some_and(|error| error.contains("no toolchain selected"))
	);
	assert_eq!(projects[1]["project"], "demo");
	assert_eq!(projects[1]["ok"], Value::Bool(true));
	assert_eq!(projects[1]["files"].as_array().map(Vec::len), Some(2));

	Ok(())
}

#[test]
fn verbose_logs_generated_projects() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_demo(tmp.path())?;

	common::projgen_cmd()
		.arg("-f")
		.arg(tmp.path().join("projects.yaml"))
		.arg("--verbose")
		.assert()
		.success()
		.stderr(predicates::str::contains("Generating project: demo"));

	Ok(())
}

#[test]
fn blinky_demo_generates() -> AnyEmptyResult {
	let demo = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos/blinky");
	let out = tempfile::tempdir()?;

	common::projgen_cmd()
		.arg("-f")
		.arg(demo.join("projects.yaml"))
		.arg("--output")
		.arg(out.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("2 project(s) generated."));

	let uvproj = std::fs::read_to_string(out.path().join("blinky.uvproj"))?;
	assert!(uvproj.contains("<TargetName>blinky</TargetName>"));
	assert!(uvproj.contains("<Device>MK20DX128xxx5</Device>"));
	assert!(uvproj.contains("<Define>NDEBUG, LED_PORT=PTC, CPU_MK20DX128VFM5=1</Define>"));
	assert!(uvproj.contains("<IncludePath>.; cmsis/</IncludePath>"));
	assert!(uvproj.contains("<GroupName>Startup</GroupName>"));
	assert!(uvproj.contains("<FileName>system_MK20D5.c</FileName>"));
	assert!(out.path().join("blinky.uvopt").is_file());

	let opts = std::fs::read_to_string(out.path().join("blinky_legacy.opts"))?;
	assert_eq!(opts, "toolchain=legacy\ndefines=NDEBUG LED_PORT=PTC\n");

	Ok(())
}
