//! `projgen_core` turns declarative project descriptions into IDE project
//! files. A projects file names each project and the fragment files that
//! describe it; fragments are merged into a single descriptor and rendered
//! through toolchain-specific templates.
//!
//! ## Processing Pipeline
//!
//! ```text
//! projects.yaml
//!   → RootConfig (project name → fragment files)
//!   → ProjectFragment per file (sources, includes, macros, toolchain, target)
//!   → ProjectDescriptor (fragments merged in order)
//!   → ExporterRegistry lookup by toolchain
//!   → Exporter renders {toolchain}_{target}.{ext}.tmpl → {name}.{ext}
//! ```
//!
//! ## Modules
//!
//! - [`config`]: The projects file, merge and unknown-key policies.
//! - [`fragment`]: Loading and combining fragment files.
//! - [`exporter`]: The [`Exporter`] trait, the template exporter, and the
//!   registry keyed by toolchain.
//! - [`generate`]: Per-project pipeline and batch generation.
//!
//! ## Fragment Format
//!
//! ```yaml
//! sources:
//!   Source: [src/main.c, src/board.c]
//!   Startup: [startup/startup_mk20d5.s]
//! includes: [inc/, board/]
//! macros:
//!   - TARGET_K20D5M
//!   - CLOCK_HZ: 48000000
//! toolchain: uvision4
//! target: k20d5m
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use projgen_core::ExporterRegistry;
//! use projgen_core::GenerateOptions;
//! use projgen_core::RootConfig;
//! use projgen_core::generate_all;
//!
//! let config = RootConfig::load(Path::new("projects.yaml")).unwrap();
//! let options = GenerateOptions::from_config(&config, Path::new("."));
//! let report = generate_all(&config, &options, &ExporterRegistry::builtin());
//!
//! for (project, error) in report.failures() {
//! 	eprintln!("{project}: {error}");
//! }
//! ```

pub use aggregate::*;
pub use config::*;
pub use descriptor::*;
pub use error::*;
pub use exporter::*;
pub use format::*;
pub use fragment::*;
pub use generate::*;
pub use render::*;

mod aggregate;
pub mod config;
mod descriptor;
#[allow(unused_assignments)]
mod error;
pub mod exporter;
mod format;
pub mod fragment;
pub mod generate;
mod render;

#[cfg(test)]
mod __fixtures;
