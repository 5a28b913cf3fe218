use std::path::Path;

use crate::GenerateOptions;
use crate::MergePolicy;
use crate::ProjectDescriptor;
use crate::ProjectFragment;
use crate::ProjgenError;
use crate::ProjgenResult;
use crate::RootConfig;
use crate::UnknownKeyPolicy;
use crate::display_name;
use crate::load_fragment;

/// Merge the fragments of `project` into a descriptor.
///
/// Fragments are folded in order with [`ProjectFragment::combine`], so
/// merging `[a, b, c]` is the same as merging `[a.combine(b), c]`. The merged
/// record must name a toolchain and a target.
pub fn merge<I>(project: &str, fragments: I, policy: MergePolicy) -> ProjgenResult<ProjectDescriptor>
where
	I: IntoIterator<Item = ProjectFragment>,
{
	let merged = fragments
		.into_iter()
		.fold(ProjectFragment::default(), |acc, next| acc.combine(next, policy));

	let Some(toolchain) = merged.toolchain else {
		return Err(ProjgenError::NoToolchainSelected(project.to_string()));
	};
	let Some(target) = merged.target else {
		return Err(ProjgenError::NoTargetSelected(project.to_string()));
	};

	Ok(ProjectDescriptor {
		project: project.to_string(),
		display_name: display_name(project),
		source_groups: merged.source_groups,
		includes: merged.includes,
		macros: merged.macros,
		toolchain,
		target,
		extra: merged.extra,
	})
}

/// Apply the unknown-key policy to a loaded fragment.
pub fn check_unknown_keys(
	fragment: &ProjectFragment,
	path: &Path,
	policy: UnknownKeyPolicy,
) -> ProjgenResult<()> {
	let Some(key) = fragment.extra.keys().next() else {
		return Ok(());
	};

	match policy {
		UnknownKeyPolicy::Deny => {
			Err(ProjgenError::UnknownFragmentKey {
				path: path.display().to_string(),
				key: key.clone(),
			})
		}
		UnknownKeyPolicy::Allow => {
			tracing::debug!(
				path = %path.display(),
				keys = ?fragment.extra.keys().collect::<Vec<_>>(),
				"forwarding unrecognized fragment keys to templates"
			);
			Ok(())
		}
	}
}

/// Resolve, load and merge every fragment of `project`. Fragment paths are
/// relative to `options.root`.
pub fn aggregate_project(
	config: &RootConfig,
	project: &str,
	options: &GenerateOptions,
) -> ProjgenResult<ProjectDescriptor> {
	let paths = config.resolve_fragment_paths(project)?;
	let mut fragments = Vec::with_capacity(paths.len());

	for relative in paths {
		let path = options.root.join(relative);
		let fragment = load_fragment(&path)?;
		check_unknown_keys(&fragment, &path, options.unknown_keys)?;
		fragments.push(fragment);
	}

	merge(project, fragments, options.merge)
}
