//! Build command - packages one artifact.

use anyhow::Result;

use crate::config::Config;
use crate::context::BuildContext;
use crate::deps;
use crate::finalize::ArtifactDescriptor;
use crate::packager::BuildMode;
use crate::pipeline;
use crate::platform::HostClass;
use crate::process::Invoker;

/// Execute the build command.
pub fn cmd_build(
    config: &Config,
    host: HostClass,
    invoker: &dyn Invoker,
    mode: BuildMode,
) -> Result<ArtifactDescriptor> {
    let ctx = BuildContext::new(config, host, invoker)?;
    println!("Building {} on {}", mode, host);

    deps::ensure(&ctx)?;
    let artifact = pipeline::build_artifact(&ctx, mode)?;

    println!();
    println!("=== Build Complete ===");
    artifact.print_summary();
    Ok(artifact)
}
