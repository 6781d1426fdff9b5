//! One artifact, start to finish.

use anyhow::Result;

use crate::bridge;
use crate::context::BuildContext;
use crate::finalize::{self, ArtifactDescriptor};
use crate::packager::{self, BuildMode, BuildRequest};
use crate::timing::Timer;

/// Package (locally or through the bridge) and finalize `mode`.
///
/// Dependencies must already be provisioned.
pub fn build_artifact(ctx: &BuildContext, mode: BuildMode) -> Result<ArtifactDescriptor> {
    let timer = Timer::start(&format!("{} ({})", mode, ctx.strategy.label));
    let request = BuildRequest::new(ctx, mode);

    let output = if ctx.strategy.delegated {
        bridge::delegate(ctx, &request)?
    } else {
        packager::package(ctx, &request)?
    };
    let artifact = finalize::finalize(ctx, mode, &output)?;

    timer.finish();
    Ok(artifact)
}
