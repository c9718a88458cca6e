//! Environment catalogue listing

use crate::commands::Context;
use crate::output;

/// List every known environment with its resolved URL and artifact paths
pub fn execute(ctx: &Context) -> anyhow::Result<()> {
    output::print_list(&ctx.config.environments, ctx.format)
}
