use inkwell_access::RouteGuard;

use crate::cli::{NavigateArgs, OutputFormat};
use crate::client::{AppContext, CliResult};
use crate::output::render_decision;

/// Evaluate the route guard for `args.path` and print where the client would land.
pub(crate) async fn handle_navigate(
    ctx: &AppContext,
    args: NavigateArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let guard = RouteGuard::new(ctx.session().clone(), ctx.api.clone(), ctx.config().clone());
    let decision = guard.evaluate(&args.path).await;
    render_decision(&decision, format)
}
