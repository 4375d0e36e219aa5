use super::{emit, load_inputs};
use crate::cli::CheckArgs;
use crate::error::Result;
use crate::output::render_check;
use geoconstr::workflows::prepare;
use tracing::info;

pub fn run(args: CheckArgs) -> Result<()> {
    let inputs = load_inputs(&args.input)?;
    let plan = prepare::run(
        &inputs.structure,
        &inputs.constraints,
        &inputs.config.compiler,
    )?;
    info!(
        "Checking step {} of {} against the input geometry.",
        args.step,
        plan.step_count()
    );

    let report = render_check(&plan, args.step, &inputs.config.output)?;
    emit(&report, &args.input)
}
