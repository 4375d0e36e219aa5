use super::{emit, load_inputs};
use crate::cli::CompileArgs;
use crate::error::Result;
use crate::output::render_compiled;
use geoconstr::engine::compiler::parse_constraints;
use tracing::info;

pub fn run(args: CompileArgs) -> Result<()> {
    let inputs = load_inputs(&args.input)?;
    let compiled = parse_constraints(
        &inputs.structure,
        &inputs.constraints,
        &inputs.config.compiler,
    )?;
    info!(
        "Compiled {} coordinate(s) over {} step(s).",
        compiled.coordinates().len(),
        compiled.step_count()
    );

    let report = render_compiled(&compiled, &inputs.config.compiler, &inputs.config.output)?;
    emit(&report, &args.input)
}
