//! Phase slope and level difference estimation from spectra files.

use clap::Args;

use super::common::{EstimatorArgs, ExportArgs, SpectraArgs, run_estimates};

#[derive(Args)]
pub struct EstimateArgs {
    #[command(flatten)]
    spectra: SpectraArgs,

    /// Channel pair; pair i compares channel i+1 with channel 0
    #[arg(long, default_value = "0")]
    pair: usize,

    #[command(flatten)]
    estimator: EstimatorArgs,

    #[command(flatten)]
    export: ExportArgs,
}

pub fn run(args: EstimateArgs) -> anyhow::Result<()> {
    let estimator = args.estimator.build()?;
    let (magnitude, phase) = args.spectra.load()?;
    run_estimates(
        &magnitude,
        &phase,
        args.pair,
        &estimator,
        &args.export,
        None,
    )
}
