use std::error::Error;

use clap::Args;
use vbm_core::{ClusterLevel, Outcome, Specification, TimeWindow};
use vbm_grid::describe;

#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Outcome token, e.g. `turnout` or `dem_share_pres`.
    #[arg(long)]
    pub outcome: String,
    /// Specification token.
    #[arg(long, default_value = "basic")]
    pub specification: String,
    /// Filter description fragment.
    #[arg(long, default_value = "full sample")]
    pub filter_desc: String,
    /// Inclusive window written as `START-END`.
    #[arg(long)]
    pub time_window: Option<String>,
    /// Population weighting.
    #[arg(long)]
    pub weighted: bool,
    /// Cluster token.
    #[arg(long, default_value = "county")]
    pub cluster: String,
}

fn parse_window(text: &str) -> Result<TimeWindow, Box<dyn Error>> {
    let (start, end) = text
        .split_once('-')
        .ok_or_else(|| format!("time window must look like START-END, got {text}"))?;
    Ok(TimeWindow::new(start.trim().parse()?, end.trim().parse()?))
}

pub fn run(args: &DescribeArgs) -> Result<(), Box<dyn Error>> {
    let outcome: Outcome = args.outcome.parse()?;
    let specification: Specification = args.specification.parse()?;
    let cluster: ClusterLevel = args.cluster.parse()?;
    let time_window = args.time_window.as_deref().map(parse_window).transpose()?;
    println!(
        "{}",
        describe(
            outcome,
            specification,
            &args.filter_desc,
            time_window,
            args.weighted,
            cluster,
        )
    );
    Ok(())
}
