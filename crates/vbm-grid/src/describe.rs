//! Natural-language summaries of analysis configurations.

use vbm_core::{AnalysisConfig, ClusterLevel, Outcome, Specification, TimeWindow};

const FULL_SAMPLE_CLAUSE: &str = "Full sample of CA, UT, and WA counties.";
const ALL_YEARS_CLAUSE: &str = "for all years (1996-2024)";

/// Display name for an outcome token; unknown tokens are returned as is.
pub fn outcome_name(token: &str) -> &str {
    match token {
        "dem_share" => "Democratic Vote Share (pooled across all races)",
        "dem_share_pres" => "Democratic Vote Share (Presidential elections)",
        "dem_share_gov" => "Democratic Vote Share (Governor elections)",
        "dem_share_sen" => "Democratic Vote Share (Senate elections)",
        "turnout" => "Voter Turnout",
        other => other,
    }
}

/// Display name for a specification token; unknown tokens are returned as is.
pub fn specification_name(token: &str) -> &str {
    match token {
        "basic" => "Basic specification with County and State×Year fixed effects",
        "linear" => {
            "Linear Trends specification with County, State×Year FE, and county-specific linear \
             time trends"
        }
        "quadratic" => {
            "Quadratic Trends specification with County, State×Year FE, and county-specific \
             linear and quadratic time trends"
        }
        other => other,
    }
}

/// Builds the searchable description of one analysis.
///
/// Pure: equal inputs always give the same string.
pub fn describe(
    outcome: Outcome,
    specification: Specification,
    filter_description: &str,
    time_window: Option<TimeWindow>,
    weighted: bool,
    cluster: ClusterLevel,
) -> String {
    let time_clause = match time_window {
        Some(window) => format!("for the period {window}"),
        None => ALL_YEARS_CLAUSE.to_string(),
    };
    let weight_clause = if weighted {
        "Population-weighted by CVAP. "
    } else {
        ""
    };
    let sample_clause = if filter_description.is_empty() || filter_description == "full sample" {
        FULL_SAMPLE_CLAUSE.to_string()
    } else {
        format!("Sample: {filter_description}.")
    };
    format!(
        "{} {}. {}. {}Standard errors clustered by {}. {}",
        outcome_name(outcome.token()),
        time_clause,
        specification_name(specification.token()),
        weight_clause,
        cluster.token(),
        sample_clause
    )
}

/// [`describe`] applied to a configuration.
pub fn describe_config(config: &AnalysisConfig, filter_description: &str) -> String {
    describe(
        config.outcome,
        config.specification,
        filter_description,
        config.time_window,
        config.weighted,
        config.cluster_level,
    )
}
