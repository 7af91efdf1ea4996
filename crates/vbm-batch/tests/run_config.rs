use std::fs;
use std::path::PathBuf;

use vbm_batch::{load_run_config, RunConfig};
use vbm_core::Outcome;

#[test]
fn partial_yaml_keeps_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("run.yaml");
    fs::write(
        &path,
        "panel: data/panel.csv\nconcurrency: 4\nfit:\n  max_iters: 500\ngrid:\n  outcomes: [turnout]\n",
    )
    .expect("write");
    let config = load_run_config(&path).expect("config");
    assert_eq!(config.panel, PathBuf::from("data/panel.csv"));
    assert_eq!(config.opts.concurrency, 4);
    assert_eq!(config.opts.min_obs, 20);
    assert_eq!(config.opts.progress_every, 100);
    assert_eq!(config.opts.fit.max_iters, 500);
    assert_eq!(config.opts.fit.tolerance, 1e-10);
    assert_eq!(config.grid.outcomes, vec![Outcome::Turnout]);
    assert_eq!(config.data_source, RunConfig::default().data_source);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_run_config("/nonexistent/run.yaml").expect_err("missing");
    assert_eq!(err.info().code, "config-read");
}
