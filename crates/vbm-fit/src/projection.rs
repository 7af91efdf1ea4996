//! Alternating-projection absorption of entity and group×time effects.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::failure::{FitFailure, FitFailureKind};
use crate::problem::FitProblem;
use crate::solver::{Absorbed, FixedEffectsSolver};

fn default_tolerance() -> f64 {
    1e-10
}

fn default_max_iters() -> usize {
    10_000
}

/// Relative cutoff below which a singular value counts as zero.
const RANK_TOLERANCE: f64 = 1e-10;

/// Singular value below which a unit-scaled trend column, after the fixed
/// effects are partialled out, counts as absorbed.
const IDENTIFIED_TOLERANCE: f64 = 1e-6;

fn trend_value(problem: &FitProblem, row: usize, power: usize) -> f64 {
    match power {
        0 => 1.0,
        1 => problem.year_c[row],
        _ => problem.year_c2[row],
    }
}

/// Convergence settings for [`AlternatingProjections`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FitOpts {
    /// Largest correction, relative to the column scale, tolerated at
    /// convergence.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Maximum number of projection sweeps per column.
    #[serde(default = "default_max_iters")]
    pub max_iters: usize,
}

impl Default for FitOpts {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_iters: default_max_iters(),
        }
    }
}

/// Frisch–Waugh–Lovell solver that alternates between the entity block
/// (intercept and trend terms fitted per entity by weighted least squares)
/// and the group×time block (weighted cell means) until neither moves the
/// column.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AlternatingProjections {
    opts: FitOpts,
}

impl AlternatingProjections {
    /// Creates a solver with the given convergence settings.
    pub fn new(opts: FitOpts) -> Self {
        Self { opts }
    }

    /// Convergence settings in use.
    pub fn opts(&self) -> &FitOpts {
        &self.opts
    }
}

struct EntityBlock {
    rows: Vec<usize>,
    design: DMatrix<f64>,
    projector: DMatrix<f64>,
}

impl EntityBlock {
    fn build(problem: &FitProblem, rows: Vec<usize>, degree: usize) -> Result<Self, FitFailure> {
        let width = degree + 1;
        let design = DMatrix::from_fn(rows.len(), width, |i, j| trend_value(problem, rows[i], j));
        let weighted_t =
            DMatrix::from_fn(width, rows.len(), |i, j| design[(j, i)] * problem.weights[rows[j]]);
        let gram = &weighted_t * &design;
        let svd = gram.svd(true, true);
        let largest = svd.singular_values.max();
        if largest <= 0.0 || !largest.is_finite() {
            return Ok(Self {
                projector: DMatrix::zeros(width, rows.len()),
                rows,
                design,
            });
        }
        let inverse = svd.pseudo_inverse(largest * RANK_TOLERANCE).map_err(|message| {
            FitFailure::new(FitFailureKind::NonFinite, format!("entity projection: {message}"))
        })?;
        Ok(Self {
            projector: inverse * weighted_t,
            rows,
            design,
        })
    }

    fn project(&self, column: &mut [f64]) -> f64 {
        let local = DVector::from_iterator(self.rows.len(), self.rows.iter().map(|&r| column[r]));
        let fitted = &self.design * (&self.projector * local);
        let mut largest: f64 = 0.0;
        for (k, &row) in self.rows.iter().enumerate() {
            column[row] -= fitted[k];
            largest = largest.max(fitted[k].abs());
        }
        largest
    }
}

struct Blocks<'a> {
    problem: &'a FitProblem,
    entities: Vec<EntityBlock>,
    cell_weight: Vec<f64>,
}

impl<'a> Blocks<'a> {
    fn build(problem: &'a FitProblem, degree: usize) -> Result<Self, FitFailure> {
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); problem.n_entities];
        for (row, &entity) in problem.entities.iter().enumerate() {
            members[entity].push(row);
        }
        let entities = members
            .into_iter()
            .filter(|rows| !rows.is_empty())
            .map(|rows| EntityBlock::build(problem, rows, degree))
            .collect::<Result<Vec<_>, _>>()?;
        let mut cell_weight = vec![0.0; problem.n_cells];
        for (row, &cell) in problem.cells.iter().enumerate() {
            cell_weight[cell] += problem.weights[row];
        }
        Ok(Self {
            problem,
            entities,
            cell_weight,
        })
    }

    fn project_cells(&self, column: &mut [f64]) -> f64 {
        let mut sums = vec![0.0; self.problem.n_cells];
        for (row, &cell) in self.problem.cells.iter().enumerate() {
            sums[cell] += self.problem.weights[row] * column[row];
        }
        let means: Vec<f64> = sums
            .iter()
            .zip(&self.cell_weight)
            .map(|(sum, weight)| if *weight > 0.0 { sum / weight } else { 0.0 })
            .collect();
        for (row, &cell) in self.problem.cells.iter().enumerate() {
            column[row] -= means[cell];
        }
        means.iter().fold(0.0, |acc: f64, mean| acc.max(mean.abs()))
    }

    fn residualize(&self, column: &mut [f64], opts: &FitOpts) -> Option<usize> {
        let scale = column.iter().fold(1.0_f64, |acc, value| acc.max(value.abs()));
        for sweep in 1..=opts.max_iters {
            let mut moved: f64 = 0.0;
            for block in &self.entities {
                moved = moved.max(block.project(column));
            }
            moved = moved.max(self.project_cells(column));
            if moved <= opts.tolerance * scale {
                return Some(sweep);
            }
        }
        None
    }
}

impl AlternatingProjections {
    fn residualize(
        &self,
        blocks: &Blocks<'_>,
        name: &str,
        column: &mut [f64],
    ) -> Result<usize, FitFailure> {
        blocks.residualize(column, &self.opts).ok_or_else(|| {
            FitFailure::new(
                FitFailureKind::NonConvergence,
                format!("{name} did not converge within {} sweeps", self.opts.max_iters),
            )
        })
    }

    /// Number of per-entity trend coefficients identified jointly with the
    /// entity and group×time effects: the rank of the trend columns once
    /// entity intercepts and cell means are removed. Entity trends within a
    /// group sum to a trend the group×time effects already carry.
    pub fn identified_trends(&self, problem: &FitProblem) -> Result<usize, FitFailure> {
        if problem.trend_degree == 0 || problem.is_empty() {
            return Ok(0);
        }
        let fixed = Blocks::build(problem, 0)?;
        let n = problem.len();
        let mut columns: Vec<Vec<f64>> = Vec::new();
        for block in &fixed.entities {
            for power in 1..=problem.trend_degree {
                let mut column = vec![0.0; n];
                for &row in &block.rows {
                    column[row] = trend_value(problem, row, power);
                }
                let norm = column
                    .iter()
                    .zip(&problem.weights)
                    .map(|(x, w)| w * x * x)
                    .sum::<f64>()
                    .sqrt();
                if norm <= 0.0 {
                    continue;
                }
                self.residualize(&fixed, "trend", &mut column)?;
                for (value, weight) in column.iter_mut().zip(&problem.weights) {
                    *value *= weight.sqrt() / norm;
                }
                columns.push(column);
            }
        }
        if columns.is_empty() {
            return Ok(0);
        }
        let matrix = DMatrix::from_fn(n, columns.len(), |i, j| columns[j][i]);
        let singular = matrix.singular_values();
        Ok(singular.iter().filter(|&&value| value > IDENTIFIED_TOLERANCE).count())
    }
}

impl FixedEffectsSolver for AlternatingProjections {
    fn absorb(&self, problem: &FitProblem) -> Result<Absorbed, FitFailure> {
        let blocks = Blocks::build(problem, problem.trend_degree)?;
        let mut y = problem.y.clone();
        let mut treat = problem.treat.clone();
        let mut sweeps = 0;
        for (name, column) in [("outcome", &mut y), ("treatment", &mut treat)] {
            sweeps += self.residualize(&blocks, name, column)?;
        }
        Ok(Absorbed {
            y,
            treat,
            trend_params: self.identified_trends(problem)?,
            sweeps,
        })
    }
}
