//! Parameter sweeps — grid generation and parallel execution.
//!
//! Runs are independent (one engine per run), so a sweep is embarrassingly
//! parallel across configurations.

use rayon::prelude::*;
use vegaslab_core::domain::Candle;

use crate::config::RunConfig;
use crate::runner::{run_backtest, BacktestResult, RunError};

/// Grid of strategy parameters to sweep over a single candle set.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    pub reward_ratios: Vec<f64>,
    pub adx_thresholds: Vec<f64>,
    pub stop_lookbacks: Vec<usize>,
}

impl ParamGrid {
    /// A small default grid around the reference parameter set.
    pub fn default_grid() -> Self {
        Self {
            reward_ratios: vec![2.0, 2.5, 3.0, 3.7],
            adx_thresholds: vec![25.0, 30.0, 35.0],
            stop_lookbacks: vec![96, 136, 192],
        }
    }

    /// Total number of configurations in the grid.
    pub fn size(&self) -> usize {
        self.reward_ratios.len() * self.adx_thresholds.len() * self.stop_lookbacks.len()
    }

    /// All grid points as concrete configurations derived from a base.
    pub fn generate_configs(&self, base: &RunConfig) -> Vec<RunConfig> {
        let mut configs = Vec::with_capacity(self.size());
        for &ratio in &self.reward_ratios {
            for &threshold in &self.adx_thresholds {
                for &lookback in &self.stop_lookbacks {
                    let mut config = base.clone();
                    config.strategy.reward_ratio = ratio;
                    config.strategy.adx_threshold = threshold;
                    config.strategy.stop_lookback = lookback;
                    configs.push(config);
                }
            }
        }
        configs
    }
}

/// Run every configuration over the same candles in parallel. Results come
/// back in configuration order regardless of scheduling.
pub fn run_sweep(
    configs: &[RunConfig],
    candles: &[Candle],
) -> Vec<Result<BacktestResult, RunError>> {
    configs
        .par_iter()
        .map(|config| run_backtest(config, candles))
        .collect()
}
