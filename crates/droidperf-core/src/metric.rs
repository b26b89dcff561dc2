//! Sampled values and ordered fallback chains.
//!
//! Every metric is acquired through a [`StrategyChain`]: strategies run in
//! order, the first `Ok` wins, and if all of them fail the chain returns a
//! metric-specific default marked `acquired: false`. Frames therefore never
//! omit a metric; they degrade it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ShellError;

/// A sampled value plus whether it was genuinely measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricValue<T> {
    pub value: T,
    pub acquired: bool,
}

impl<T> MetricValue<T> {
    /// A value read from the device.
    pub fn acquired(value: T) -> Self {
        Self {
            value,
            acquired: true,
        }
    }

    /// A default or estimate standing in for a failed measurement.
    pub fn fallback(value: T) -> Self {
        Self {
            value,
            acquired: false,
        }
    }
}

/// Why one acquisition strategy did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyFailure {
    /// The bridge command itself failed.
    #[error("bridge: {0}")]
    Shell(ShellError),

    /// A root-gated path refused the read.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Output was present but not in the expected shape.
    #[error("unparsable output: {0:?}")]
    Parse(String),

    /// A value parsed but failed plausibility checks.
    #[error("implausible value {0}")]
    OutOfRange(i64),

    /// The marker or line the strategy looks for is absent.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<ShellError> for StrategyFailure {
    fn from(err: ShellError) -> Self {
        if err.stderr().to_ascii_lowercase().contains("permission denied") {
            Self::PermissionDenied(err.stderr().to_string())
        } else {
            Self::Shell(err)
        }
    }
}

pub type StrategyResult<T> = Result<T, StrategyFailure>;

type StrategyFn<'a, T> = Box<dyn FnOnce() -> StrategyResult<T> + 'a>;

struct Step<'a, T> {
    name: &'static str,
    measured: bool,
    run: StrategyFn<'a, T>,
}

/// Ordered list of strategies for one metric.
///
/// Strategies are lazy: nothing runs until [`or_default`](Self::or_default).
pub struct StrategyChain<'a, T> {
    metric: &'static str,
    steps: Vec<Step<'a, T>>,
}

impl<'a, T> StrategyChain<'a, T> {
    pub fn new(metric: &'static str) -> Self {
        Self {
            metric,
            steps: Vec::new(),
        }
    }

    /// Append a strategy whose success counts as a genuine measurement.
    pub fn then(mut self, name: &'static str, run: impl FnOnce() -> StrategyResult<T> + 'a) -> Self {
        self.steps.push(Step {
            name,
            measured: true,
            run: Box::new(run),
        });
        self
    }

    /// Append a strategy that can only produce an estimate.
    ///
    /// Its success ends the chain but the value is reported as not acquired.
    pub fn estimate(
        mut self,
        name: &'static str,
        run: impl FnOnce() -> StrategyResult<T> + 'a,
    ) -> Self {
        self.steps.push(Step {
            name,
            measured: false,
            run: Box::new(run),
        });
        self
    }

    /// Run strategies in order and stop at the first success.
    pub fn or_default(self, default: T) -> MetricValue<T> {
        for step in self.steps {
            match (step.run)() {
                Ok(value) => {
                    log::trace!("{}: {} succeeded", self.metric, step.name);
                    return MetricValue {
                        value,
                        acquired: step.measured,
                    };
                }
                Err(failure) => {
                    log::debug!("{}: {} failed: {failure}", self.metric, step.name);
                }
            }
        }
        log::debug!("{}: all strategies failed, using default", self.metric);
        MetricValue::fallback(default)
    }
}

/// Reject output that carries a permission error on stdout.
///
/// Older bridges report `cat` failures on stdout with exit code 0.
pub fn reject_permission_denied(output: &str) -> StrategyResult<&str> {
    if output.to_ascii_lowercase().contains("permission denied") {
        Err(StrategyFailure::PermissionDenied(output.trim().to_string()))
    } else {
        Ok(output)
    }
}
