//! Context-cache cost estimates

use serde::Serialize;

use super::AnalysisKind;

/// USD per 1000 characters
const CACHE_CREATION_RATE: f64 = 0.0003125;
/// USD per 1000 characters per hour
const STORAGE_RATE: f64 = 0.001125;
const INPUT_RATE: f64 = 0.0003125;
const CACHED_INPUT_RATE: f64 = 0.000078125;
const OUTPUT_RATE: f64 = 0.00375;

fn per_thousand(chars: f64, rate: f64) -> f64 {
    chars * (rate / 1000.0)
}

/// Inputs to one cost estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostInput {
    pub cached_chars: usize,
    pub storage_hours: u32,
    pub requests: u32,
    pub input_chars: usize,
    pub output_chars: usize,
    /// Creation and storage are only charged on the first request
    pub first_request: bool,
}

/// Cost breakdown of one analysis, in USD
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub cache_creation: f64,
    pub storage: f64,
    pub input: f64,
    pub output: f64,
    pub total: f64,
}

impl CostBreakdown {
    pub fn estimate(input: CostInput) -> Self {
        let cached = input.cached_chars as f64;
        let requests = f64::from(input.requests);

        let (cache_creation, storage) = if input.first_request {
            (
                per_thousand(cached, CACHE_CREATION_RATE),
                per_thousand(cached * f64::from(input.storage_hours), STORAGE_RATE),
            )
        } else {
            (0.0, 0.0)
        };

        let input_cost = per_thousand(input.input_chars as f64 * requests, INPUT_RATE)
            + per_thousand(cached * requests, CACHED_INPUT_RATE);
        let output = per_thousand(input.output_chars as f64 * requests, OUTPUT_RATE);

        Self {
            cache_creation,
            storage,
            input: input_cost,
            output,
            total: cache_creation + storage + input_cost + output,
        }
    }
}

/// One row of the cost table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostRow {
    pub analysis: AnalysisKind,
    #[serde(flatten)]
    pub cost: CostBreakdown,
    pub cumulative: f64,
}

/// Per-repository cost table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostLedger {
    rows: Vec<CostRow>,
}

impl CostLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[CostRow] {
        &self.rows
    }

    pub fn total(&self) -> f64 {
        self.rows.last().map(|r| r.cumulative).unwrap_or_default()
    }

    /// Record one analysis against a cached repository
    ///
    /// The whole repository counts as both cached and fresh input, and the
    /// first row after a reset also pays for cache creation and storage.
    pub fn record(
        &mut self,
        analysis: AnalysisKind,
        char_count: usize,
        storage_hours: u32,
        output_chars: usize,
    ) -> &CostRow {
        let cost = CostBreakdown::estimate(CostInput {
            cached_chars: char_count,
            storage_hours,
            requests: 1,
            input_chars: char_count,
            output_chars,
            first_request: self.rows.is_empty(),
        });
        let cumulative = self.total() + cost.total;
        self.rows.push(CostRow {
            analysis,
            cost,
            cumulative,
        });
        &self.rows[self.rows.len() - 1]
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
