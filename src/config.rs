use clap::ValueEnum;

/// What a `Scan` call's destination count is compared against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum ReadBackBasis {
    /// The producing query's accepted placeholder count
    #[default]
    Parameters,
    /// The producing SELECT's result-column count
    Columns,
}

impl ReadBackBasis {
    /// Noun used in diagnostics for the compared quantity
    pub fn unit(&self) -> &'static str {
        match self {
            ReadBackBasis::Parameters => "placeholder(s)",
            ReadBackBasis::Columns => "result column(s)",
        }
    }
}

/// How a LIMIT clause adds to a statement's placeholder count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum LimitCounting {
    /// One parameter per bound present (offset, row count)
    #[default]
    Presence,
    /// Only the markers inside each bound, so `LIMIT 10` needs nothing
    Markers,
}

/// Configuration for a check run
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub read_back_basis: ReadBackBasis,
    pub limit_counting: LimitCounting,
    /// Include `_test.go` files found while expanding directories
    pub include_tests: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            read_back_basis: ReadBackBasis::default(),
            limit_counting: LimitCounting::default(),
            include_tests: true,
        }
    }
}
