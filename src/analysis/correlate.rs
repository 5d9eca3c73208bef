//! Cross-checks `Scan` calls against the query that produced their rows.

use super::classify::{CallShape, DataCall, DataShape};
use super::scope::ScopeStack;
use super::{evaluate, Mismatch, Outcome, SkipReason};
use crate::config::{LimitCounting, ReadBackBasis};
use crate::syntax::{CallSite, Receiver};

/// Producers a `rows` variable may be bound to
const VARIABLE_PRODUCERS: [DataShape; 2] = [DataShape::Query, DataShape::QueryContext];

/// Producers a chained `.Scan` may be called on
const CHAINED_PRODUCERS: [DataShape; 2] = [DataShape::QueryRow, DataShape::QueryRowContext];

pub struct ReadBackCorrelator<'a> {
    scopes: &'a ScopeStack,
    basis: ReadBackBasis,
    limits: LimitCounting,
}

impl<'a> ReadBackCorrelator<'a> {
    pub fn new(scopes: &'a ScopeStack, basis: ReadBackBasis) -> Self {
        Self {
            scopes,
            basis,
            limits: LimitCounting::default(),
        }
    }

    /// LIMIT rule used when re-checking the producing query
    pub fn limit_counting(mut self, limits: LimitCounting) -> Self {
        self.limits = limits;
        self
    }

    /// Resolve the producing call of a `Scan`, re-run the placeholder check on
    /// it, and compare the result against the number of scan destinations.
    pub fn correlate(&self, scan: &CallSite) -> Result<Outcome, Mismatch> {
        if scan.spread {
            return Ok(Outcome::Skipped(SkipReason::SpreadDestinations));
        }

        let (producer, allowed) = match &scan.receiver {
            Receiver::Identifier(name) => match self.scopes.producer(name) {
                Some(call) => (call, &VARIABLE_PRODUCERS),
                None => return Ok(Outcome::Skipped(SkipReason::UnresolvedReceiver)),
            },
            Receiver::Call(call) => (&**call, &CHAINED_PRODUCERS),
            Receiver::Other => return Ok(Outcome::Skipped(SkipReason::UnresolvedReceiver)),
        };

        let shape = match CallShape::from_method(&producer.method) {
            Some(CallShape::Data(shape)) if allowed.contains(&shape) => shape,
            _ => return Ok(Outcome::Skipped(SkipReason::UnrecognizedProducer)),
        };

        let accepted = match evaluate(DataCall::new(shape), producer, self.limits) {
            Ok(Outcome::Accepted(accepted)) => accepted,
            Ok(skipped) => return Ok(skipped),
            // Already reported where the producer is called
            Err(_) => return Ok(Outcome::Skipped(SkipReason::ProducerRejected)),
        };

        let expected = match self.basis {
            ReadBackBasis::Parameters => accepted.placeholders,
            ReadBackBasis::Columns => match accepted.result_columns {
                Some(columns) => columns,
                None => return Ok(Outcome::Skipped(SkipReason::UnknownColumns)),
            },
        };

        if expected != scan.args.len() {
            return Err(Mismatch::ReadBack {
                producer: shape,
                at: producer.position,
                expected,
                supplied: scan.args.len(),
                unit: self.basis.unit(),
            });
        }
        Ok(Outcome::Accepted(accepted))
    }
}
