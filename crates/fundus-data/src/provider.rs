//! Statement provider abstraction.

use crate::error::Result;
use fundus_ratios::FinancialRecord;
use std::future::Future;

/// A source of financial-statement records keyed by ticker.
///
/// Implementations return the most recent statement values they have for the
/// ticker. Fields the source does not report are left as `None`; deciding
/// whether a record is usable is the calculator's job.
pub trait StatementProvider {
    /// Fetch the record for one ticker.
    fn fetch_record(&self, ticker: &str) -> impl Future<Output = Result<FinancialRecord>> + Send;

    /// Short name used in logs.
    fn name(&self) -> &str;
}
