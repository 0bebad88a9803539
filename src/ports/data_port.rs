//! Price data access port trait.

use crate::domain::error::StratsearchError;
use crate::domain::ohlcv::PriceSeries;

pub trait PriceDataPort {
    /// Load and clean the series identified by `source` (a path for file
    /// adapters). Fails with `EmptySeries` when nothing usable remains.
    fn load_series(&self, source: &str) -> Result<PriceSeries, StratsearchError>;
}
