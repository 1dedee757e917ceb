//! Bar data access port trait.

use crate::domain::error::LwtrendError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// All bars from the source, in source order.
    fn fetch_bars(&self) -> Result<Vec<OhlcvBar>, LwtrendError>;

    /// First timestamp, last timestamp and bar count, or `None` when the
    /// source holds no bars.
    fn data_range(&self) -> Result<Option<(String, String, usize)>, LwtrendError> {
        let bars = self.fetch_bars()?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((
                first.timestamp.clone(),
                last.timestamp.clone(),
                bars.len(),
            )),
            _ => None,
        })
    }
}
