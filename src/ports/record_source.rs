//! Daily record supplier port.

use crate::domain::error::PipelineError;
use crate::domain::ohlcv::DailyRecord;

pub trait RecordSource {
    /// Short description of where records come from, used in log lines.
    fn describe(&self) -> String;

    fn load_records(&self) -> Result<Vec<DailyRecord>, PipelineError>;
}
