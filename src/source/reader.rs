use crate::error::LoadError;
use crate::records::RawRow;

/// Anything that can hand over the raw exam rows of one report run.
pub trait RecordSource {
    /// Human readable name used in logs and error messages.
    fn name(&self) -> String;

    fn read_rows(&self) -> Result<Vec<RawRow>, LoadError>;
}
