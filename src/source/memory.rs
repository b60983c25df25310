use super::reader::RecordSource;
use crate::error::LoadError;
use crate::records::RawRow;

/// Rows already held in memory, for callers that build input themselves.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    rows: Vec<RawRow>,
}

impl InMemorySource {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }
}

impl RecordSource for InMemorySource {
    fn name(&self) -> String {
        "in-memory rows".to_string()
    }

    fn read_rows(&self) -> Result<Vec<RawRow>, LoadError> {
        Ok(self.rows.clone())
    }
}
