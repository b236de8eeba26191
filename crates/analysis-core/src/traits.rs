use crate::{RawTable, SourceError};

/// A collaborator that produces raw tables: spreadsheet readers, OCR line
/// splitters, clipboard paste handlers.
pub trait TableSource: Send + Sync {
    /// Human-readable origin, used in logs
    fn describe(&self) -> String;

    fn load_tables(&self) -> Result<Vec<RawTable>, SourceError>;
}

impl TableSource for Vec<RawTable> {
    fn describe(&self) -> String {
        format!("{} in-memory tables", self.len())
    }

    fn load_tables(&self) -> Result<Vec<RawTable>, SourceError> {
        Ok(self.clone())
    }
}
