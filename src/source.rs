use crate::{
    credentials,
    error::{IngestError, IngestResult},
};

pub const DATATABLES_BASE_URL: &str = "https://data.nasdaq.com/api/v3/datatables";

/// Location of a remote datatable export. Building one performs no I/O; the
/// host's fetch layer retrieves [`DatatableSource::url`] and feeds the lines to
/// a [`DataStream`](crate::stream::DataStream).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatatableSource {
    code: String,
    api_key: String,
}

impl DatatableSource {
    pub fn new(code: &str, api_key: Option<&str>) -> IngestResult<Self> {
        let code = code.trim();
        if code.is_empty() {
            return Err(IngestError::EmptyDatasetCode);
        }
        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(IngestError::MissingApiKey)?;
        Ok(Self {
            code: code.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Uses the process-wide credential from [`credentials`].
    pub fn from_process_credential(code: &str) -> IngestResult<Self> {
        Self::new(code, credentials::api_key().as_deref())
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn url(&self) -> String {
        format!(
            "{DATATABLES_BASE_URL}/{}.csv?api_key={}",
            self.code, self.api_key
        )
    }
}
