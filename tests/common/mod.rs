#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use datalink_ingest::{DataStream, IngestError, LineOutcome, StreamConfig};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

pub fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("valid date")
        .and_hms_opt(0, 0, 0)
        .expect("valid time")
}

/// Builds a stream for `symbol` and feeds it `header`, asserting the sentinel.
pub fn stream_with_header(symbol: &str, config: StreamConfig, header: &str) -> DataStream {
    let mut stream = DataStream::new(symbol, config);
    let outcome = stream
        .feed_line(header, midnight(1999, 1, 1))
        .expect("header accepted");
    assert_eq!(outcome, LineOutcome::Header);
    stream
}

/// Feeds a data line and returns the record or the line-level error.
pub fn feed_data(
    stream: &mut DataStream,
    line: &str,
) -> Result<datalink_ingest::Record, IngestError> {
    stream
        .feed_line(line, midnight(1999, 1, 1))
        .map(|outcome| outcome.into_record().expect("data line produces a record"))
}
