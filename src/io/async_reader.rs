//! Asynchronous CSV reader with batch interface
//!
//! Provides batch reading over commands from a CSV source, for the async
//! processing strategy.
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of Commands
//!                  ↓
//!           csv_format module
//!           (CsvRecord, convert_csv_record)
//! ```

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::Command;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Asynchronous CSV reader
///
/// Provides batch reading interface over commands.
/// Maintains streaming behavior with constant memory usage.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read a batch of commands
    ///
    /// Reads up to `batch_size` records, converting them to commands. Invalid
    /// records are logged and skipped.
    ///
    /// # Returns
    ///
    /// A vector of successfully converted commands.
    /// Returns an empty vector when the end of the input is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<Command> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(csv_record)) => match convert_csv_record(csv_record) {
                    Ok(command) => batch.push(command),
                    Err(e) => warn!("Record conversion error: {}", e),
                },
                Some(Err(e)) => warn!("CSV parse error: {}", e),
                None => break,
            }
        }

        batch
    }
}
