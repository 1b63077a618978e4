//! Database export: every collection becomes one entry of a zip archive,
//! either as a JSON array or as CSV. The archive is streamed while it is
//! written, one collection at a time.

use std::{
    cell::RefCell,
    io::{self, Seek, SeekFrom, Write},
    rc::Rc,
    str::FromStr,
    sync::Arc,
};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use axum::body::Bytes;
use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;
use tokio::{runtime::Handle, sync::mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Chunks buffered between the archive writer and the response body.
const ARCHIVE_CHANNEL_DEPTH: usize = 4;

/// Tables that are never exported.
const EXCLUDED_TABLES: [&str; 2] = ["_sqlx_migrations", "admin_sessions"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
#[error("Invalid format")]
pub struct UnknownFormat;

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(UnknownFormat),
        }
    }
}

/// Where exported documents come from.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    /// Collection names in export order.
    async fn list_collections(&self) -> Result<Vec<String>>;

    async fn fetch_documents(&self, collection: &str) -> Result<Vec<Value>>;
}

/// Base tables of the `public` schema, each row rendered by `row_to_json`.
pub struct PgCollectionSource {
    pool: PgPool,
}

impl PgCollectionSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[async_trait]
impl CollectionSource for PgCollectionSource {
    async fn list_collections(&self) -> Result<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
             ORDER BY table_name",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list tables")?;

        Ok(names
            .into_iter()
            .filter(|name| !EXCLUDED_TABLES.contains(&name.as_str()))
            .collect())
    }

    async fn fetch_documents(&self, collection: &str) -> Result<Vec<Value>> {
        let sql = format!(
            "SELECT row_to_json(t) FROM {} t",
            quote_identifier(collection)
        );
        sqlx::query_scalar::<_, Value>(&sql)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("failed to read table {collection}"))
    }
}

/// Bytes of an archive being written.
pub type ArchiveStream = ReceiverStream<io::Result<Bytes>>;

/// Writes one `<collection>.<format>` entry per collection on a blocking
/// thread, fetching each collection only when its entry is due. Must be
/// called from within the runtime.
///
/// A failure ends the stream with an error item. The response status is
/// already sent by then, so the failure is logged here.
pub fn stream_archive(
    source: Arc<dyn CollectionSource>,
    collections: Vec<String>,
    format: ExportFormat,
) -> ArchiveStream {
    let (tx, rx) = mpsc::channel(ARCHIVE_CHANNEL_DEPTH);
    let handle = Handle::current();

    tokio::task::spawn_blocking(move || {
        if let Err(err) = write_archive(&handle, source.as_ref(), &collections, format, &tx) {
            error!(?err, format = format.extension(), "database backup aborted mid-stream");
            // Nothing left to tell when the client is gone.
            let _ = tx.blocking_send(Err(io::Error::other(format!("{err:#}"))));
        }
    });

    ReceiverStream::new(rx)
}

fn write_archive(
    handle: &Handle,
    source: &dyn CollectionSource,
    collections: &[String],
    format: ExportFormat,
    tx: &mpsc::Sender<io::Result<Bytes>>,
) -> Result<()> {
    let window = ArchiveWindow::default();
    let mut writer = ZipWriter::new(window.clone());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for collection in collections {
        let documents = handle.block_on(source.fetch_documents(collection))?;
        let body = match format {
            ExportFormat::Json => serde_json::to_vec_pretty(&documents)
                .with_context(|| format!("failed to encode {collection} as JSON"))?,
            ExportFormat::Csv => documents_to_csv(&documents)
                .with_context(|| format!("failed to encode {collection} as CSV"))?,
        };

        let entry = format!("{collection}.{}", format.extension());
        let entry_start = window.position();
        writer
            .start_file(entry.as_str(), options)
            .with_context(|| format!("failed to start archive entry {entry}"))?;
        // Starting an entry closes the previous one; nothing before this
        // entry's header is written again.
        send_chunk(tx, window.release(entry_start))?;
        writer
            .write_all(&body)
            .with_context(|| format!("failed to write archive entry {entry}"))?;
    }

    writer.finish().context("failed to finalize archive")?;
    send_chunk(tx, window.release_all())?;

    info!(
        collections = collections.len(),
        format = format.extension(),
        "exported database backup"
    );
    Ok(())
}

fn send_chunk(tx: &mpsc::Sender<io::Result<Bytes>>, chunk: Bytes) -> Result<()> {
    if chunk.is_empty() {
        return Ok(());
    }
    tx.blocking_send(Ok(chunk))
        .map_err(|_| anyhow!("backup download closed by the client"))
}

#[derive(Debug, Default)]
struct Window {
    /// Stream offset of `buf[0]`.
    base: u64,
    buf: Vec<u8>,
    pos: u64,
}

/// Seekable sink holding only the part of the archive not yet released.
/// Seeking below the released prefix fails.
#[derive(Debug, Clone, Default)]
struct ArchiveWindow(Rc<RefCell<Window>>);

impl ArchiveWindow {
    fn position(&self) -> u64 {
        self.0.borrow().pos
    }

    /// Hands off every buffered byte before stream offset `upto`.
    fn release(&self, upto: u64) -> Bytes {
        let window = &mut *self.0.borrow_mut();
        let available = window.buf.len() as u64;
        let count = upto.saturating_sub(window.base).min(available);
        let released: Vec<u8> = window.buf.drain(..count as usize).collect();
        window.base += count;
        Bytes::from(released)
    }

    fn release_all(&self) -> Bytes {
        let end = {
            let window = self.0.borrow();
            window.base + window.buf.len() as u64
        };
        self.release(end)
    }
}

impl Write for ArchiveWindow {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let window = &mut *self.0.borrow_mut();
        let start = window
            .pos
            .checked_sub(window.base)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "write into released archive bytes"))?
            as usize;
        let end = start + data.len();
        if window.buf.len() < end {
            window.buf.resize(end, 0);
        }
        window.buf[start..end].copy_from_slice(data);
        window.pos += data.len() as u64;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for ArchiveWindow {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        let window = &mut *self.0.borrow_mut();
        let end = window.base + window.buf.len() as u64;
        let next = match target {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => end.checked_add_signed(delta),
            SeekFrom::Current(delta) => window.pos.checked_add_signed(delta),
        };

        match next {
            Some(next) if next >= window.base => {
                window.pos = next;
                Ok(next)
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek into released archive bytes",
            )),
        }
    }
}

/// Columns come from the first document. Strings are written raw, `null`
/// and missing values as empty cells, anything else as compact JSON. No
/// documents means no bytes at all.
fn documents_to_csv(documents: &[Value]) -> Result<Vec<u8>> {
    let Some(first) = documents.first() else {
        return Ok(Vec::new());
    };
    let columns: Vec<&String> = first
        .as_object()
        .map(|fields| fields.keys().collect())
        .unwrap_or_default();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;
    for document in documents {
        let row = columns.iter().map(|column| match document.get(column.as_str()) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        });
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to flush CSV: {err}"))
}
