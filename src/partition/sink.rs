use crate::io::atomic::{publish, temp_sibling};
use anyhow::{Context, Result, bail};
use std::collections::BTreeMap;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Where partition rows go.
///
/// `open` is called once per partition, the first time its key appears. The
/// returned writer receives that partition's CSV rows and is handed back to
/// `commit` after all input has been written.
pub trait PartitionSink {
    type Writer: Write;

    fn open(&mut self, partition: &str) -> Result<Self::Writer>;

    fn commit(&mut self, partition: &str, writer: Self::Writer) -> Result<()>;
}

/* ===================== DirectorySink ===================== */

/// Hive-style partition directories: `<root>/<column>=<key>/<file_name>`.
///
/// Partition names must be a single path component; names containing `/` or
/// `\` are refused so rows cannot land outside `root`.
///
/// Rows are written to a temporary file inside the partition directory and renamed
/// into place on commit, so readers never observe a half-written partition.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
    column: String,
    file_name: String,
}

impl DirectorySink {
    /// Status partitions under `root`, one `part-00000.csv` each.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            column: "status".to_string(),
            file_name: "part-00000.csv".to_string(),
        }
    }

    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final location of a partition's data file.
    #[must_use]
    pub fn partition_path(&self, partition: &str) -> PathBuf {
        self.root
            .join(format!("{}={partition}", self.column))
            .join(&self.file_name)
    }
}

/// A partition file that is still being written.
pub struct PartitionFile {
    inner: BufWriter<NamedTempFile>,
    path: PathBuf,
}

impl Write for PartitionFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl PartitionSink for DirectorySink {
    type Writer = PartitionFile;

    fn open(&mut self, partition: &str) -> Result<PartitionFile> {
        if partition.contains(['/', '\\']) {
            bail!("partition name {partition:?} is not a single path component");
        }
        let path = self.partition_path(partition);
        let tmp = temp_sibling(&path)?;
        Ok(PartitionFile {
            inner: BufWriter::new(tmp),
            path,
        })
    }

    fn commit(&mut self, _partition: &str, file: PartitionFile) -> Result<()> {
        let tmp = file
            .inner
            .into_inner()
            .map_err(|e| e.into_error())
            .with_context(|| format!("flush {}", file.path.display()))?;
        publish(tmp, &file.path)
    }
}

/* ===================== MemorySink ===================== */

/// Keeps committed partitions in memory, keyed by partition name.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    partitions: BTreeMap<String, Vec<u8>>,
}

impl MemorySink {
    #[must_use]
    pub fn partitions(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.partitions
    }

    #[must_use]
    pub fn get(&self, partition: &str) -> Option<&[u8]> {
        self.partitions.get(partition).map(Vec::as_slice)
    }

    /// A committed partition as UTF-8 text.
    #[must_use]
    pub fn text(&self, partition: &str) -> Option<&str> {
        self.get(partition).and_then(|b| std::str::from_utf8(b).ok())
    }
}

impl PartitionSink for MemorySink {
    type Writer = Vec<u8>;

    fn open(&mut self, _partition: &str) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn commit(&mut self, partition: &str, buf: Vec<u8>) -> Result<()> {
        self.partitions.insert(partition.to_string(), buf);
        Ok(())
    }
}
