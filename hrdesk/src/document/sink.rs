//! Renderers that turn a document body into a file.

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
    str::FromStr,
};

use async_trait::async_trait;

use crate::{value::ResultSet, Error};

// ============================================================================
// Document Bodies
// ============================================================================

/// A letter-shaped document: heading, labelled fields, free paragraphs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Letter {
    pub title: String,
    pub fields: Vec<(String, String)>,
    pub paragraphs: Vec<String>,
}

impl Letter {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    pub fn field(mut self, label: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((label.into(), value.to_string()));
        self
    }

    pub fn paragraph(mut self, text: impl Into<String>) -> Self {
        self.paragraphs.push(text.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentBody {
    Letter(Letter),
    /// A result set with a heading, used by filter reports.
    Table { title: String, description: String, result: ResultSet },
}

// ============================================================================
// DocumentSink Trait
// ============================================================================

/// Something that can render a [`DocumentBody`] to a file.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// File extension, without the dot.
    fn extension(&self) -> &'static str;

    /// Renders `body` to `path`, creating parent directories as needed.
    async fn write(&self, path: &Path, body: &DocumentBody) -> Result<(), Error>;
}

/// Writes `bytes` next to `path` first and renames it into place, so a reader never
/// sees a half-written document.
async fn write_atomic(path: &Path, bytes: Vec<u8>) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let temp_path: PathBuf = path.with_file_name(format!(".{}.tmp", file_name));

    tokio::fs::write(&temp_path, bytes).await?;
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    log::debug!("document written to {}", path.display());
    Ok(())
}

// ============================================================================
// Plain Text
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct TextSink;

impl TextSink {
    pub fn render(body: &DocumentBody) -> String {
        let mut out = String::new();
        match body {
            DocumentBody::Letter(letter) => {
                let _ = writeln!(out, "{}", letter.title);
                let _ = writeln!(out, "{}", "=".repeat(letter.title.chars().count()));
                out.push('\n');

                let width = letter.fields.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
                for (label, value) in &letter.fields {
                    let _ = writeln!(out, "{:<width$}  {}", format!("{}:", label), value, width = width + 1);
                }

                for paragraph in &letter.paragraphs {
                    out.push('\n');
                    let _ = writeln!(out, "{}", paragraph);
                }
            }
            DocumentBody::Table { title, description, result } => {
                let _ = writeln!(out, "{}", title);
                let _ = writeln!(out, "{}", description);
                out.push('\n');
                render_table(&mut out, result);
                let _ = writeln!(out, "\n{} row(s)", result.len());
            }
        }
        out
    }
}

fn render_table(out: &mut String, result: &ResultSet) {
    let cells: Vec<Vec<String>> =
        result.rows.iter().map(|row| row.iter().map(ToString::to_string).collect()).collect();

    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |values: &[String]| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<w$}", v, w = *w))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let _ = writeln!(out, "{}", line(&result.columns).trim_end());
    let _ = writeln!(out, "{}", widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
    for row in &cells {
        let _ = writeln!(out, "{}", line(row).trim_end());
    }
}

#[async_trait]
impl DocumentSink for TextSink {
    fn extension(&self) -> &'static str {
        "txt"
    }

    async fn write(&self, path: &Path, body: &DocumentBody) -> Result<(), Error> {
        write_atomic(path, Self::render(body).into_bytes()).await
    }
}

// ============================================================================
// CSV
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSink;

impl CsvSink {
    pub fn render(body: &DocumentBody) -> Result<Vec<u8>, Error> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());

        match body {
            DocumentBody::Letter(letter) => {
                writer.write_record([letter.title.as_str()])?;
                for (label, value) in &letter.fields {
                    writer.write_record([label.as_str(), value.as_str()])?;
                }
                for paragraph in &letter.paragraphs {
                    writer.write_record([paragraph.as_str()])?;
                }
            }
            DocumentBody::Table { result, .. } => {
                writer.write_record(&result.columns)?;
                for row in &result.rows {
                    writer.write_record(row.iter().map(ToString::to_string))?;
                }
            }
        }

        writer.into_inner().map_err(|e| Error::Io(e.into_error()))
    }
}

#[async_trait]
impl DocumentSink for CsvSink {
    fn extension(&self) -> &'static str {
        "csv"
    }

    async fn write(&self, path: &Path, body: &DocumentBody) -> Result<(), Error> {
        write_atomic(path, Self::render(body)?).await
    }
}

// ============================================================================
// DocumentFormat
// ============================================================================

/// Renderer selection, e.g. from `HRDESK_DOCUMENT_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Text,
    Csv,
}

impl DocumentFormat {
    pub fn sink(&self) -> Box<dyn DocumentSink> {
        match self {
            DocumentFormat::Text => Box::new(TextSink),
            DocumentFormat::Csv => Box::new(CsvSink),
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(DocumentFormat::Text),
            "csv" => Ok(DocumentFormat::Csv),
            other => Err(Error::validation(format!("Unknown document format '{}'. Use text or csv.", other))),
        }
    }
}
