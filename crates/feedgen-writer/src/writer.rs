//! Streaming feed writer with atomic publish.

use std::borrow::Cow;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::SecondsFormat;
use feedgen_core::FeedItem;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tempfile::NamedTempFile;

use crate::error::WriterError;
use crate::format::{ChannelInfo, FeedFormat, ATOM_NS, GOOGLE_NS};

const PROGRESS_EVERY: u64 = 1000;

/// Capacity of the in-memory write buffer; everything beyond it is on disk.
pub const WRITE_BUFFER_BYTES: usize = 64 * 1024;

/// Lifecycle of a [`StreamWriter`]. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Idle,
    HeaderWritten,
    ItemsWriting,
    Closed,
}

impl std::fmt::Display for WriterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WriterState::Idle => "idle",
            WriterState::HeaderWritten => "header-written",
            WriterState::ItemsWriting => "writing items",
            WriterState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Result of a successful [`StreamWriter::close`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSummary {
    pub items_written: u64,
    pub bytes_written: u64,
    pub path: PathBuf,
}

/// Byte-counting pass-through.
struct CountingWriter<W> {
    inner: W,
    bytes: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

type Sink = Writer<CountingWriter<BufWriter<NamedTempFile>>>;

/// Writes one feed document item by item.
///
/// Output goes to a temporary file next to the target. Only [`close`]
/// moves it into place, with a rename. If the writer is dropped before
/// that, or any write fails, the temporary file is deleted and the file
/// at the target path is untouched.
///
/// Nothing here grows with the number of items.
///
/// [`close`]: StreamWriter::close
pub struct StreamWriter {
    format: FeedFormat,
    target: PathBuf,
    state: WriterState,
    sink: Option<Sink>,
    items_written: u64,
}

impl StreamWriter {
    /// Opens a temporary file in the target's directory.
    ///
    /// # Errors
    ///
    /// - [`WriterError::InvalidPath`] if `target` has no file name.
    /// - [`WriterError::Io`] if the temporary file cannot be created.
    pub fn create(target: impl Into<PathBuf>, format: FeedFormat) -> Result<Self, WriterError> {
        let target = target.into();
        let file_name = target
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| WriterError::InvalidPath(target.display().to_string()))?;
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let temp = tempfile::Builder::new()
            .prefix(&format!(".{file_name}."))
            .suffix(".tmp")
            .tempfile_in(&dir)?;

        let counting = CountingWriter {
            inner: BufWriter::with_capacity(WRITE_BUFFER_BYTES, temp),
            bytes: 0,
        };

        Ok(Self {
            format,
            target,
            state: WriterState::Idle,
            sink: Some(Writer::new_with_indent(counting, b' ', 2)),
            items_written: 0,
        })
    }

    #[must_use]
    pub fn state(&self) -> WriterState {
        self.state
    }

    #[must_use]
    pub fn format(&self) -> FeedFormat {
        self.format
    }

    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    #[must_use]
    pub fn items_written(&self) -> u64 {
        self.items_written
    }

    /// Bytes produced so far, including any still in the write buffer. Zero
    /// once the writer is closed; see [`FeedSummary`] for the final count.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.sink.as_ref().map_or(0, |sink| sink.get_ref().bytes)
    }

    /// Bytes held in memory waiting to be flushed to the temporary file.
    #[must_use]
    pub fn buffered_bytes(&self) -> usize {
        self.sink
            .as_ref()
            .map_or(0, |sink| sink.get_ref().inner.buffer().len())
    }

    /// Writes the XML declaration, root element and channel metadata.
    ///
    /// # Errors
    ///
    /// [`WriterError::InvalidState`] unless the writer is idle; I/O errors
    /// close the writer and discard the temporary file.
    pub fn start(&mut self, channel: &ChannelInfo) -> Result<(), WriterError> {
        self.expect_state("start", &[WriterState::Idle])?;
        let format = self.format;
        let result = self.with_sink(|sink| write_header(sink, format, channel));
        self.finish_step(result, WriterState::HeaderWritten)?;
        tracing::info!(path = %self.target.display(), format = ?self.format, "feed started");
        Ok(())
    }

    /// Writes one complete item element.
    ///
    /// # Errors
    ///
    /// [`WriterError::InvalidState`] before `start` or after `close`; I/O
    /// errors close the writer and discard the temporary file.
    pub fn add_item(&mut self, item: &FeedItem) -> Result<(), WriterError> {
        self.expect_state(
            "add_item",
            &[WriterState::HeaderWritten, WriterState::ItemsWriting],
        )?;
        let format = self.format;
        let result = self.with_sink(|sink| write_item(sink, format, item));
        self.finish_step(result, WriterState::ItemsWriting)?;

        self.items_written += 1;
        if self.items_written.is_multiple_of(PROGRESS_EVERY) {
            tracing::info!(items = self.items_written, path = %self.target.display(), "feed progress");
        }
        Ok(())
    }

    /// Closes the document and atomically replaces the target file.
    ///
    /// # Errors
    ///
    /// [`WriterError::InvalidState`] unless the header has been written;
    /// [`WriterError::Persist`] if the rename fails. Either way the target
    /// is left as it was.
    pub fn close(&mut self) -> Result<FeedSummary, WriterError> {
        self.expect_state(
            "close",
            &[WriterState::HeaderWritten, WriterState::ItemsWriting],
        )?;
        let format = self.format;
        let result = self.with_sink(|sink| write_footer(sink, format));
        self.finish_step(result, WriterState::Closed)?;

        let Some(sink) = self.sink.take() else {
            return Err(self.invalid("close"));
        };
        let counting = sink.into_inner();
        let bytes_written = counting.bytes;
        let temp = counting
            .inner
            .into_inner()
            .map_err(|e| WriterError::Io(e.into_error()))?;
        temp.as_file().sync_all()?;
        temp.persist(&self.target).map_err(|e| WriterError::Persist {
            path: self.target.display().to_string(),
            source: e.error,
        })?;

        tracing::info!(
            items = self.items_written,
            bytes = bytes_written,
            path = %self.target.display(),
            "feed published"
        );

        Ok(FeedSummary {
            items_written: self.items_written,
            bytes_written,
            path: self.target.clone(),
        })
    }

    /// Discards the temporary file without touching the target.
    pub fn abort(mut self) {
        self.sink = None;
        self.state = WriterState::Closed;
    }

    fn expect_state(
        &self,
        operation: &'static str,
        allowed: &[WriterState],
    ) -> Result<(), WriterError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> WriterError {
        WriterError::InvalidState {
            operation,
            state: self.state,
        }
    }

    fn with_sink(
        &mut self,
        f: impl FnOnce(&mut Sink) -> Result<(), WriterError>,
    ) -> Result<(), WriterError> {
        match self.sink.as_mut() {
            Some(sink) => f(sink),
            None => Err(WriterError::InvalidState {
                operation: "write",
                state: WriterState::Closed,
            }),
        }
    }

    /// Moves to `next` on success; on failure drops the temporary file and
    /// closes the writer.
    fn finish_step(
        &mut self,
        result: Result<(), WriterError>,
        next: WriterState,
    ) -> Result<(), WriterError> {
        match result {
            Ok(()) => {
                self.state = next;
                Ok(())
            }
            Err(e) => {
                self.sink = None;
                self.state = WriterState::Closed;
                Err(e)
            }
        }
    }
}

fn write_header<W: Write>(
    sink: &mut Writer<W>,
    format: FeedFormat,
    channel: &ChannelInfo,
) -> Result<(), WriterError> {
    sink.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    match format {
        FeedFormat::Atom => {
            sink.write_event(Event::Start(
                BytesStart::new("feed")
                    .with_attributes([("xmlns", ATOM_NS), ("xmlns:g", GOOGLE_NS)]),
            ))?;
            text_element(sink, "title", &channel.title)?;
            let href = xml_safe(&channel.link);
            sink.write_event(Event::Empty(
                BytesStart::new("link").with_attributes([("rel", "self"), ("href", &*href)]),
            ))?;
            text_element(sink, "subtitle", &channel.description)?;
            text_element(
                sink,
                "updated",
                &channel.updated.to_rfc3339_opts(SecondsFormat::Secs, true),
            )?;
        }
        FeedFormat::Rss => {
            sink.write_event(Event::Start(
                BytesStart::new("rss").with_attributes([("xmlns:g", GOOGLE_NS), ("version", "2.0")]),
            ))?;
            sink.write_event(Event::Start(BytesStart::new("channel")))?;
            text_element(sink, "title", &channel.title)?;
            text_element(sink, "link", &channel.link)?;
            text_element(sink, "description", &channel.description)?;
        }
    }
    Ok(())
}

fn write_footer<W: Write>(sink: &mut Writer<W>, format: FeedFormat) -> Result<(), WriterError> {
    match format {
        FeedFormat::Atom => sink.write_event(Event::End(BytesEnd::new("feed")))?,
        FeedFormat::Rss => {
            sink.write_event(Event::End(BytesEnd::new("channel")))?;
            sink.write_event(Event::End(BytesEnd::new("rss")))?;
        }
    }
    sink.get_mut().write_all(b"\n")?;
    Ok(())
}

fn write_item<W: Write>(
    sink: &mut Writer<W>,
    format: FeedFormat,
    item: &FeedItem,
) -> Result<(), WriterError> {
    let element = format.item_element();
    sink.write_event(Event::Start(BytesStart::new(element)))?;

    field(sink, "g:id", &item.id)?;
    field(sink, "g:title", &item.title)?;
    field(sink, "g:description", &item.description)?;
    field(sink, "g:link", &item.link)?;
    field(sink, "g:image_link", &item.image_link)?;
    for url in &item.additional_image_links {
        field(sink, "g:additional_image_link", url)?;
    }
    field(sink, "g:availability", item.availability.as_str())?;
    field(sink, "g:price", &item.price.to_string())?;
    if let Some(sale) = &item.sale_price {
        field(sink, "g:sale_price", &sale.to_string())?;
    }
    field(sink, "g:brand", &item.brand)?;
    field(sink, "g:condition", &item.condition)?;
    opt_field(sink, "g:gtin", item.gtin.as_deref())?;
    opt_field(sink, "g:mpn", item.mpn.as_deref())?;
    field(sink, "g:google_product_category", &item.google_product_category)?;
    opt_field(sink, "g:product_type", item.product_type.as_deref())?;
    field(sink, "g:gender", &item.gender)?;
    field(sink, "g:age_group", &item.age_group)?;
    opt_field(sink, "g:color", item.color.as_deref())?;
    opt_field(sink, "g:size", item.size.as_deref())?;
    opt_field(sink, "g:size_system", item.size_system.as_deref())?;
    opt_field(sink, "g:material", item.material.as_deref())?;
    opt_field(sink, "g:pattern", item.pattern.as_deref())?;
    for detail in &item.product_details {
        sink.write_event(Event::Start(BytesStart::new("g:product_detail")))?;
        field(sink, "g:attribute_name", &detail.name)?;
        field(sink, "g:attribute_value", &detail.value)?;
        sink.write_event(Event::End(BytesEnd::new("g:product_detail")))?;
    }
    for highlight in &item.product_highlights {
        field(sink, "g:product_highlight", highlight)?;
    }
    opt_field(sink, "g:item_group_id", item.item_group_id.as_deref())?;
    if let Some(shipping) = &item.shipping {
        field(sink, "g:shipping", &shipping.to_string())?;
    }
    opt_field(sink, "g:status", item.status.as_deref())?;
    if let Some(inventory) = item.inventory {
        field(sink, "g:inventory", &inventory.to_string())?;
    }
    for (idx, label) in item.custom_labels.iter().enumerate() {
        if let Some(label) = label {
            field(sink, &format!("g:custom_label_{idx}"), label)?;
        }
    }
    if let Some(is_bundle) = item.is_bundle {
        field(sink, "g:is_bundle", if is_bundle { "TRUE" } else { "FALSE" })?;
    }
    if let Some(reviews) = &item.reviews {
        field(sink, "g:product_rating", &reviews.rating_str())?;
        field(sink, "g:product_review_count", &reviews.count.to_string())?;
    }
    for label in &item.internal_labels {
        field(sink, "g:internal_label", label)?;
    }
    if let Some(html) = item.rich_text_description.as_deref() {
        html_field(sink, "g:rich_text_description", html)?;
    }

    sink.write_event(Event::End(BytesEnd::new(element)))?;
    Ok(())
}

/// `<name>value</name>`, escaped. Blank values are skipped.
fn field<W: Write>(sink: &mut Writer<W>, name: &str, value: &str) -> Result<(), WriterError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    text_element(sink, name, value)
}

fn opt_field<W: Write>(
    sink: &mut Writer<W>,
    name: &str,
    value: Option<&str>,
) -> Result<(), WriterError> {
    match value {
        Some(v) => field(sink, name, v),
        None => Ok(()),
    }
}

fn text_element<W: Write>(sink: &mut Writer<W>, name: &str, value: &str) -> Result<(), WriterError> {
    sink.write_event(Event::Start(BytesStart::new(name)))?;
    sink.write_event(Event::Text(BytesText::new(&xml_safe(value))))?;
    sink.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Raw HTML as CDATA, or escaped text when it contains a CDATA terminator.
fn html_field<W: Write>(sink: &mut Writer<W>, name: &str, html: &str) -> Result<(), WriterError> {
    if html.trim().is_empty() {
        return Ok(());
    }
    if html.contains("]]>") {
        return text_element(sink, name, html);
    }
    sink.write_event(Event::Start(BytesStart::new(name)))?;
    sink.write_event(Event::CData(BytesCData::new(xml_safe(html))))?;
    sink.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Drops characters XML 1.0 does not allow anywhere in a document, such as
/// stray control characters pasted into product copy.
fn xml_safe(value: &str) -> Cow<'_, str> {
    if value.chars().all(is_xml_char) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(value.chars().filter(|&c| is_xml_char(c)).collect())
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod tests;
