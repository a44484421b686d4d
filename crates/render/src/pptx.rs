//! PPTX adapter: locates the first slide and rewrites its DrawingML
//! paragraphs (`<a:p>`) through [`rewrite_runs`].
//!
//! Only the slide XML is re-encoded. Every other archive entry is copied
//! raw, so masters, layouts, media and relationships survive untouched.

use std::io::{Read, Seek, Write};

use quick_xml::escape::unescape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::RenderError;
use crate::placeholders::Placeholders;
use crate::reassemble::{rewrite_runs, RunContainer};

const PARAGRAPH: &[u8] = b"a:p";
const RUN: &[u8] = b"a:r";
const TEXT: &str = "a:t";
const LINE_BREAK: &str = "a:br";

const PRESENTATION_XML: &str = "ppt/presentation.xml";
const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";

/// Copy `archive` into `out` with the first slide's placeholders
/// substituted. Returns the number of paragraphs rewritten.
pub fn render_presentation<R, W>(
    archive: &mut ZipArchive<R>,
    out: W,
    placeholders: &Placeholders,
) -> Result<usize, RenderError>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let slide_path = find_first_slide_path(archive)?;
    let slide_xml = read_zip_file(archive, &slide_path)?;
    let (rewritten_xml, paragraphs) = rewrite_slide(&slide_xml, placeholders)?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(out);

    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.name() == slide_path {
            drop(entry);
            zip.start_file(slide_path.as_str(), options)?;
            zip.write_all(rewritten_xml.as_bytes())?;
        } else {
            zip.raw_copy_file(entry)?;
        }
    }

    let mut file = zip.finish()?;
    file.flush()?;
    Ok(paragraphs)
}

/// Rewrite every paragraph of one slide. Paragraphs without a known token
/// are written back event for event.
pub fn rewrite_slide(xml: &str, placeholders: &Placeholders) -> Result<(String, usize), RenderError> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut rewritten = 0;

    loop {
        let event = reader.read_event().map_err(xml_error)?;
        let opens_paragraph =
            matches!(&event, Event::Start(e) if e.name().as_ref() == PARAGRAPH);

        match event {
            Event::Eof => break,
            event if opens_paragraph => {
                let mut events = vec![event.into_owned()];
                collect_paragraph(&mut reader, &mut events)?;

                let mut paragraph = Paragraph::index(events)?;
                if rewrite_runs(&mut paragraph, |text| placeholders.apply(text)) {
                    rewritten += 1;
                    paragraph.write_rewritten(&mut writer)?;
                } else {
                    for event in paragraph.events {
                        write_event(&mut writer, event)?;
                    }
                }
            }
            event => write_event(&mut writer, event)?,
        }
    }

    let bytes = writer.into_inner();
    let xml = String::from_utf8(bytes).map_err(|e| RenderError::Xml(e.to_string()))?;
    Ok((xml, rewritten))
}

/// Buffer events up to and including the paragraph's closing tag.
fn collect_paragraph(reader: &mut Reader<&[u8]>, events: &mut Vec<Event<'static>>) -> Result<(), RenderError> {
    loop {
        let event = reader.read_event().map_err(xml_error)?;
        match event {
            Event::Eof => return Err(RenderError::Xml("unterminated <a:p>".into())),
            Event::End(ref e) if e.name().as_ref() == PARAGRAPH => {
                events.push(event.into_owned());
                return Ok(());
            }
            event => events.push(event.into_owned()),
        }
    }
}

// ----------------------------------------------------------------------------
// Paragraph model
// ----------------------------------------------------------------------------

/// Event indices of one `<a:r>` and its `<a:t>`. For `<a:t/>` the text
/// span is a single event.
#[derive(Debug)]
struct RunSpan {
    start: usize,
    end: usize,
    text_start: usize,
    text_end: usize,
    text: String,
}

#[derive(Debug)]
struct Paragraph {
    events: Vec<Event<'static>>,
    runs: Vec<RunSpan>,
}

impl Paragraph {
    fn index(events: Vec<Event<'static>>) -> Result<Self, RenderError> {
        let mut runs = Vec::new();
        let mut run_start = None;
        let mut text_span: Option<(usize, usize)> = None;
        let mut in_text = false;
        let mut text = String::new();

        for (i, event) in events.iter().enumerate() {
            match event {
                Event::Start(e) if e.name().as_ref() == RUN => {
                    run_start = Some(i);
                    text_span = None;
                    text.clear();
                }
                Event::End(e) if e.name().as_ref() == RUN => {
                    if let (Some(start), Some((text_start, text_end))) = (run_start.take(), text_span.take()) {
                        runs.push(RunSpan {
                            start,
                            end: i,
                            text_start,
                            text_end,
                            text: std::mem::take(&mut text),
                        });
                    }
                }
                Event::Start(e) if run_start.is_some() && e.name().as_ref() == TEXT.as_bytes() => {
                    in_text = true;
                    text_span = Some((i, i));
                }
                Event::Empty(e) if run_start.is_some() && e.name().as_ref() == TEXT.as_bytes() => {
                    text_span = Some((i, i));
                }
                Event::End(e) if in_text && e.name().as_ref() == TEXT.as_bytes() => {
                    in_text = false;
                    if let Some(span) = text_span.as_mut() {
                        span.1 = i;
                    }
                }
                Event::Text(t) if in_text => text.push_str(&unescape_lossy(&String::from_utf8_lossy(t))?),
                Event::GeneralRef(r) if in_text => {
                    let reference = format!("&{};", String::from_utf8_lossy(r));
                    text.push_str(&unescape_lossy(&reference)?);
                }
                Event::CData(c) if in_text => text.push_str(&String::from_utf8_lossy(c)),
                _ => {}
            }
        }

        Ok(Self { events, runs })
    }

    /// Emit the paragraph with each run's text replaced by its current
    /// value. A run whose text holds `\n` becomes one run per line joined
    /// by `<a:br/>`, each line keeping the run's properties.
    fn write_rewritten(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), RenderError> {
        let mut runs = self.runs.iter().peekable();
        let mut i = 0;

        while i < self.events.len() {
            match runs.peek() {
                Some(run) if run.start == i => {
                    for (n, line) in run.text.split('\n').enumerate() {
                        if n > 0 {
                            write_event(writer, Event::Empty(BytesStart::new(LINE_BREAK)))?;
                        }
                        self.write_run(writer, run, line)?;
                    }
                    i = run.end + 1;
                    runs.next();
                }
                _ => {
                    write_event(writer, self.events[i].clone())?;
                    i += 1;
                }
            }
        }
        Ok(())
    }

    fn write_run(&self, writer: &mut Writer<Vec<u8>>, run: &RunSpan, text: &str) -> Result<(), RenderError> {
        for j in run.start..=run.end {
            if j == run.text_start {
                let open = match &self.events[j] {
                    Event::Start(e) | Event::Empty(e) => e.clone(),
                    _ => BytesStart::new(TEXT),
                };
                write_event(writer, Event::Start(open))?;
                if !text.is_empty() {
                    write_event(writer, Event::Text(BytesText::new(text)))?;
                }
                write_event(writer, Event::End(BytesEnd::new(TEXT)))?;
            } else if j > run.text_start && j <= run.text_end {
                continue;
            } else {
                write_event(writer, self.events[j].clone())?;
            }
        }
        Ok(())
    }
}

impl RunContainer for Paragraph {
    fn run_count(&self) -> usize {
        self.runs.len()
    }

    fn run_text(&self, index: usize) -> &str {
        &self.runs[index].text
    }

    fn set_run_text(&mut self, index: usize, text: String) {
        self.runs[index].text = text;
    }
}

// ----------------------------------------------------------------------------
// Archive navigation
// ----------------------------------------------------------------------------

/// Path of the first slide in presentation order.
///
/// Resolves the first `<p:sldId>` of `ppt/presentation.xml` through
/// `ppt/_rels/presentation.xml.rels`.
pub fn find_first_slide_path<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String, RenderError> {
    let presentation_xml = read_zip_file(archive, PRESENTATION_XML)?;
    let rid = find_first_slide_rid(&presentation_xml)?;

    let rels_xml = read_zip_file(archive, PRESENTATION_RELS)?;
    let target = find_relationship_target(&rels_xml, &rid)?;

    // Targets are relative to ppt/ unless absolute
    Ok(match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target),
    })
}

fn find_first_slide_rid(presentation_xml: &str) -> Result<String, RenderError> {
    let mut reader = Reader::from_str(presentation_xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"p:sldId" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"r:id" {
                        return Ok(String::from_utf8_lossy(&attr.value).to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
        buf.clear();
    }

    Err(RenderError::InvalidTemplate("presentation has no slides".into()))
}

fn find_relationship_target(rels_xml: &str, rid: &str) -> Result<String, RenderError> {
    let mut reader = Reader::from_str(rels_xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;

                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        b"Target" => target = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        _ => {}
                    }
                }

                if id.as_deref() == Some(rid) {
                    if let Some(t) = target {
                        return Ok(t);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
        buf.clear();
    }

    Err(RenderError::InvalidTemplate(format!("relationship '{}' not found", rid)))
}

fn read_zip_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String, RenderError> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| RenderError::InvalidTemplate(format!("'{}' not found in template: {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), RenderError> {
    writer.write_event(event).map_err(xml_error)
}

fn unescape_lossy(raw: &str) -> Result<String, RenderError> {
    unescape(raw).map(|s| s.into_owned()).map_err(xml_error)
}

fn xml_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Xml(e.to_string())
}
