//! Pull reader over a KML cartography document.
//!
//! The reader works in two phases. While [`ReaderPhase::Seeking`] it walks the document
//! preamble (`kml`, `Document`, `Schema`, names, styles) until it enters the element that holds
//! the placemarks: the first `Folder`, or the parent of the first `Placemark` when the document
//! has no folder. Once [`ReaderPhase::Streaming`] it yields one [`RawRecord`] per `Placemark`
//! until the end of the document. Nested and sibling `Folder`/`Document` elements are descended
//! into; any other element outside a placemark is skipped whole.

use std::io::BufRead;

use quick_xml::{events::{BytesStart, Event}, name::QName, Reader};

use crate::error::ReaderError;
use super::{DataField, RawRecord};

/// Where the reader currently stands in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderPhase {
    /// Looking for the placemark container.
    Seeking,
    /// Positioned inside the container, yielding placemarks.
    Streaming,
    /// No more records will be produced.
    Exhausted,
}

/// Why the stream of records stopped.
#[derive(Debug)]
pub enum Termination {
    /// The document ended cleanly at a record boundary.
    EndOfDocument,
    /// Decoding failed after positioning. Records read so far are valid but the tail of the
    /// document may be corrupt.
    Truncated(ReaderError),
}

impl Termination {
    pub fn is_clean(&self) -> bool { matches!(self, Termination::EndOfDocument) }
}

/// Streaming placemark reader. See the module docs for the two phases.
pub struct PlacemarkReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    skip: Vec<u8>,
    phase: ReaderPhase,
    /// Set when positioning already consumed the start tag of the first placemark.
    pending: bool,
    termination: Option<Termination>,
}

enum Step {
    Placemark,
    Container,
    Enter(Vec<u8>),
    Leave,
    Eof,
    Other,
}

impl<R: BufRead> PlacemarkReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: Reader::from_reader(source),
            buf: Vec::new(),
            skip: Vec::new(),
            phase: ReaderPhase::Seeking,
            pending: false,
            termination: None,
        }
    }

    pub fn phase(&self) -> ReaderPhase { self.phase }

    /// Termination reason, available once the reader is exhausted.
    pub fn termination(&self) -> Option<&Termination> { self.termination.as_ref() }

    pub fn take_termination(&mut self) -> Option<Termination> { self.termination.take() }

    /// Byte offset of the reader in the source document.
    pub fn byte_offset(&self) -> u64 { self.reader.buffer_position() as u64 }

    /// Phase one: advance to the placemark container.
    ///
    /// Calling it again once positioned is a no-op. A failure here means the document is not a
    /// usable cartography file.
    pub fn seek_container(&mut self) -> Result<(), ReaderError> {
        if self.phase != ReaderPhase::Seeking {
            return Ok(());
        }

        loop {
            let step = match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"Placemark" => Step::Placemark,
                    b"Folder" => Step::Container,
                    _ => Step::Other,
                },
                Ok(Event::End(_)) => Step::Leave,
                Ok(Event::Eof) => Step::Eof,
                Ok(_) => Step::Other,
                Err(source) => {
                    self.phase = ReaderPhase::Exhausted;
                    return Err(xml_error(&self.reader, source));
                }
            };
            self.buf.clear();

            match step {
                Step::Placemark => {
                    self.pending = true;
                    self.phase = ReaderPhase::Streaming;
                    return Ok(());
                }
                Step::Container => {
                    self.phase = ReaderPhase::Streaming;
                    return Ok(());
                }
                Step::Eof => {
                    self.phase = ReaderPhase::Exhausted;
                    return Err(ReaderError::ContainerNotFound);
                }
                Step::Enter(_) | Step::Leave | Step::Other => {}
            }
        }
    }

    /// Phase two: read the next placemark, in document order.
    pub fn next_record(&mut self) -> Option<RawRecord> {
        match self.phase {
            ReaderPhase::Exhausted => return None,
            ReaderPhase::Seeking => {
                if let Err(err) = self.seek_container() {
                    return self.finish(Termination::Truncated(err));
                }
            }
            ReaderPhase::Streaming => {}
        }

        if std::mem::take(&mut self.pending) {
            return self.read_placemark();
        }

        loop {
            let step = match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"Placemark" => Step::Placemark,
                    b"Folder" | b"Document" | b"kml" => Step::Container,
                    _ => Step::Enter(e.name().as_ref().to_vec()),
                },
                Ok(Event::End(_)) => Step::Leave,
                Ok(Event::Eof) => Step::Eof,
                Ok(_) => Step::Other,
                Err(source) => {
                    let err = xml_error(&self.reader, source);
                    return self.finish(Termination::Truncated(err));
                }
            };
            self.buf.clear();

            match step {
                Step::Placemark => return self.read_placemark(),
                Step::Enter(name) => {
                    if let Err(source) = self.reader.read_to_end_into(QName(&name), &mut self.skip) {
                        let err = xml_error(&self.reader, source);
                        return self.finish(Termination::Truncated(err));
                    }
                    self.skip.clear();
                }
                Step::Eof => return self.finish(Termination::EndOfDocument),
                // Closing a container only moves back up a level.
                Step::Container | Step::Leave | Step::Other => {}
            }
        }
    }

    fn finish(&mut self, termination: Termination) -> Option<RawRecord> {
        self.phase = ReaderPhase::Exhausted;
        self.termination = Some(termination);
        None
    }

    fn read_placemark(&mut self) -> Option<RawRecord> {
        match self.parse_placemark() {
            Ok(record) => Some(record),
            Err(err) => self.finish(Termination::Truncated(err)),
        }
    }

    /// Read the body of a placemark whose start tag was just consumed.
    fn parse_placemark(&mut self) -> Result<RawRecord, ReaderError> {
        let mut record = RawRecord::default();
        let mut field: Option<DataField> = None;
        let mut capture: Option<String> = None;
        let mut outer_ring: Option<String> = None;
        let mut any_ring: Option<String> = None;
        let mut in_outer = 0usize;
        let mut depth = 0usize;

        loop {
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(source) => return Err(xml_error(&self.reader, source)),
            };

            match event {
                Event::Start(e) => {
                    depth += 1;
                    match e.local_name().as_ref() {
                        b"SimpleData" => field = Some(data_field(&e).map_err(|s| xml_error(&self.reader, s))?),
                        b"outerBoundaryIs" => in_outer += 1,
                        b"coordinates" => capture = Some(String::new()),
                        _ => {}
                    }
                }
                Event::Empty(e) => {
                    if e.local_name().as_ref() == b"SimpleData" {
                        record.fields.push(data_field(&e).map_err(|s| xml_error(&self.reader, s))?);
                    }
                }
                Event::Text(t) => {
                    if field.is_some() || capture.is_some() {
                        let text = t.unescape().map_err(|s| xml_error(&self.reader, s))?;
                        if let Some(f) = field.as_mut() { f.value.push_str(&text) }
                        if let Some(c) = capture.as_mut() { c.push_str(&text) }
                    }
                }
                Event::CData(c) => {
                    let text = String::from_utf8_lossy(&c);
                    if let Some(f) = field.as_mut() { f.value.push_str(&text) }
                    if let Some(c) = capture.as_mut() { c.push_str(&text) }
                }
                Event::End(e) => {
                    if depth == 0 {
                        // </Placemark>
                        break;
                    }
                    depth -= 1;
                    match e.local_name().as_ref() {
                        b"SimpleData" => record.fields.extend(field.take()),
                        b"outerBoundaryIs" => in_outer = in_outer.saturating_sub(1),
                        b"coordinates" => {
                            if let Some(text) = capture.take() {
                                if in_outer > 0 && outer_ring.is_none() {
                                    outer_ring = Some(text);
                                } else if any_ring.is_none() {
                                    any_ring = Some(text);
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Event::Eof => return Err(ReaderError::UnexpectedEof),
                _ => {}
            }
            self.buf.clear();
        }
        self.buf.clear();

        record.ring = outer_ring.or(any_ring).unwrap_or_default();
        Ok(record)
    }
}

impl<R: BufRead> Iterator for PlacemarkReader<R> {
    type Item = RawRecord;

    fn next(&mut self) -> Option<RawRecord> { self.next_record() }
}

fn xml_error<R>(reader: &Reader<R>, source: quick_xml::Error) -> ReaderError {
    ReaderError::Xml { position: reader.buffer_position() as u64, source }
}

fn data_field(e: &BytesStart<'_>) -> Result<DataField, quick_xml::Error> {
    let name = match e.try_get_attribute("name")? {
        Some(attr) => attr.unescape_value()?.into_owned(),
        None => String::new(),
    };
    Ok(DataField { name, value: String::new() })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KML: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
<Document id="root_doc">
<Schema name="manzanas" id="manzanas">
  <SimpleField name="FID" type="float"></SimpleField>
</Schema>
<Folder><name>manzanas</name>
  <Placemark>
    <Style><LineStyle><color>ff0000ff</color></LineStyle></Style>
    <ExtendedData><SchemaData schemaUrl="#manzanas">
      <SimpleData name="FID">5</SimpleData>
      <SimpleData name="REGION">Regi&#243;n Metropolitana</SimpleData>
      <SimpleData name="COMUNA"/>
    </SchemaData></ExtendedData>
    <MultiGeometry><Polygon>
      <outerBoundaryIs><LinearRing><coordinates>-70.1,-33.1 -70.2,-33.2</coordinates></LinearRing></outerBoundaryIs>
      <innerBoundaryIs><LinearRing><coordinates>9,9 8,8</coordinates></LinearRing></innerBoundaryIs>
    </Polygon></MultiGeometry>
  </Placemark>
  <Placemark>
    <ExtendedData><SchemaData schemaUrl="#manzanas">
      <SimpleData name="FID">7</SimpleData>
    </SchemaData></ExtendedData>
    <Polygon><LinearRing><coordinates>1,2</coordinates></LinearRing></Polygon>
  </Placemark>
</Folder>
</Document></kml>
"##;

    #[test]
    fn streams_placemarks_in_order() {
        let mut reader = PlacemarkReader::new(KML.as_bytes());
        assert_eq!(reader.phase(), ReaderPhase::Seeking);
        reader.seek_container().unwrap();
        assert_eq!(reader.phase(), ReaderPhase::Streaming);
        assert_eq!(reader.byte_offset() as usize, KML.find("<name>manzanas").unwrap());

        let first = reader.next().unwrap();
        assert_eq!(first.field("FID"), Some("5"));
        assert_eq!(first.field("REGION"), Some("Región Metropolitana"));
        assert_eq!(first.field("COMUNA"), Some(""));
        assert_eq!(first.ring, "-70.1,-33.1 -70.2,-33.2");

        let second = reader.next().unwrap();
        assert_eq!(second.field("FID"), Some("7"));
        // No outer boundary: fall back to the first ring of the placemark.
        assert_eq!(second.ring, "1,2");

        assert!(reader.next().is_none());
        assert_eq!(reader.phase(), ReaderPhase::Exhausted);
        assert!(reader.termination().unwrap().is_clean());
        assert!(reader.next().is_none());
    }

    #[test]
    fn placemarks_without_folder() {
        let kml = r#"<kml><Document><name>x</name>
            <Placemark><ExtendedData><SchemaData><SimpleData name="FID">1</SimpleData></SchemaData></ExtendedData></Placemark>
            <Placemark><ExtendedData><SchemaData><SimpleData name="FID">2</SimpleData></SchemaData></ExtendedData></Placemark>
        </Document></kml>"#;
        let ids: Vec<String> = PlacemarkReader::new(kml.as_bytes())
            .map(|r| r.field("FID").unwrap().to_string())
            .collect();
        assert_eq!(ids, ["1", "2"]);
    }

    fn fids<R: BufRead>(reader: PlacemarkReader<R>) -> Vec<String> {
        reader.map(|r| r.field("FID").unwrap_or_default().to_string()).collect()
    }

    #[test]
    fn descends_into_nested_folders() {
        let kml = r#"<kml><Document><Folder><name>pais</name>
            <Folder><name>r1</name>
              <Placemark><ExtendedData><SchemaData><SimpleData name="FID">5</SimpleData></SchemaData></ExtendedData></Placemark>
              <Folder><Placemark><ExtendedData><SchemaData><SimpleData name="FID">6</SimpleData></SchemaData></ExtendedData></Placemark></Folder>
            </Folder>
            <Placemark><ExtendedData><SchemaData><SimpleData name="FID">7</SimpleData></SchemaData></ExtendedData></Placemark>
        </Folder></Document></kml>"#;
        assert_eq!(fids(PlacemarkReader::new(kml.as_bytes())), ["5", "6", "7"]);
    }

    #[test]
    fn reads_sibling_folders() {
        let kml = r#"<kml><Document>
            <Folder><Placemark><ExtendedData><SchemaData><SimpleData name="FID">5</SimpleData></SchemaData></ExtendedData></Placemark></Folder>
            <Style id="s"><PolyStyle><color>7f00ff00</color></PolyStyle></Style>
            <Folder><Placemark><ExtendedData><SchemaData><SimpleData name="FID">7</SimpleData></SchemaData></ExtendedData></Placemark></Folder>
        </Document></kml>"#;
        let mut reader = PlacemarkReader::new(kml.as_bytes());
        assert_eq!(reader.by_ref().map(|r| r.field("FID").unwrap_or_default().to_string()).collect::<Vec<_>>(), ["5", "7"]);
        assert!(reader.termination().unwrap().is_clean());
    }

    #[test]
    fn missing_container_is_an_error() {
        let mut reader = PlacemarkReader::new(r#"<kml><Document><name>x</name></Document></kml>"#.as_bytes());
        assert!(matches!(reader.seek_container(), Err(ReaderError::ContainerNotFound)));
        assert_eq!(reader.phase(), ReaderPhase::Exhausted);
    }

    #[test]
    fn truncated_tail_keeps_earlier_records() {
        let kml = r#"<kml><Document><Folder>
            <Placemark><ExtendedData><SchemaData><SimpleData name="FID">1</SimpleData></SchemaData></ExtendedData></Placemark>
            <Placemark><ExtendedData><SchemaData><SimpleData name="FID">2</Simple"#;
        let mut reader = PlacemarkReader::new(kml.as_bytes());
        reader.seek_container().unwrap();
        assert_eq!(reader.next().unwrap().field("FID"), Some("1"));
        assert!(reader.next().is_none());
        assert!(matches!(reader.termination(), Some(Termination::Truncated(_))));
    }

    #[test]
    fn eof_at_record_boundary_is_clean() {
        let kml = r#"<kml><Document><Folder>
            <Placemark><ExtendedData><SchemaData><SimpleData name="FID">1</SimpleData></SchemaData></ExtendedData></Placemark>"#;
        let mut reader = PlacemarkReader::new(kml.as_bytes());
        assert_eq!(reader.by_ref().count(), 1);
        assert!(reader.termination().unwrap().is_clean());
    }
}
