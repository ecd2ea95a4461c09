//! XMP packet serialization.
//!
//! ```text
//! <?xpacket begin="\u{feff}" id="W5M0MpCehiHzreSzNTczkc9d"?>
//! <x:xmpmeta xmlns:x="adobe:ns:meta/">
//!   <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
//!     <rdf:Description rdf:about="" xmlns:dc="…">…</rdf:Description>
//!   </rdf:RDF>
//! </x:xmpmeta>
//! (padding)
//! <?xpacket end="w"?>
//! ```

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesPI, BytesStart, BytesText, Event};

use crate::config::PacketConfig;
use crate::error::Result;
use crate::xmp::schema::{RDF_NS, XmpSchema, XmpValue};

/// Packet id every XMP packet carries.
pub const PACKET_ID: &str = "W5M0MpCehiHzreSzNTczkc9d";
const PADDING_LINE: usize = 100;

pub struct XmpWriter<W: Write> {
    writer: Writer<W>,
    padding: usize,
    writable: bool,
    about: String,
}

impl<W: Write> XmpWriter<W> {
    /// Writes the packet header and opens `x:xmpmeta` / `rdf:RDF`.
    pub fn new(inner: W, config: &PacketConfig) -> Result<Self> {
        let mut writer = if config.indent == 0 {
            Writer::new(inner)
        } else {
            Writer::new_with_indent(inner, b' ', config.indent)
        };

        writer.write_event(Event::PI(BytesPI::new(format!(
            "xpacket begin=\"\u{feff}\" id=\"{PACKET_ID}\""
        ))))?;

        let mut meta = BytesStart::new("x:xmpmeta");
        meta.push_attribute(("xmlns:x", "adobe:ns:meta/"));
        writer.write_event(Event::Start(meta))?;

        let mut rdf = BytesStart::new("rdf:RDF");
        rdf.push_attribute(("xmlns:rdf", RDF_NS));
        writer.write_event(Event::Start(rdf))?;

        Ok(Self {
            writer,
            padding: config.padding,
            writable: config.writable,
            about: config.about.clone(),
        })
    }

    pub fn add_rdf_description(&mut self, schema: &XmpSchema) -> Result<()> {
        let mut description = BytesStart::new("rdf:Description");
        description.push_attribute(("rdf:about", self.about.as_str()));
        let xmlns = format!("xmlns:{}", schema.prefix());
        description.push_attribute((xmlns.as_str(), schema.namespace()));
        self.writer.write_event(Event::Start(description))?;

        for (name, value) in schema.properties() {
            let tag = format!("{}:{name}", schema.prefix());
            match value {
                XmpValue::Text(text) => self.text_element(&tag, text)?,
                XmpValue::Bag(items) => {
                    self.writer
                        .write_event(Event::Start(BytesStart::new(tag.as_str())))?;
                    self.writer
                        .write_event(Event::Start(BytesStart::new("rdf:Bag")))?;
                    for item in items {
                        self.text_element("rdf:li", item)?;
                    }
                    self.writer
                        .write_event(Event::End(BytesEnd::new("rdf:Bag")))?;
                    self.writer
                        .write_event(Event::End(BytesEnd::new(tag.as_str())))?;
                }
            }
        }

        self.writer
            .write_event(Event::End(BytesEnd::new("rdf:Description")))?;
        Ok(())
    }

    fn text_element(&mut self, tag: &str, text: &str) -> Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new(tag)))?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }

    /// Closes the open elements, appends padding and the packet trailer,
    /// and hands back the underlying sink.
    pub fn close(mut self) -> Result<W> {
        self.writer
            .write_event(Event::End(BytesEnd::new("rdf:RDF")))?;
        self.writer
            .write_event(Event::End(BytesEnd::new("x:xmpmeta")))?;

        let mut inner = self.writer.into_inner();
        inner.write_all(b"\n")?;
        write_padding(&mut inner, self.padding)?;
        let end = if self.writable { 'w' } else { 'r' };
        write!(inner, "<?xpacket end=\"{end}\"?>")?;
        inner.flush()?;
        Ok(inner)
    }
}

/// Exactly `padding` bytes of spaces, broken into newline-terminated lines.
fn write_padding<W: Write>(out: &mut W, padding: usize) -> std::io::Result<()> {
    let line = [b' '; PADDING_LINE - 1];
    let mut remaining = padding;
    while remaining > 0 {
        let chunk = remaining.min(PADDING_LINE);
        out.write_all(&line[..chunk - 1])?;
        out.write_all(b"\n")?;
        remaining -= chunk;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarkError;
    use crate::xmp::schema::{DC_NS, dc};

    fn compact() -> PacketConfig {
        PacketConfig {
            padding: 0,
            indent: 0,
            ..Default::default()
        }
    }

    fn render(config: &PacketConfig, schemas: &[XmpSchema]) -> String {
        let mut writer = XmpWriter::new(Vec::new(), config).unwrap();
        for schema in schemas {
            writer.add_rdf_description(schema).unwrap();
        }
        String::from_utf8(writer.close().unwrap()).unwrap()
    }

    #[test]
    fn compact_packet_is_byte_exact() {
        let mut schema = XmpSchema::dublin_core();
        schema.set_list(dc::CREATOR, vec!["A".to_string(), "B & C".to_string()]);
        schema.set_property(dc::IDENTIFIER, "10.1/x");

        let expected = format!(
            "<?xpacket begin=\"\u{feff}\" id=\"{PACKET_ID}\"?>\
             <x:xmpmeta xmlns:x=\"adobe:ns:meta/\">\
             <rdf:RDF xmlns:rdf=\"{RDF_NS}\">\
             <rdf:Description rdf:about=\"\" xmlns:dc=\"{DC_NS}\">\
             <dc:creator><rdf:Bag><rdf:li>A</rdf:li><rdf:li>B &amp; C</rdf:li></rdf:Bag></dc:creator>\
             <dc:identifier>10.1/x</dc:identifier>\
             </rdf:Description>\
             </rdf:RDF>\
             </x:xmpmeta>\n\
             <?xpacket end=\"w\"?>"
        );
        assert_eq!(render(&compact(), &[schema]), expected);
    }

    #[test]
    fn read_only_packets_end_with_r() {
        let config = PacketConfig {
            writable: false,
            ..compact()
        };
        assert!(render(&config, &[]).ends_with("<?xpacket end=\"r\"?>"));
    }

    #[test]
    fn padding_has_exact_length() {
        for padding in [1, 99, 100, 101, 2048] {
            let config = PacketConfig {
                padding,
                ..compact()
            };
            let packet = render(&config, &[]);
            let body_end = packet.find("</x:xmpmeta>\n").unwrap() + "</x:xmpmeta>\n".len();
            let trailer = packet.rfind("<?xpacket end").unwrap();
            let pad = &packet[body_end..trailer];
            assert_eq!(pad.len(), padding);
            assert!(pad.bytes().all(|b| b == b' ' || b == b'\n'));
            assert!(pad.lines().all(|line| line.len() < PADDING_LINE));
        }
    }

    #[test]
    fn indented_packet_puts_blocks_on_their_own_lines() {
        let mut schema = XmpSchema::prism();
        schema.set_property("doi", "10.1/x");
        let packet = render(&PacketConfig::default(), &[schema]);
        assert!(packet.contains("\n    <rdf:Description rdf:about=\"\""));
        assert!(packet.contains("\n      <prism:doi>10.1/x</prism:doi>"));
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_errors_surface() {
        let err = XmpWriter::new(FailingSink, &compact()).err().unwrap();
        assert!(matches!(err, MarkError::Io(_) | MarkError::Xml(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
