//! Owned XML element tree with path queries.
//!
//! Unixref documents are small, so they are read fully into memory and
//! queried by element path afterwards. Element names keep their prefix
//! (`rdf:li`), which is also how packets are read back in tests.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{MarkError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                MarkError::Parse(format!(
                    "invalid XML at byte {}: {e}",
                    reader.buffer_position()
                ))
            })?;

            match event {
                Event::Start(ref e) => stack.push(Self::from_start(e)?),
                Event::Empty(ref e) => {
                    let element = Self::from_start(e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| MarkError::Parse("unbalanced closing tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(ref e) => {
                    let text = e.unescape()?.into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::Text(text));
                    }
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::Text(text));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(MarkError::Parse(format!("unclosed element <{}>", open.name)));
        }
        root.ok_or_else(|| MarkError::Parse("document has no root element".to_string()))
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Name without namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |element| element.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children_named(name).next()
    }

    /// Every element reachable through `path` (`a/b/c`), in document order.
    pub fn find_all(&self, path: &str) -> Vec<&XmlElement> {
        let mut current = vec![self];
        for step in path.split('/').filter(|step| !step.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|element| element.children_named(step))
                .collect();
        }
        current
    }

    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        self.find_all(path).into_iter().next()
    }

    /// Descendants with the given name at any depth, depth first.
    pub fn descendants(&self, name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        for element in self.elements() {
            if element.name == name {
                found.push(element);
            }
            element.collect_descendants(name, found);
        }
    }

    /// All text below this element, with runs of whitespace collapsed.
    pub fn text(&self) -> String {
        let mut raw = String::new();
        self.collect_text(&mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(element) => element.collect_text(out),
            }
        }
    }
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(MarkError::Parse(format!(
                "second root element <{}>",
                element.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<root xmlns:dc="http://purl.org/dc/elements/1.1/">
  <!-- comment -->
  <a kind="first"><b>one</b><b>two &amp; three</b></a>
  <a kind="second"><b><![CDATA[<four>]]></b></a>
  <dc:title>  spaced
     out   </dc:title>
  <empty/>
</root>"#;

    #[test]
    fn parses_tree_and_attributes() {
        let root = XmlElement::parse(SAMPLE).unwrap();
        assert_eq!(root.name, "root");
        assert_eq!(root.attr("xmlns:dc"), Some("http://purl.org/dc/elements/1.1/"));
        assert_eq!(root.children_named("a").count(), 2);
        assert_eq!(root.child("a").unwrap().attr("kind"), Some("first"));
        assert!(root.child("empty").is_some());
    }

    #[test]
    fn find_all_walks_every_branch() {
        let root = XmlElement::parse(SAMPLE).unwrap();
        let texts: Vec<String> = root.find_all("a/b").iter().map(|b| b.text()).collect();
        assert_eq!(texts, vec!["one", "two & three", "<four>"]);
        assert!(root.find("a/c").is_none());
    }

    #[test]
    fn descendants_and_text() {
        let root = XmlElement::parse(SAMPLE).unwrap();
        assert_eq!(root.descendants("b").len(), 3);
        let title = root.child("dc:title").unwrap();
        assert_eq!(title.local_name(), "title");
        assert_eq!(title.text(), "spaced out");
    }

    #[test]
    fn inline_markup_flattens_to_text() {
        let root = XmlElement::parse(
            "<title>The <i>E. coli</i> genome\n of H<sub>2</sub>O</title>",
        )
        .unwrap();
        assert_eq!(root.text(), "The E. coli genome of H2O");
    }

    #[test]
    fn rejects_broken_documents() {
        assert!(matches!(XmlElement::parse(""), Err(MarkError::Parse(_))));
        assert!(XmlElement::parse("<a><b></a>").is_err());
        assert!(matches!(XmlElement::parse("<a>"), Err(MarkError::Parse(_))));
        assert!(matches!(XmlElement::parse("<a/><b/>"), Err(MarkError::Parse(_))));
    }
}
