//! XMP schemas: one namespace and an ordered set of properties.

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
pub const PRISM_NS: &str = "http://prismstandard.org/namespaces/basic/2.1/";

/// Dublin Core property names.
pub mod dc {
    pub const CREATOR: &str = "creator";
    pub const TITLE: &str = "title";
    pub const DATE: &str = "date";
    pub const IDENTIFIER: &str = "identifier";
}

/// PRISM 2.1 property names.
pub mod prism {
    pub const PUBLICATION_DATE: &str = "publicationDate";
    pub const DOI: &str = "doi";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmpValue {
    Text(String),
    /// Unordered container, written as `rdf:Bag`. Members keep their
    /// insertion order on write and are not deduplicated.
    Bag(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmpSchema {
    prefix: &'static str,
    namespace: &'static str,
    properties: Vec<(String, XmpValue)>,
}

impl XmpSchema {
    pub fn new(prefix: &'static str, namespace: &'static str) -> Self {
        Self {
            prefix,
            namespace,
            properties: Vec::new(),
        }
    }

    pub fn dublin_core() -> Self {
        Self::new("dc", DC_NS)
    }

    pub fn prism() -> Self {
        Self::new("prism", PRISM_NS)
    }

    pub fn prefix(&self) -> &str {
        self.prefix
    }

    pub fn namespace(&self) -> &str {
        self.namespace
    }

    /// Sets a property, replacing an earlier value under the same name but
    /// keeping its position.
    pub fn set_value(&mut self, name: &str, value: XmpValue) {
        match self.properties.iter().position(|(key, _)| key == name) {
            Some(index) => self.properties[index].1 = value,
            None => self.properties.push((name.to_string(), value)),
        }
    }

    pub fn set_property(&mut self, name: &str, value: impl Into<String>) {
        self.set_value(name, XmpValue::Text(value.into()));
    }

    /// No values leave the property unset, one value is stored as plain
    /// text, anything more becomes a bag.
    pub fn set_list(&mut self, name: &str, mut values: Vec<String>) {
        match values.len() {
            0 => {}
            1 => {
                let value = values.remove(0);
                self.set_property(name, value);
            }
            _ => self.set_value(name, XmpValue::Bag(values)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&XmpValue> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &XmpValue)> {
        self.properties
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn empty_list_is_omitted() {
        let mut schema = XmpSchema::dublin_core();
        schema.set_list(dc::CREATOR, Vec::new());
        assert!(schema.get(dc::CREATOR).is_none());
        assert!(schema.is_empty());
    }

    #[test]
    fn singleton_list_is_plain_text() {
        let mut schema = XmpSchema::dublin_core();
        schema.set_list(dc::CREATOR, strings(&["Ada Lovelace"]));
        assert_eq!(
            schema.get(dc::CREATOR),
            Some(&XmpValue::Text("Ada Lovelace".to_string()))
        );
    }

    #[test]
    fn longer_lists_become_bags_without_dedup() {
        let mut schema = XmpSchema::dublin_core();
        schema.set_list(dc::TITLE, strings(&["T1", "T2", "T1"]));
        assert_eq!(
            schema.get(dc::TITLE),
            Some(&XmpValue::Bag(strings(&["T1", "T2", "T1"])))
        );
    }

    #[test]
    fn replacing_keeps_position() {
        let mut schema = XmpSchema::prism();
        schema.set_property(prism::PUBLICATION_DATE, "2019");
        schema.set_property(prism::DOI, "10.1/x");
        schema.set_property(prism::PUBLICATION_DATE, "2020");

        let names: Vec<&str> = schema.properties().map(|(name, _)| name).collect();
        assert_eq!(names, vec![prism::PUBLICATION_DATE, prism::DOI]);
        assert_eq!(
            schema.get(prism::PUBLICATION_DATE),
            Some(&XmpValue::Text("2020".to_string()))
        );
        assert_eq!(schema.prefix(), "prism");
        assert_eq!(schema.namespace(), PRISM_NS);
    }
}
