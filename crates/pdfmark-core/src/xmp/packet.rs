use crate::error::Result;

/// Serialized XMP packet. Only the builder creates one, and only once both
/// description blocks have been written completely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    text: String,
}

impl Packet {
    /// Rejects writer output that is not UTF-8, so [`Packet::as_str`]
    /// never has to.
    pub(crate) fn new(bytes: Vec<u8>) -> Result<Self> {
        Ok(Self {
            text: String::from_utf8(bytes)?,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.text.into_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl AsRef<[u8]> for Packet {
    fn as_ref(&self) -> &[u8] {
        self.text.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarkError;

    #[test]
    fn keeps_utf8_text() {
        let packet = Packet::new("<?xpacket begin=\"\u{feff}\"?>".as_bytes().to_vec()).unwrap();
        assert!(packet.as_str().starts_with("<?xpacket begin=\"\u{feff}\""));
        assert_eq!(packet.as_bytes().len(), packet.len());
        assert_eq!(packet.clone().into_bytes(), packet.as_bytes());
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(matches!(
            Packet::new(vec![b'<', 0xff, b'>']),
            Err(MarkError::Utf8(_))
        ));
    }
}
