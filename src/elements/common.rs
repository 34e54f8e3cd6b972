//! Pieces shared by several WSDL elements

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::documents::Element;
use crate::namespaces::QName;

/// `<documentation>` child, kept as an XML subtree
#[derive(Debug, Clone)]
pub struct Documentation {
    /// The documentation element itself
    pub content: Element,
}

impl Documentation {
    /// Text content, if any
    pub fn text(&self) -> Option<&str> {
        self.content.text.as_deref()
    }
}

/// Direction of a message or fault reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// `<input>` or `<infault>`
    In,
    /// `<output>` or `<outfault>`
    Out,
}

impl Direction {
    /// Name used in diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message label of a message or fault reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MessageLabel(Cow<'static, str>);

impl MessageLabel {
    /// The `In` placeholder of the Part 2 patterns
    pub const IN: MessageLabel = MessageLabel(Cow::Borrowed("In"));
    /// The `Out` placeholder of the Part 2 patterns
    pub const OUT: MessageLabel = MessageLabel(Cow::Borrowed("Out"));

    /// Wrap a label
    pub fn new(label: impl Into<String>) -> Self {
        Self(Cow::Owned(label.into()))
    }

    /// The label as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value of the `element` attribute on messages and interface faults
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ElementReference {
    /// `#any`: any single element
    Any,
    /// `#none`: empty content
    None,
    /// `#other`: content described by another type system
    Other,
    /// A global element declaration
    Element(QName),
}

impl ElementReference {
    /// Parse the tokens; anything else is a QName and `None` is returned
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "#any" => Some(Self::Any),
            "#none" => Some(Self::None),
            "#other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Message content model of the reference (`#any`, `#none`, `#other` or `#element`)
    pub fn content_model(&self) -> &'static str {
        match self {
            Self::Any => "#any",
            Self::None => "#none",
            Self::Other => "#other",
            Self::Element(_) => "#element",
        }
    }

    /// Declaration name, for `Element`
    pub fn qname(&self) -> Option<&QName> {
        match self {
            Self::Element(q) => Some(q),
            _ => None,
        }
    }
}

impl fmt::Display for ElementReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(q) => write!(f, "{}", q),
            other => f.write_str(other.content_model()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_label_constants() {
        assert_eq!(MessageLabel::IN, MessageLabel::new("In"));
        assert_ne!(MessageLabel::IN, MessageLabel::OUT);
        assert_eq!(MessageLabel::OUT.to_string(), "Out");
    }

    #[test]
    fn test_element_reference_tokens() {
        assert_eq!(ElementReference::from_token("#any"), Some(ElementReference::Any));
        assert_eq!(ElementReference::from_token(" #none "), Some(ElementReference::None));
        assert_eq!(ElementReference::from_token("tns:Foo"), None);
        let el = ElementReference::Element(QName::namespaced("urn:x", "Foo"));
        assert_eq!(el.content_model(), "#element");
        assert_eq!(el.to_string(), "{urn:x}Foo");
    }
}
