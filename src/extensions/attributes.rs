//! Extension attributes
//!
//! An attribute in a foreign namespace on a WSDL element is an extension
//! attribute. The registry knows the lexical type of the ones it understands;
//! everything else is kept as a plain string.

use std::fmt;

use serde::Serialize;

use crate::documents::Element;
use crate::error::{Error, Result};
use crate::namespaces::QName;

/// Direction of an argument in an RPC signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArgumentDirection {
    /// `#in`
    In,
    /// `#out`
    Out,
    /// `#inout`
    InOut,
    /// `#return`
    Return,
}

impl ArgumentDirection {
    /// Parse a signature token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "#in" => Some(Self::In),
            "#out" => Some(Self::Out),
            "#inout" => Some(Self::InOut),
            "#return" => Some(Self::Return),
            _ => None,
        }
    }

    /// Token spelling
    pub fn as_token(&self) -> &'static str {
        match self {
            Self::In => "#in",
            Self::Out => "#out",
            Self::InOut => "#inout",
            Self::Return => "#return",
        }
    }
}

/// Lexical type of a registered extension attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Any string
    String,
    /// `xs:boolean`
    Boolean,
    /// `xs:anyURI`
    Uri,
    /// `xs:QName`
    QName,
    /// whitespace separated list of `xs:QName`
    QNameList,
    /// `xs:QName` or one of the listed tokens
    QNameOrToken(&'static [&'static str]),
    /// list of `xs:QName` or one of the listed tokens
    QNameListOrToken(&'static [&'static str]),
    /// `xs:int` or one of the listed tokens
    IntOrToken(&'static [&'static str]),
    /// RPC signature: pairs of QName and direction token
    Signature,
}

/// A parsed extension attribute value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExtensionAttribute {
    /// Plain string
    String(String),
    /// Boolean
    Boolean(bool),
    /// URI
    Uri(String),
    /// Qualified name
    QName(QName),
    /// List of qualified names
    QNameList(Vec<QName>),
    /// One of the allowed tokens (e.g. `#any`)
    Token(String),
    /// Integer
    Int(i64),
    /// RPC signature
    Signature(Vec<(QName, ArgumentDirection)>),
}

impl ExtensionAttribute {
    /// String content of `String`, `Uri` and `Token` values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Uri(s) | Self::Token(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean content
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// QName content
    pub fn as_qname(&self) -> Option<&QName> {
        match self {
            Self::QName(q) => Some(q),
            _ => None,
        }
    }
}

impl fmt::Display for ExtensionAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) | Self::Uri(s) | Self::Token(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::QName(q) => write!(f, "{}", q),
            Self::QNameList(list) => {
                let parts: Vec<String> = list.iter().map(|q| q.to_string()).collect();
                f.write_str(&parts.join(" "))
            }
            Self::Int(i) => write!(f, "{}", i),
            Self::Signature(pairs) => {
                let parts: Vec<String> = pairs
                    .iter()
                    .map(|(q, d)| format!("{} {}", q, d.as_token()))
                    .collect();
                f.write_str(&parts.join(" "))
            }
        }
    }
}

/// Parse an `xs:boolean`
pub fn parse_boolean(value: &str) -> Result<bool> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(Error::Other(format!("'{}' is not a boolean", other))),
    }
}

impl AttributeKind {
    /// Parse `value`, resolving QNames against the scope of `element`
    pub fn parse(&self, value: &str, element: &Element) -> Result<ExtensionAttribute> {
        let trimmed = value.trim();
        match self {
            Self::String => Ok(ExtensionAttribute::String(value.to_string())),
            Self::Boolean => parse_boolean(trimmed).map(ExtensionAttribute::Boolean),
            Self::Uri => {
                if trimmed.chars().any(char::is_whitespace) {
                    return Err(Error::Other(format!("'{}' is not a URI", trimmed)));
                }
                Ok(ExtensionAttribute::Uri(trimmed.to_string()))
            }
            Self::QName => element.resolve_qname(trimmed).map(ExtensionAttribute::QName),
            Self::QNameList => parse_qname_list(trimmed, element).map(ExtensionAttribute::QNameList),
            Self::QNameOrToken(tokens) => {
                if tokens.contains(&trimmed) {
                    Ok(ExtensionAttribute::Token(trimmed.to_string()))
                } else {
                    element.resolve_qname(trimmed).map(ExtensionAttribute::QName)
                }
            }
            Self::QNameListOrToken(tokens) => {
                if tokens.contains(&trimmed) {
                    Ok(ExtensionAttribute::Token(trimmed.to_string()))
                } else {
                    parse_qname_list(trimmed, element).map(ExtensionAttribute::QNameList)
                }
            }
            Self::IntOrToken(tokens) => {
                if tokens.contains(&trimmed) {
                    Ok(ExtensionAttribute::Token(trimmed.to_string()))
                } else {
                    trimmed
                        .parse::<i64>()
                        .map(ExtensionAttribute::Int)
                        .map_err(|_| Error::Other(format!("'{}' is not an integer", trimmed)))
                }
            }
            Self::Signature => parse_signature(trimmed, element).map(ExtensionAttribute::Signature),
        }
    }
}

fn parse_qname_list(value: &str, element: &Element) -> Result<Vec<QName>> {
    value
        .split_whitespace()
        .map(|token| element.resolve_qname(token))
        .collect()
}

fn parse_signature(value: &str, element: &Element) -> Result<Vec<(QName, ArgumentDirection)>> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    if tokens.len() % 2 != 0 {
        return Err(Error::Other(
            "signature must be a list of (QName, direction) pairs".to_string(),
        ));
    }
    tokens
        .chunks(2)
        .map(|pair| {
            let qname = element.resolve_qname(pair[0])?;
            let direction = ArgumentDirection::from_token(pair[1]).ok_or_else(|| {
                Error::Other(format!("'{}' is not a signature direction", pair[1]))
            })?;
            Ok((qname, direction))
        })
        .collect()
}
