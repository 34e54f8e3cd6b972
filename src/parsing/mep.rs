//! Message exchange patterns and message-label inference
//!
//! A message or fault reference without `messageLabel` gets its label from the
//! operation's pattern and its own direction. The table covers the three
//! patterns of WSDL 2.0 Part 2:
//!
//! | pattern        | `<input>` | `<output>` | `<infault>` | `<outfault>` |
//! |----------------|-----------|------------|-------------|--------------|
//! | in-only        | In        | -          | -           | -            |
//! | robust-in-only | In        | -          | -           | In           |
//! | in-out         | In        | Out        | In          | Out          |

use crate::elements::{Direction, MessageLabel};

/// `http://www.w3.org/ns/wsdl/in-only`
pub const IN_ONLY: &str = "http://www.w3.org/ns/wsdl/in-only";
/// `http://www.w3.org/ns/wsdl/robust-in-only`
pub const ROBUST_IN_ONLY: &str = "http://www.w3.org/ns/wsdl/robust-in-only";
/// `http://www.w3.org/ns/wsdl/in-out`
pub const IN_OUT: &str = "http://www.w3.org/ns/wsdl/in-out";

/// Outcome of inferring a label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelInference {
    /// The pattern determines the label
    Label(MessageLabel),
    /// The pattern has no message or fault in that direction
    NotAllowed,
    /// The pattern is not one of the Part 2 patterns
    UnknownPattern,
}

impl LabelInference {
    /// The inferred label, if any
    pub fn label(self) -> Option<MessageLabel> {
        match self {
            Self::Label(label) => Some(label),
            _ => None,
        }
    }
}

/// Label of an `<input>`/`<output>` under `pattern`
pub fn message_label(pattern: &str, direction: Direction) -> LabelInference {
    match (pattern, direction) {
        (IN_ONLY | ROBUST_IN_ONLY | IN_OUT, Direction::In) => {
            LabelInference::Label(MessageLabel::IN)
        }
        (IN_OUT, Direction::Out) => LabelInference::Label(MessageLabel::OUT),
        (IN_ONLY | ROBUST_IN_ONLY, Direction::Out) => LabelInference::NotAllowed,
        _ => LabelInference::UnknownPattern,
    }
}

/// Label of an `<infault>`/`<outfault>` under `pattern`
///
/// Under in-out a fault replaces the message flowing in its direction; under
/// robust-in-only the outbound fault answers the input.
pub fn fault_label(pattern: &str, direction: Direction) -> LabelInference {
    match (pattern, direction) {
        (IN_OUT, Direction::In) => LabelInference::Label(MessageLabel::IN),
        (IN_OUT, Direction::Out) => LabelInference::Label(MessageLabel::OUT),
        (ROBUST_IN_ONLY, Direction::Out) => LabelInference::Label(MessageLabel::IN),
        (ROBUST_IN_ONLY, Direction::In) | (IN_ONLY, _) => LabelInference::NotAllowed,
        _ => LabelInference::UnknownPattern,
    }
}

/// Check if `pattern` is one of the Part 2 patterns
pub fn is_known_pattern(pattern: &str) -> bool {
    matches!(pattern, IN_ONLY | ROBUST_IN_ONLY | IN_OUT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_out_labels() {
        assert_eq!(message_label(IN_OUT, Direction::In).label(), Some(MessageLabel::IN));
        assert_eq!(message_label(IN_OUT, Direction::Out).label(), Some(MessageLabel::OUT));
        assert_eq!(fault_label(IN_OUT, Direction::Out).label(), Some(MessageLabel::OUT));
        assert_eq!(fault_label(IN_OUT, Direction::In).label(), Some(MessageLabel::IN));
    }

    #[test]
    fn test_robust_in_only_outfault_answers_input() {
        assert_eq!(
            fault_label(ROBUST_IN_ONLY, Direction::Out),
            LabelInference::Label(MessageLabel::IN)
        );
        assert_eq!(fault_label(ROBUST_IN_ONLY, Direction::In), LabelInference::NotAllowed);
    }

    #[test]
    fn test_in_only_has_no_faults() {
        assert_eq!(message_label(IN_ONLY, Direction::In).label(), Some(MessageLabel::IN));
        assert_eq!(message_label(IN_ONLY, Direction::Out), LabelInference::NotAllowed);
        assert_eq!(fault_label(IN_ONLY, Direction::Out), LabelInference::NotAllowed);
    }

    #[test]
    fn test_unknown_pattern() {
        let pattern = "urn:example:pattern";
        assert!(!is_known_pattern(pattern));
        assert_eq!(message_label(pattern, Direction::In), LabelInference::UnknownPattern);
        assert_eq!(fault_label(pattern, Direction::Out), LabelInference::UnknownPattern);
    }
}
