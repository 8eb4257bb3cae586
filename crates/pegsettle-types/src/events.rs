//! Structured notifications emitted by successful state transitions.

use serde::{Deserialize, Serialize};

use crate::NegotiationId;

/// One notification: a kind plus ordered key/value attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: String,
    pub attributes: Vec<(String, String)>,
}

impl Event {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn attr(mut self, key: &str, value: impl ToString) -> Self {
        self.attributes.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn negotiation_id(&self) -> Option<NegotiationId> {
        self.attribute("negotiation_id")
            .and_then(|s| NegotiationId::from_hex(s).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_keep_insertion_order() {
        let ev = Event::new("define_zone").attr("zone_id", "0a").attr("address", "ff");
        assert_eq!(ev.attributes[0].0, "zone_id");
        assert_eq!(ev.attribute("address"), Some("ff"));
        assert_eq!(ev.attribute("missing"), None);
    }

    #[test]
    fn negotiation_id_parses_back() {
        let id = NegotiationId::from_raw(vec![1, 2, 3]);
        let ev = Event::new("change_buyer_bid").attr("negotiation_id", &id);
        assert_eq!(ev.negotiation_id(), Some(id));
    }
}
