use crate::model::TicketStatus;

/// Customer-facing status text. Display only; logic keys on [`TicketStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLabels {
    pub in_repair: String,
    pub delivered: String,
}

impl Default for StatusLabels {
    fn default() -> Self {
        StatusLabels { in_repair: "In repair".into(), delivered: "Delivered".into() }
    }
}

impl StatusLabels {
    pub fn label(&self, status: TicketStatus) -> &str {
        match status {
            TicketStatus::InRepair => &self.in_repair,
            TicketStatus::Delivered => &self.delivered,
        }
    }

    /// Resolve user input: a configured label or a storage token.
    pub fn parse(&self, s: &str) -> Option<TicketStatus> {
        let t = s.trim();
        if t.is_empty() { return None; }
        if t == self.in_repair.trim() { return Some(TicketStatus::InRepair); }
        if t == self.delivered.trim() { return Some(TicketStatus::Delivered); }
        TicketStatus::from_storage(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_labels() {
        let l = StatusLabels { in_repair: "تحت الصيانة".into(), delivered: "تم التسليم".into() };
        assert_eq!(l.label(TicketStatus::Delivered), "تم التسليم");
        assert_eq!(l.parse("تحت الصيانة"), Some(TicketStatus::InRepair));
        assert_eq!(l.parse("delivered"), Some(TicketStatus::Delivered));
        assert_eq!(l.parse(""), None);
        assert_eq!(l.parse("broken"), None);
    }
}
