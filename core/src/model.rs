use rust_decimal::Decimal;
use serde::Serialize;
use time::{Date, OffsetDateTime};

pub type TicketId = u64;

/// Ids start here; the counter of an empty store sits one below.
pub const FIRST_TICKET_ID: TicketId = 1001;

/// Largest id any backend can hold; SQLite integers are signed 64-bit.
pub const MAX_TICKET_ID: TicketId = i64::MAX as TicketId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    InRepair,
    Delivered,
}

impl TicketStatus {
    pub fn as_storage(&self) -> &'static str {
        match self {
            TicketStatus::InRepair => "in_repair",
            TicketStatus::Delivered => "delivered",
        }
    }

    /// Accepts the storage token in any case and with `_`, `-` or space
    /// separators. An empty cell is the initial status.
    pub fn from_storage(s: &str) -> Option<Self> {
        let norm: String = s.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect();
        match norm.as_str() {
            "" | "inrepair" => Some(TicketStatus::InRepair),
            "delivered" => Some(TicketStatus::Delivered),
            _ => None,
        }
    }
}

/// One repair intake: device, customer, money and status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepairTicket {
    pub id: TicketId,
    pub customer_name: String,
    pub phone: String,
    pub brand: String,
    pub model: String,
    pub issue_description: String,
    pub agreed_cost: Decimal,
    pub parts_cost: Decimal,
    pub status: TicketStatus,
    /// `None` only for legacy rows that were stored without a date.
    pub created_date: Option<Date>,
    #[serde(skip)]
    pub photo: Vec<u8>,
}

impl RepairTicket {
    pub fn has_photo(&self) -> bool { !self.photo.is_empty() }

    pub fn device(&self) -> String {
        match (self.brand.trim(), self.model.trim()) {
            ("", m) => m.to_string(),
            (b, "") => b.to_string(),
            (b, m) => format!("{b} {m}"),
        }
    }
}

/// Fields captured at intake.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTicket {
    pub customer_name: String,
    pub phone: String,
    pub brand: String,
    pub model: String,
    pub issue_description: String,
    pub agreed_cost: Decimal,
    pub photo: Vec<u8>,
}

impl NewTicket {
    pub(crate) fn into_ticket(self, id: TicketId, created: Date) -> RepairTicket {
        RepairTicket {
            id,
            customer_name: self.customer_name,
            phone: self.phone,
            brand: self.brand,
            model: self.model,
            issue_description: self.issue_description,
            agreed_cost: self.agreed_cost,
            parts_cost: Decimal::ZERO,
            status: TicketStatus::InRepair,
            created_date: Some(created),
            photo: self.photo,
        }
    }
}

/// Partial edit of a ticket. `None` leaves a field as it is; an empty
/// `photo` clears the stored one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketPatch {
    pub customer_name: Option<String>,
    pub phone: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub issue_description: Option<String>,
    pub agreed_cost: Option<Decimal>,
    pub parts_cost: Option<Decimal>,
    pub status: Option<TicketStatus>,
    pub photo: Option<Vec<u8>>,
}

impl TicketPatch {
    pub fn is_empty(&self) -> bool { *self == TicketPatch::default() }

    pub fn apply_to(&self, t: &mut RepairTicket) {
        if let Some(v) = &self.customer_name { t.customer_name = v.clone(); }
        if let Some(v) = &self.phone { t.phone = v.clone(); }
        if let Some(v) = &self.brand { t.brand = v.clone(); }
        if let Some(v) = &self.model { t.model = v.clone(); }
        if let Some(v) = &self.issue_description { t.issue_description = v.clone(); }
        if let Some(v) = self.agreed_cost { t.agreed_cost = v; }
        if let Some(v) = self.parts_cost { t.parts_cost = v; }
        if let Some(v) = self.status { t.status = v; }
        if let Some(v) = &self.photo { t.photo = v.clone(); }
    }
}

/// Local calendar date, falling back to UTC when the offset is unknown.
pub fn today() -> Date {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc()).date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> RepairTicket {
        NewTicket {
            customer_name: "Salem".into(),
            phone: "0916206100".into(),
            brand: "Samsung".into(),
            model: "A52".into(),
            issue_description: "screen".into(),
            agreed_cost: dec!(40),
            photo: vec![],
        }
        .into_ticket(1001, time::macros::date!(2024-03-01))
    }

    #[test]
    fn status_tokens() {
        assert_eq!(TicketStatus::from_storage("in_repair"), Some(TicketStatus::InRepair));
        assert_eq!(TicketStatus::from_storage("InRepair"), Some(TicketStatus::InRepair));
        assert_eq!(TicketStatus::from_storage("in-repair"), Some(TicketStatus::InRepair));
        assert_eq!(TicketStatus::from_storage(" DELIVERED "), Some(TicketStatus::Delivered));
        assert_eq!(TicketStatus::from_storage(""), Some(TicketStatus::InRepair));
        assert_eq!(TicketStatus::from_storage("lost"), None);
        for s in [TicketStatus::InRepair, TicketStatus::Delivered] {
            assert_eq!(TicketStatus::from_storage(s.as_storage()), Some(s));
        }
    }

    #[test]
    fn intake_defaults() {
        let t = sample();
        assert_eq!(t.status, TicketStatus::InRepair);
        assert_eq!(t.parts_cost, Decimal::ZERO);
        assert_eq!(t.device(), "Samsung A52");
        assert!(!t.has_photo());
    }

    #[test]
    fn patch_touches_only_listed_fields() {
        let mut t = sample();
        let patch = TicketPatch { parts_cost: Some(dec!(12.5)), status: Some(TicketStatus::Delivered), ..Default::default() };
        patch.apply_to(&mut t);
        assert_eq!(t.parts_cost, dec!(12.5));
        assert_eq!(t.status, TicketStatus::Delivered);
        assert_eq!(t.customer_name, "Salem");
        assert_eq!(t.agreed_cost, dec!(40));
        assert!(TicketPatch::default().is_empty());
        assert!(!patch.is_empty());
    }

    #[test]
    fn empty_photo_patch_clears() {
        let mut t = sample();
        t.photo = vec![1, 2, 3];
        TicketPatch { photo: Some(vec![]), ..Default::default() }.apply_to(&mut t);
        assert!(!t.has_photo());
    }
}
