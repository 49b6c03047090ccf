use crate::model::RepairTicket;

/// Case-sensitive substring match on customer name, phone or id.
pub fn matches(t: &RepairTicket, query: &str) -> bool {
    t.customer_name.contains(query) || t.phone.contains(query) || t.id.to_string().contains(query)
}

/// Tickets matching `query`, in table order. An empty query returns the whole table.
pub fn search<'a>(tickets: &'a [RepairTicket], query: &str) -> Vec<&'a RepairTicket> {
    if query.is_empty() {
        return tickets.iter().collect();
    }
    tickets.iter().filter(|t| matches(t, query)).collect()
}
