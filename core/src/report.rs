use crate::error::{StoreError, StoreResult};
use crate::model::{RepairTicket, TicketStatus};
use rust_decimal::Decimal;
use serde::Serialize;

/// Money totals over delivered tickets. Recomputed from the table every time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FinancialReport {
    pub income: Decimal,
    pub parts_total: Decimal,
    pub net_profit: Decimal,
    pub delivered: usize,
    pub in_repair: usize,
}

/// Fails with [`StoreError::Overflow`] when a total exceeds what `Decimal` holds.
pub fn summarize(tickets: &[RepairTicket]) -> StoreResult<FinancialReport> {
    let overflow = |what: &str| StoreError::Overflow(format!("{what} total"));
    let mut r = FinancialReport::default();
    for t in tickets {
        match t.status {
            TicketStatus::Delivered => {
                r.delivered += 1;
                r.income = r.income.checked_add(t.agreed_cost).ok_or_else(|| overflow("income"))?;
                r.parts_total = r.parts_total.checked_add(t.parts_cost).ok_or_else(|| overflow("parts"))?;
            }
            TicketStatus::InRepair => r.in_repair += 1,
        }
    }
    r.net_profit = r.income.checked_sub(r.parts_total).ok_or_else(|| overflow("profit"))?;
    Ok(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn t(id: u64, status: TicketStatus, cost: Decimal, parts: Decimal) -> RepairTicket {
        RepairTicket {
            id,
            customer_name: format!("c{id}"),
            phone: String::new(),
            brand: String::new(),
            model: String::new(),
            issue_description: String::new(),
            agreed_cost: cost,
            parts_cost: parts,
            status,
            created_date: None,
            photo: vec![],
        }
    }

    #[test]
    fn delivered_only() {
        let tbl = vec![
            t(1001, TicketStatus::Delivered, dec!(100), dec!(30)),
            t(1002, TicketStatus::Delivered, dec!(50), dec!(10)),
            t(1003, TicketStatus::InRepair, dec!(999), dec!(999)),
        ];
        let r = summarize(&tbl).unwrap();
        assert_eq!(r.income, dec!(150));
        assert_eq!(r.parts_total, dec!(40));
        assert_eq!(r.net_profit, dec!(110));
        assert_eq!((r.delivered, r.in_repair), (2, 1));
    }

    #[test]
    fn empty_table_is_zero() {
        let r = summarize(&[]).unwrap();
        assert_eq!(r, FinancialReport::default());
        assert!(r.net_profit.is_zero());
    }

    #[test]
    fn loss_is_negative_profit() {
        let r = summarize(&[t(1001, TicketStatus::Delivered, dec!(20), dec!(35.5))]).unwrap();
        assert_eq!(r.net_profit, dec!(-15.5));
    }

    #[test]
    fn huge_totals_are_an_error_not_a_panic() {
        let big = Decimal::from_scientific("7e28").unwrap();
        let tbl = vec![
            t(1001, TicketStatus::Delivered, big, Decimal::ZERO),
            t(1002, TicketStatus::Delivered, big, Decimal::ZERO),
        ];
        assert!(matches!(summarize(&tbl), Err(StoreError::Overflow(_))));

        let loss = vec![t(1001, TicketStatus::Delivered, -big, big)];
        assert!(matches!(summarize(&loss), Err(StoreError::Overflow(_))));

        // one large ticket still fits
        assert_eq!(summarize(&tbl[..1]).unwrap().income, big);
    }
}
