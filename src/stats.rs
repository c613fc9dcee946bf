//! Dashboard statistics over the three collections.

use std::fmt;
use std::str::FromStr;

use log::warn;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::model::{Customer, Motorcycle, ServiceOrder};

/// Which orders count towards revenue.
///
/// Both variants divide by the number of all orders when computing the average
/// ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenuePolicy {
    /// Every order's amount is summed, whatever its status.
    #[default]
    AllOrders,
    /// Only orders whose status is completed are summed.
    CompletedOnly,
}

impl FromStr for RevenuePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "all_orders" => Ok(Self::AllOrders),
            "completed" | "completed_only" => Ok(Self::CompletedOnly),
            other => Err(format!("unknown revenue policy: {} (expected all or completed)", other)),
        }
    }
}

impl fmt::Display for RevenuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AllOrders => "all",
            Self::CompletedOnly => "completed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub customer_count: usize,
    pub motorcycle_count: usize,
    pub order_count: usize,
    pub total_revenue: Decimal,
    pub average_ticket: Decimal,
    /// The last order in list order. Dates are not compared.
    pub most_recent_order: Option<ServiceOrder>,
    pub policy: RevenuePolicy,
}

/// Parses the decimal number at the start of `text`, ignoring what follows it
/// (`"150.5 reais"` is 150.5). Text without a leading number, or a number too
/// large to represent, is zero.
pub fn parse_amount(text: &str) -> Decimal {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end = 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut has_digits = end > int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if frac_end > frac_start {
            has_digits = true;
            end = frac_end;
        }
    }
    if !has_digits {
        return Decimal::ZERO;
    }

    let number = &s[..end];
    let normalized = match number.split_once('.') {
        Some((int, frac)) if int.trim_start_matches(['-', '+']).is_empty() => {
            format!("{}0.{}", int, frac)
        }
        _ => number.to_string(),
    };
    Decimal::from_str(&normalized).unwrap_or(Decimal::ZERO)
}

/// Formats an amount as Brazilian reais, e.g. `R$ 1.234,56`.
pub fn format_brl(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{:.2}", rounded.abs());
    let (int, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}R$ {},{}", sign, grouped, frac)
}

// A total past the representable range sticks at the bound instead of panicking.
fn saturating_add(total: Decimal, amount: Decimal) -> Decimal {
    total.checked_add(amount).unwrap_or_else(|| {
        warn!("Revenue total overflowed; clamping to the representable range");
        if amount.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

/// Computes the dashboard numbers from the current collections.
///
/// Callers recompute whenever the dashboard is shown again; nothing here caches.
pub fn compute(
    customers: &[Customer],
    motorcycles: &[Motorcycle],
    orders: &[ServiceOrder],
    policy: RevenuePolicy,
) -> Stats {
    let total_revenue = orders
        .iter()
        .filter(|o| match policy {
            RevenuePolicy::AllOrders => true,
            RevenuePolicy::CompletedOnly => o.is_completed(),
        })
        .map(|o| parse_amount(&o.amount))
        .fold(Decimal::ZERO, saturating_add);

    let average_ticket = if orders.is_empty() {
        Decimal::ZERO
    } else {
        total_revenue / Decimal::from(orders.len())
    };

    Stats {
        customer_count: customers.len(),
        motorcycle_count: motorcycles.len(),
        order_count: orders.len(),
        total_revenue,
        average_ticket,
        most_recent_order: orders.last().cloned(),
        policy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ServiceStatus;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn orders() -> Vec<ServiceOrder> {
        vec![
            ServiceOrder {
                date: "31/12/2024".into(),
                ..ServiceOrder::with_amount("100.00")
            },
            ServiceOrder::with_amount("abc"),
            ServiceOrder {
                date: "01/01/2020".into(),
                description: "third".into(),
                ..ServiceOrder::with_amount("50.00")
            },
        ]
    }

    #[test]
    fn test_sum_all_policy() {
        let stats = compute(&[], &[], &orders(), RevenuePolicy::AllOrders);
        assert_eq!(stats.order_count, 3);
        assert_eq!(stats.total_revenue, dec("150.00"));
        assert_eq!(stats.average_ticket, dec("50"));
        assert_eq!(stats.most_recent_order.unwrap().description, "third");
    }

    #[test]
    fn test_completed_only_policy() {
        let mut orders = orders();
        orders[2].status = Some(ServiceStatus::Completed);
        orders[0].status = Some(ServiceStatus::Pending);

        let stats = compute(&[], &[], &orders, RevenuePolicy::CompletedOnly);
        assert_eq!(stats.total_revenue, dec("50.00"));
        // still averaged over every order
        assert_eq!(stats.average_ticket.round_dp(2), dec("16.67"));
    }

    #[test]
    fn test_revenue_overflow_saturates() {
        let huge = "50000000000000000000000000000";
        let orders = vec![ServiceOrder::with_amount(huge), ServiceOrder::with_amount(huge)];
        let stats = compute(&[], &[], &orders, RevenuePolicy::AllOrders);
        assert_eq!(stats.total_revenue, Decimal::MAX);
        assert_eq!(stats.average_ticket, Decimal::MAX / Decimal::from(2));

        let orders = vec![
            ServiceOrder::with_amount(&format!("-{}", huge)),
            ServiceOrder::with_amount(&format!("-{}", huge)),
            ServiceOrder::with_amount("10"),
        ];
        let stats = compute(&[], &[], &orders, RevenuePolicy::AllOrders);
        assert_eq!(stats.total_revenue, Decimal::MIN + Decimal::from(10));
    }

    #[test]
    fn test_empty_collections() {
        let stats = compute(&[], &[], &[], RevenuePolicy::default());
        assert_eq!(stats.total_revenue, Decimal::ZERO);
        assert_eq!(stats.average_ticket, Decimal::ZERO);
        assert!(stats.most_recent_order.is_none());
    }

    #[test]
    fn test_counts() {
        let customers = vec![Customer::named("A"), Customer::named("B")];
        let motos = vec![Motorcycle::default()];
        let stats = compute(&customers, &motos, &[], RevenuePolicy::AllOrders);
        assert_eq!(stats.customer_count, 2);
        assert_eq!(stats.motorcycle_count, 1);
    }

    #[test]
    fn test_parse_amount_is_lenient() {
        assert_eq!(parse_amount("100.00"), dec("100.00"));
        assert_eq!(parse_amount("  42"), dec("42"));
        assert_eq!(parse_amount("150.5 reais"), dec("150.5"));
        assert_eq!(parse_amount(".5"), dec("0.5"));
        assert_eq!(parse_amount("-3.25"), dec("-3.25"));
        assert_eq!(parse_amount("12."), dec("12"));
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("."), Decimal::ZERO);
        assert_eq!(parse_amount("-"), Decimal::ZERO);
        // comma is not a decimal separator here
        assert_eq!(parse_amount("150,50"), dec("150"));
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(dec("1234.5")), "R$ 1.234,50");
        assert_eq!(format_brl(dec("0")), "R$ 0,00");
        assert_eq!(format_brl(dec("999")), "R$ 999,00");
        assert_eq!(format_brl(dec("1000000")), "R$ 1.000.000,00");
        assert_eq!(format_brl(dec("-12.345")), "-R$ 12,35");
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("all".parse::<RevenuePolicy>().unwrap(), RevenuePolicy::AllOrders);
        assert_eq!(
            "Completed".parse::<RevenuePolicy>().unwrap(),
            RevenuePolicy::CompletedOnly
        );
        assert!("some".parse::<RevenuePolicy>().is_err());
    }
}
