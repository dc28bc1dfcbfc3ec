//! Order Timeline Builder: lead time, deadline delay and on-time flag per order.

use crate::kpi::stats::days_between;
use crate::types::{Order, OrderTimelineRecord};

/// One record per order, in input order.
pub fn build_order_timeline(orders: &[Order]) -> Vec<OrderTimelineRecord> {
    orders.iter().map(timeline_record).collect()
}

fn timeline_record(order: &Order) -> OrderTimelineRecord {
    let delay_days = days_between(order.deadline, order.real_finish_date);

    OrderTimelineRecord {
        order_id: order.order_id.clone(),
        article_code: order.article_code.clone(),
        product_family: order.product_family.clone(),
        quantity: order.quantity,
        priority: order.priority,
        order_status: order.order_status,
        insert_date: order.insert_date,
        start_date: order.start_date,
        deadline: order.deadline,
        real_finish_date: order.real_finish_date,
        lead_time_days: days_between(order.insert_date, order.real_finish_date),
        delay_days,
        on_time: delay_days.map(|d| d <= 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::Timestamp;
    use chrono::{Local, TimeDelta, TimeZone};

    fn t0() -> Timestamp {
        Local.timestamp_millis_opt(1_700_000_000_000).single().unwrap()
    }

    fn order(deadline: Option<TimeDelta>, finish: Option<TimeDelta>) -> Order {
        let t0 = t0();
        Order {
            order_id: "ORD".to_string(),
            article_code: "ART-9".to_string(),
            product_family: "valves".to_string(),
            quantity: 3,
            priority: 2,
            order_status: 4,
            insert_date: Some(t0),
            deadline: deadline.map(|d| t0 + d),
            real_finish_date: finish.map(|f| t0 + f),
            ..Default::default()
        }
    }

    #[test]
    fn test_late_order() {
        let r = &build_order_timeline(&[order(Some(TimeDelta::days(2)), Some(TimeDelta::days(5)))])[0];
        assert_eq!(r.lead_time_days, Some(5));
        assert_eq!(r.delay_days, Some(3));
        assert_eq!(r.on_time, Some(false));
        assert_eq!(r.article_code, "ART-9");
        assert_eq!(r.quantity, 3);
    }

    #[test]
    fn test_early_finish_is_on_time() {
        // Finished 1 hour before the deadline: floor gives -1 day
        let r = &build_order_timeline(&[order(
            Some(TimeDelta::days(3)),
            Some(TimeDelta::days(3) - TimeDelta::hours(1)),
        )])[0];
        assert_eq!(r.delay_days, Some(-1));
        assert_eq!(r.on_time, Some(true));
        assert_eq!(r.lead_time_days, Some(2));
    }

    #[test]
    fn test_same_day_late_still_on_time() {
        let r = &build_order_timeline(&[order(
            Some(TimeDelta::days(1)),
            Some(TimeDelta::days(1) + TimeDelta::hours(5)),
        )])[0];
        assert_eq!(r.delay_days, Some(0));
        assert_eq!(r.on_time, Some(true));
    }

    #[test]
    fn test_missing_inputs_null() {
        let r = &build_order_timeline(&[order(None, Some(TimeDelta::days(1)))])[0];
        assert_eq!(r.lead_time_days, Some(1));
        assert_eq!(r.delay_days, None);
        assert_eq!(r.on_time, None);

        let r = &build_order_timeline(&[order(Some(TimeDelta::days(1)), None)])[0];
        assert_eq!(r.lead_time_days, None);
        assert_eq!(r.delay_days, None);
        assert_eq!(r.on_time, None);
    }

    #[test]
    fn test_empty_orders() {
        assert!(build_order_timeline(&[]).is_empty());
    }
}
