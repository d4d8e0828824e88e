use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;

use flower_delivery::api::web::dto::SalesReportDto;
use flower_delivery::model::{SalesReportModel, ShopperId};

use super::order::ut_setup_order;

fn ut_date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

#[test]
fn compute_aggregates_orders() {
    let orders = vec![
        ut_setup_order(ShopperId::Authenticated(126), None), // 78.48
        ut_setup_order(ShopperId::Guest("sess-beef1234".to_string()), None), // 78.48
    ];
    let now = DateTime::parse_from_rfc3339("2023-11-25T08:00:00+02:00").unwrap();
    let report = SalesReportModel::compute(
        ut_date("2023-11-20"),
        ut_date("2023-11-24"),
        orders.as_slice(),
        Decimal::from(1000),
        now,
    );
    assert_eq!(report.total_orders, 2);
    assert_eq!(report.total_sales, Decimal::from_str("156.96").unwrap());
    assert_eq!(report.total_revenue, report.total_sales);
    assert_eq!(report.total_expenses, Decimal::from(1000));
    assert_eq!(report.profit, Decimal::from_str("-843.04").unwrap());
}

#[test]
fn compute_empty_range() {
    let now = DateTime::parse_from_rfc3339("2023-11-25T08:00:00+02:00").unwrap();
    let report = SalesReportModel::compute(
        ut_date("2022-01-01"),
        ut_date("2022-01-31"),
        &[],
        Decimal::from(1000),
        now,
    );
    assert_eq!(report.total_orders, 0);
    assert_eq!(report.total_sales, Decimal::ZERO);
    // a quiet period still carries the flat expense figure
    assert_eq!(report.profit, Decimal::from(-1000));
}

#[test]
fn recompute_is_idempotent() {
    let orders = vec![ut_setup_order(ShopperId::Authenticated(126), None)];
    let now = DateTime::parse_from_rfc3339("2023-11-25T08:00:00+02:00").unwrap();
    let r1 = SalesReportModel::compute(
        ut_date("2023-11-20"),
        ut_date("2023-11-24"),
        orders.as_slice(),
        Decimal::from(1000),
        now,
    );
    let r2 = SalesReportModel::compute(
        ut_date("2023-11-20"),
        ut_date("2023-11-24"),
        orders.as_slice(),
        Decimal::from(1000),
        now,
    );
    assert_eq!(r1.total_sales, r2.total_sales);
    assert_eq!(r1.profit, r2.profit);
    let dto = SalesReportDto::from(&r1);
    assert_eq!(dto.total_orders, 1);
    assert_eq!(dto.total_sales.as_str(), "78.48");
    assert_eq!(dto.start_date.as_str(), "2023-11-20");
}
