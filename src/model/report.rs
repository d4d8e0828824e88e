use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;

use crate::api::web::dto::SalesReportDto;

use super::OrderModel;

// aggregate over orders created in the inclusive date range, computing
// it again over an unchanged order set yields identical figures
pub struct SalesReportModel {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_orders: u32,
    pub total_sales: Decimal,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub profit: Decimal,
    pub create_time: DateTime<FixedOffset>,
}

impl SalesReportModel {
    pub fn compute(
        start_date: NaiveDate,
        end_date: NaiveDate,
        orders: &[OrderModel],
        base_expenses: Decimal,
        now: DateTime<FixedOffset>,
    ) -> Self {
        let total_orders = orders.len() as u32;
        let total_sales = orders
            .iter()
            .map(OrderModel::total_price)
            .sum::<Decimal>();
        // revenue currently equals sales, the separate field keeps room
        // for refund adjustment later
        let total_revenue = total_sales;
        let profit = total_revenue - base_expenses;
        Self {
            start_date,
            end_date,
            total_orders,
            total_sales,
            total_revenue,
            total_expenses: base_expenses,
            profit,
            create_time: now,
        }
    }
}

impl From<&SalesReportModel> for SalesReportDto {
    fn from(value: &SalesReportModel) -> Self {
        Self {
            start_date: value.start_date.format("%Y-%m-%d").to_string(),
            end_date: value.end_date.format("%Y-%m-%d").to_string(),
            total_orders: value.total_orders,
            total_sales: value.total_sales.to_string(),
            total_revenue: value.total_revenue.to_string(),
            total_expenses: value.total_expenses.to_string(),
            profit: value.profit.to_string(),
        }
    }
}
