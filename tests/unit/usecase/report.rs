use std::str::FromStr;

use chrono::Local as LocalTime;
use rust_decimal::Decimal;

use flower_delivery::api::web::dto::SalesReportReqDto;
use flower_delivery::model::ShopperId;
use flower_delivery::repository::{app_repo_order, app_repo_sales_report};
use flower_delivery::usecase::{
    base_expenses_from, GenerateSalesReportUseCase, SalesReportUsKsResult,
};
use flower_delivery::{AppReportCfg, AppSharedState};

use crate::model::order::ut_setup_order;
use crate::ut_setup_share_state;

async fn ut_report_uc(shr_state: &AppSharedState) -> GenerateSalesReportUseCase {
    GenerateSalesReportUseCase {
        order_repo: app_repo_order(shr_state.datastore()).await.unwrap(),
        report_repo: app_repo_sales_report(shr_state.datastore()).await.unwrap(),
        log_ctx: shr_state.log_context().clone(),
        base_expenses: base_expenses_from(shr_state.config().api_server.report.as_ref()),
    }
}

fn ut_today() -> String {
    LocalTime::now().format("%Y-%m-%d").to_string()
}

#[test]
fn base_expenses_resolution() {
    assert_eq!(base_expenses_from(None), Decimal::from(1000));
    let cfg = AppReportCfg {
        base_expenses: Some("2500.50".to_string()),
    };
    assert_eq!(
        base_expenses_from(Some(&cfg)),
        Decimal::from_str("2500.50").unwrap()
    );
    let broken = AppReportCfg {
        base_expenses: Some("lots".to_string()),
    };
    assert_eq!(base_expenses_from(Some(&broken)), Decimal::from(1000));
}

#[tokio::test]
async fn generate_invalid_ranges() {
    let shr_state = ut_setup_share_state();
    let uc = ut_report_uc(&shr_state).await;
    let data = SalesReportReqDto {
        start_date: "20-11-2023".to_string(),
        end_date: "2023-11-24".to_string(),
    };
    let result = uc.execute(data).await;
    if let SalesReportUsKsResult::InvalidRange(detail) = result {
        assert!(detail.contains("start_date"));
    } else {
        panic!("malformed start date was accepted");
    }
    let uc = ut_report_uc(&shr_state).await;
    let data = SalesReportReqDto {
        start_date: "2023-11-24".to_string(),
        end_date: "2023-11-20".to_string(),
    };
    let result = uc.execute(data).await;
    if let SalesReportUsKsResult::InvalidRange(detail) = result {
        assert_eq!(detail.as_str(), "start-after-end");
    } else {
        panic!("inverted range was accepted");
    }
}

#[tokio::test]
async fn generate_aggregates_todays_orders() {
    let shr_state = ut_setup_share_state();
    let order_repo = app_repo_order(shr_state.datastore()).await.unwrap();
    let now = LocalTime::now().fixed_offset();
    for owner in [
        ShopperId::Authenticated(126),
        ShopperId::Guest("sess-beef1234".to_string()),
    ] {
        let mut order = ut_setup_order(owner, None);
        order.create_time = now;
        order_repo.create(order).await.unwrap();
    }
    let uc = ut_report_uc(&shr_state).await;
    let data = SalesReportReqDto {
        start_date: ut_today(),
        end_date: ut_today(),
    };
    let result = uc.execute(data).await;
    let dto = if let SalesReportUsKsResult::Success(d) = result {
        d
    } else {
        panic!("report generation failed");
    };
    assert_eq!(dto.total_orders, 2);
    assert_eq!(dto.total_sales.as_str(), "156.96");
    assert_eq!(dto.total_revenue.as_str(), "156.96");
    assert_eq!(dto.total_expenses.as_str(), "1000");
    assert_eq!(dto.profit.as_str(), "-843.04");
    // rerun over the same range replaces the stored row, same figures
    let uc = ut_report_uc(&shr_state).await;
    let data = SalesReportReqDto {
        start_date: ut_today(),
        end_date: ut_today(),
    };
    let result = uc.execute(data).await;
    if let SalesReportUsKsResult::Success(d) = result {
        assert_eq!(d.total_orders, 2);
        assert_eq!(d.profit.as_str(), "-843.04");
    } else {
        panic!("report regeneration failed");
    }
} // end of fn generate_aggregates_todays_orders

#[tokio::test]
async fn generate_quiet_period() {
    let shr_state = ut_setup_share_state();
    let order_repo = app_repo_order(shr_state.datastore()).await.unwrap();
    let mut order = ut_setup_order(ShopperId::Authenticated(126), None);
    order.create_time = LocalTime::now().fixed_offset();
    order_repo.create(order).await.unwrap();
    let uc = ut_report_uc(&shr_state).await;
    let data = SalesReportReqDto {
        start_date: "2019-01-01".to_string(),
        end_date: "2019-01-31".to_string(),
    };
    let result = uc.execute(data).await;
    let dto = if let SalesReportUsKsResult::Success(d) = result {
        d
    } else {
        panic!("report generation failed");
    };
    assert_eq!(dto.total_orders, 0);
    assert_eq!(dto.total_sales.as_str(), "0");
    assert_eq!(dto.profit.as_str(), "-1000");
}
