use flower_delivery::api::web::dto::{CartLineReqDto, CartModifyReqDto};
use flower_delivery::model::ShopperId;
use flower_delivery::repository::{app_repo_cart, app_repo_product};
use flower_delivery::usecase::{
    ModifyCartLinesUseCase, ModifyCartUsKsResult, RemoveCartLineUseCase, RemoveCartLineUsKsResult,
    RetrieveCartUseCase, RetrieveCartUsKsResult,
};

use crate::ut_setup_share_state;

use super::ut_seed_catalog;

fn ut_req(lines: Vec<(u64, u32)>) -> CartModifyReqDto {
    CartModifyReqDto {
        lines: lines
            .into_iter()
            .map(|(product_id, quantity)| CartLineReqDto {
                product_id,
                quantity,
            })
            .collect(),
    }
}

async fn ut_modify_uc(
    shr_state: &flower_delivery::AppSharedState,
    shopper: ShopperId,
) -> ModifyCartLinesUseCase {
    ModifyCartLinesUseCase {
        cart_repo: app_repo_cart(shr_state.datastore()).await.unwrap(),
        product_repo: app_repo_product(shr_state.datastore()).await.unwrap(),
        log_ctx: shr_state.log_context().clone(),
        shopper,
    }
}

#[tokio::test]
async fn retrieve_starts_empty() {
    let shr_state = ut_setup_share_state();
    let uc = RetrieveCartUseCase {
        repo: app_repo_cart(shr_state.datastore()).await.unwrap(),
        shopper: ShopperId::Authenticated(126),
    };
    let result = uc.execute().await;
    if let RetrieveCartUsKsResult::Success(dto) = result {
        assert!(dto.lines.is_empty());
        assert_eq!(dto.total_items, 0);
        assert_eq!(dto.total_price.as_str(), "0");
    } else {
        panic!("cart retrieval failed");
    }
}

#[tokio::test]
async fn modify_lines_merge_quantities() {
    let shr_state = ut_setup_share_state();
    ut_seed_catalog(shr_state.datastore()).await;
    let shopper = ShopperId::Authenticated(126);
    let uc = ut_modify_uc(&shr_state, shopper.clone()).await;
    let result = uc.execute(ut_req(vec![(140, 2), (141, 1)])).await;
    if let ModifyCartUsKsResult::Success(dto) = result {
        assert_eq!(dto.lines.len(), 2);
        assert_eq!(dto.total_items, 3);
        assert_eq!(dto.total_price.as_str(), "78.48");
    } else {
        panic!("first cart write failed");
    }
    // the same product again merges into the existing line
    let uc = ut_modify_uc(&shr_state, shopper).await;
    let result = uc.execute(ut_req(vec![(140, 3), (142, 0)])).await;
    if let ModifyCartUsKsResult::Success(dto) = result {
        assert_eq!(dto.lines.len(), 2); // zero-quantity line skipped
        let line = dto.lines.iter().find(|l| l.product_id == 140).unwrap();
        assert_eq!(line.quantity, 5);
        assert_eq!(line.amount.as_str(), "149.95");
    } else {
        panic!("second cart write failed");
    }
}

#[tokio::test]
async fn modify_lines_unknown_products() {
    let shr_state = ut_setup_share_state();
    ut_seed_catalog(shr_state.datastore()).await;
    let uc = ut_modify_uc(&shr_state, ShopperId::Authenticated(126)).await;
    let result = uc.execute(ut_req(vec![(140, 1), (998, 1), (999, 2)])).await;
    if let ModifyCartUsKsResult::ProductNotFound(mut missing) = result {
        missing.sort();
        assert_eq!(missing, vec![998, 999]);
    } else {
        panic!("unknown products were accepted");
    }
}

#[tokio::test]
async fn modify_lines_exceeding_limit() {
    let shr_state = ut_setup_share_state();
    let uc = ut_modify_uc(&shr_state, ShopperId::Authenticated(126)).await;
    let lines = (0u64..201).map(|i| (1000 + i, 1u32)).collect::<Vec<_>>();
    let result = uc.execute(ut_req(lines)).await;
    if let ModifyCartUsKsResult::ExceedingLimit(num) = result {
        assert_eq!(num, 201);
    } else {
        panic!("oversized request was accepted");
    }
}

#[tokio::test]
async fn remove_line_then_absent() {
    let shr_state = ut_setup_share_state();
    ut_seed_catalog(shr_state.datastore()).await;
    let shopper = ShopperId::Guest("sess-beef1234".to_string());
    let uc = ut_modify_uc(&shr_state, shopper.clone()).await;
    let _result = uc.execute(ut_req(vec![(140, 2), (141, 1)])).await;
    let uc = RemoveCartLineUseCase {
        repo: app_repo_cart(shr_state.datastore()).await.unwrap(),
        shopper: shopper.clone(),
    };
    let result = uc.execute(140).await;
    if let RemoveCartLineUsKsResult::Success(dto) = result {
        assert_eq!(dto.lines.len(), 1);
        assert_eq!(dto.lines[0].product_id, 141);
    } else {
        panic!("line removal failed");
    }
    let uc = RemoveCartLineUseCase {
        repo: app_repo_cart(shr_state.datastore()).await.unwrap(),
        shopper,
    };
    let result = uc.execute(140).await;
    assert!(matches!(result, RemoveCartLineUsKsResult::NotFound));
}
