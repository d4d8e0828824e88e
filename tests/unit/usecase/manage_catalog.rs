use flower_delivery::api::web::dto::{ProductDto, ProductErrorReason};
use flower_delivery::repository::app_repo_product;
use flower_delivery::usecase::{
    ListProductsUsKsResult, ListProductsUseCase, SeedProductsUsKsResult, SeedProductsUseCase,
};

use crate::ut_setup_share_state;

fn ut_product_dto(id_: u64, name: &str, price: &str) -> ProductDto {
    ProductDto {
        id_,
        name: name.to_string(),
        price: price.to_string(),
        image_ref: None,
        description: None,
    }
}

#[tokio::test]
async fn seed_then_list() {
    let shr_state = ut_setup_share_state();
    let uc = SeedProductsUseCase {
        repo: app_repo_product(shr_state.datastore()).await.unwrap(),
        log_ctx: shr_state.log_context().clone(),
    };
    let data = vec![
        ut_product_dto(140, "rose bouquet", "29.99"),
        ut_product_dto(141, "tulip bouquet", "18.50"),
    ];
    let result = uc.execute(data).await;
    if let SeedProductsUsKsResult::Success(num) = result {
        assert_eq!(num, 2);
    } else {
        panic!("catalog seeding failed");
    }
    let uc = ListProductsUseCase {
        repo: app_repo_product(shr_state.datastore()).await.unwrap(),
    };
    let result = uc.execute().await;
    if let ListProductsUsKsResult::Success(mut items) = result {
        items.sort_by_key(|p| p.id_);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name.as_str(), "rose bouquet");
        assert_eq!(items[0].price.as_str(), "29.99");
        assert!(items[0].image_ref.is_none());
    } else {
        panic!("catalog listing failed");
    }
}

#[tokio::test]
async fn seed_rejects_invalid_items() {
    let shr_state = ut_setup_share_state();
    let uc = SeedProductsUseCase {
        repo: app_repo_product(shr_state.datastore()).await.unwrap(),
        log_ctx: shr_state.log_context().clone(),
    };
    let data = vec![
        ut_product_dto(140, "rose bouquet", "29.99"),
        ut_product_dto(141, "  ", "18.50"),
        ut_product_dto(142, "peony basket", "cheap"),
        ut_product_dto(143, "fern pot", "-3.00"),
    ];
    let result = uc.execute(data).await;
    let errors = if let SeedProductsUsKsResult::ValidationFailure(es) = result {
        es
    } else {
        panic!("invalid catalog items were accepted");
    };
    assert_eq!(errors.len(), 3);
    assert!(errors
        .iter()
        .any(|e| e.id_ == 141 && matches!(e.reason, ProductErrorReason::EmptyName)));
    assert!(errors
        .iter()
        .any(|e| e.id_ == 142 && matches!(e.reason, ProductErrorReason::MalformedPrice)));
    assert!(errors
        .iter()
        .any(|e| e.id_ == 143 && matches!(e.reason, ProductErrorReason::NegativePrice)));
    // nothing persisted when any item is invalid
    let uc = ListProductsUseCase {
        repo: app_repo_product(shr_state.datastore()).await.unwrap(),
    };
    if let ListProductsUsKsResult::Success(items) = uc.execute().await {
        assert!(items.is_empty());
    } else {
        panic!("catalog listing failed");
    }
}
