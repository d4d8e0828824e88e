use flower_delivery::api::web::dto::ReviewCreateReqDto;
use flower_delivery::repository::{app_repo_product, app_repo_product_review};
use flower_delivery::usecase::{
    ListProductReviewsUsKsResult, ListProductReviewsUseCase, SubmitReviewUsKsResult,
    SubmitReviewUseCase,
};
use flower_delivery::AppSharedState;

use crate::ut_setup_share_state;

use super::ut_seed_catalog;

async fn ut_submit_uc(shr_state: &AppSharedState, account: u32) -> SubmitReviewUseCase {
    SubmitReviewUseCase {
        review_repo: app_repo_product_review(shr_state.datastore()).await.unwrap(),
        product_repo: app_repo_product(shr_state.datastore()).await.unwrap(),
        account,
    }
}

async fn ut_list_uc(shr_state: &AppSharedState) -> ListProductReviewsUseCase {
    ListProductReviewsUseCase {
        review_repo: app_repo_product_review(shr_state.datastore()).await.unwrap(),
        product_repo: app_repo_product(shr_state.datastore()).await.unwrap(),
    }
}

fn ut_req(rating: u8, comment: Option<&str>) -> ReviewCreateReqDto {
    ReviewCreateReqDto {
        rating,
        comment: comment.map(|c| c.to_string()),
    }
}

#[tokio::test]
async fn submit_then_list_with_average() {
    let shr_state = ut_setup_share_state();
    ut_seed_catalog(shr_state.datastore()).await;
    for (account, rating, comment) in [
        (126u32, 5u8, Some("fresh on arrival")),
        (127u32, 4u8, None),
    ] {
        let uc = ut_submit_uc(&shr_state, account).await;
        let result = uc.execute(140, ut_req(rating, comment)).await;
        assert!(matches!(result, SubmitReviewUsKsResult::Success(_)));
    }
    let uc = ut_list_uc(&shr_state).await;
    let result = uc.execute(140).await;
    let reply = if let ListProductReviewsUsKsResult::Success(r) = result {
        r
    } else {
        panic!("listing reviews failed");
    };
    assert_eq!(reply.product_id, 140);
    assert_eq!(reply.reviews.len(), 2);
    assert_eq!(reply.average_rating.as_str(), "4.50");
    assert!(reply
        .reviews
        .iter()
        .any(|r| r.comment.as_deref() == Some("fresh on arrival")));
} // end of fn submit_then_list_with_average

#[tokio::test]
async fn submit_rating_out_of_range() {
    let shr_state = ut_setup_share_state();
    ut_seed_catalog(shr_state.datastore()).await;
    let uc = ut_submit_uc(&shr_state, 126).await;
    let result = uc.execute(140, ut_req(6, None)).await;
    if let SubmitReviewUsKsResult::InvalidRating(detail) = result {
        assert!(detail.contains('6'));
    } else {
        panic!("out-of-range rating was accepted");
    }
    // nothing was recorded for the item
    let uc = ut_list_uc(&shr_state).await;
    if let ListProductReviewsUsKsResult::Success(r) = uc.execute(140).await {
        assert!(r.reviews.is_empty());
        assert_eq!(r.average_rating.as_str(), "0");
    } else {
        panic!("listing reviews failed");
    }
}

#[tokio::test]
async fn submit_unknown_product() {
    let shr_state = ut_setup_share_state();
    ut_seed_catalog(shr_state.datastore()).await;
    let uc = ut_submit_uc(&shr_state, 126).await;
    let result = uc.execute(999, ut_req(4, None)).await;
    assert!(matches!(result, SubmitReviewUsKsResult::ProductNotFound));
}

#[tokio::test]
async fn list_unknown_product() {
    let shr_state = ut_setup_share_state();
    ut_seed_catalog(shr_state.datastore()).await;
    let uc = ut_list_uc(&shr_state).await;
    let result = uc.execute(999).await;
    assert!(matches!(result, ListProductReviewsUsKsResult::ProductNotFound));
}
