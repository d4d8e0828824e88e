mod checkout;
mod manage_cart;
mod manage_catalog;
mod manage_order;
mod manage_review;
mod report;

pub use checkout::{
    CheckoutCartUseCase, CheckoutUsKsResult, RepeatOrderUsKsResult, RepeatOrderUseCase,
};
pub use manage_cart::{
    ModifyCartLinesUseCase, ModifyCartUsKsResult, RemoveCartLineUsKsResult, RemoveCartLineUseCase,
    RetrieveCartUsKsResult, RetrieveCartUseCase,
};
pub use manage_catalog::{
    ListProductsUsKsResult, ListProductsUseCase, SeedProductsUsKsResult, SeedProductsUseCase,
};
pub use manage_order::{
    PaymentNoticeUsKsResult, PaymentNoticeUseCase, RetrieveOrderHistoryUsKsResult,
    RetrieveOrderHistoryUseCase, TransitOrderStatusUsKsResult, TransitOrderStatusUseCase,
};
pub use manage_review::{
    ListProductReviewsUsKsResult, ListProductReviewsUseCase, SubmitReviewUsKsResult,
    SubmitReviewUseCase,
};
pub use report::{base_expenses_from, GenerateSalesReportUseCase, SalesReportUsKsResult};
