use std::result::Result as DefaultResult;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::api::web::dto::{ProductDto, ProductErrorReason};

// catalog item, immutable once created, the price recorded at
// cart-line creation is therefore always consistent with this model
pub struct ProductModel {
    pub id_: u64,
    pub name: String,
    pub price: Decimal,
    // relative path or URL to the bouquet photo, may be empty when
    // no image was uploaded for the item
    pub image_ref: String,
    pub description: String,
}

impl TryFrom<ProductDto> for ProductModel {
    type Error = ProductErrorReason;
    fn try_from(value: ProductDto) -> DefaultResult<Self, Self::Error> {
        if value.name.trim().is_empty() {
            return Err(ProductErrorReason::EmptyName);
        }
        let price = Decimal::from_str(value.price.as_str())
            .map_err(|_e| ProductErrorReason::MalformedPrice)?;
        if price.is_sign_negative() {
            return Err(ProductErrorReason::NegativePrice);
        }
        Ok(Self {
            id_: value.id_,
            name: value.name,
            price,
            image_ref: value.image_ref.unwrap_or_default(),
            description: value.description.unwrap_or_default(),
        })
    }
}

impl From<ProductModel> for ProductDto {
    fn from(value: ProductModel) -> Self {
        Self {
            id_: value.id_,
            name: value.name,
            price: value.price.to_string(),
            image_ref: if value.image_ref.is_empty() {
                None
            } else {
                Some(value.image_ref)
            },
            description: if value.description.is_empty() {
                None
            } else {
                Some(value.description)
            },
        }
    }
}
