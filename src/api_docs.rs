use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::products::list_products,
        api::imei_check::check_imei,
        // Add other endpoints here as we document them
    ),
    tags(
        (name = "phoneshop", description = "PhoneShop API")
    )
)]
pub struct ApiDoc;
