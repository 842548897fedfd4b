pub mod cart_service;
pub mod notify;
pub mod order_service;
pub mod product_service;
pub mod settings_service;
pub mod stock_service;
pub mod ticket_service;
pub mod tradein_service;

/// Error type shared by all service operations
#[derive(Debug)]
pub enum ServiceError {
    Database(String),
    NotFound,
    InvalidState(String),
    Validation(String),
    Conflict(String),
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        ServiceError::Database(e.to_string())
    }
}
