pub mod cart_item;
pub mod imei;
pub mod order;
pub mod order_item;
pub mod product;
pub mod setting;
pub mod sold_device;
pub mod ticket;
pub mod trade_in;
pub mod user;

pub use product::Product;
