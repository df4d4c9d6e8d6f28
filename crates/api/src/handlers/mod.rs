pub mod edit_request;
pub mod stock_count;
