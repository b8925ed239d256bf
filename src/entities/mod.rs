pub mod digital_delivery;
pub mod order;
pub mod processed_payment;
pub mod product;
pub mod registration;
pub mod user_profile;
