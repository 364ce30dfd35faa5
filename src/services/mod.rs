// Core services
pub mod invoicing;
pub mod orders;
