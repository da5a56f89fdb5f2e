//! # HTTP Routes
//!
//! ```text
//! customer   GET  /                         catalog + balance
//!            POST /insert_money             one note or coin
//!            POST /purchase                 buy from the balance
//!            POST /return_change            pay out and log
//! admin      GET  /admin                    products, log, flashes
//!            POST /admin/update_product
//!            POST /admin/add_product
//!            GET  /admin/delete_product/{id}
//! system     GET  /database_info
//!            GET  /health
//! ```

pub mod admin;
pub mod customer;
pub mod system;
