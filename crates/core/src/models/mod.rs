//! Dataset records
//!
//! Snapshots of the review platform's users, businesses and reviews. The
//! engine only ever reads them.

pub mod business;
pub mod review;
pub mod user;

pub use business::Business;
pub use review::Review;
pub use user::User;
