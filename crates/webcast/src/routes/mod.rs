//! Client routes: one type per remote endpoint this client calls.

pub mod image_fetch;
pub mod sign_fetch;

pub use image_fetch::ImageFetchRoute;
pub use sign_fetch::{SignFetchRoute, COOKIE_HEADER, RESET_TIME_HEADER, RETRY_AFTER_HEADER};
