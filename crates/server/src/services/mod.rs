//! Business logic services.
//!
//! # Services
//!
//! - `checkout` - Checkout workflow (address validation, order persistence)
//! - `uploads` - Design image uploads and design orders

pub mod checkout;
pub mod uploads;

pub use checkout::{
    AddressInput, CartItemInput, CheckoutError, CheckoutRequest, CheckoutService, CreatedOrder,
};
pub use uploads::{DataUrl, DesignUpload, UploadError, UploadService, UploadedFile};
