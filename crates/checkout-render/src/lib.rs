//! # checkout-render: QR Codes and Printable Invoices
//!
//! Adapters over the image, QR and PDF libraries. Nothing here knows about
//! the database; callers hand in payload strings, image bytes or an
//! [`checkout_core::Invoice`] and get bytes back.
//!
//! ```text
//!   ExitPass::payload() ──► encode_png ──► exit_<trans_id>.png
//!   camera snapshot     ──► decode_image ──► ["8901262150101", "EXIT:..."]
//!   Invoice             ──► render_pdf ──► invoice_<trans_id>.pdf
//! ```
//!
//! Every capability has a cargo feature. With the feature off the function
//! still exists and returns an "unavailable" error; `*_available()` lets the
//! caller check up front.

pub mod error;
pub mod pdf;
pub mod qr;

pub use error::{RenderError, RenderResult};
pub use pdf::{pdf_available, render_pdf};
pub use qr::{decode_image, decoder_available, encode_png, encoder_available};
