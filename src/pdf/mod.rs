//! PDF page cropping.
//!
//! Takes a parsed source document, wraps one page's content as a Form
//! XObject, and draws it onto a freshly created page sized to the crop
//! rectangle.

mod crop;

pub use crop::{crop_page, CropError, CropRect};
