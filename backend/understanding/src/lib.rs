//! Understanding: turning uploaded screenshots into text.

pub mod image;
pub mod ocr;

pub use image::sniff_image_mime;
pub use ocr::{MockOcrBackend, TesseractBackend, TextExtractor};
