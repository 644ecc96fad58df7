//! PDF processing module.
//!
//! Certificates arrive either as born-digital PDFs with a text layer or as
//! scans wrapped in a PDF. Each page yields its text layer and, when one is
//! present, the scan image embedded in it.

mod extractor;

pub use extractor::{PdfExtractor, PdfPage};

use crate::error::PdfError;
use image::DynamicImage;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Contains extractable text.
    Text,
    /// Contains only images (scanned document).
    Image,
    /// Contains both text and images.
    Hybrid,
    /// Empty or unreadable.
    Empty,
}

/// Text layers shorter than this, summed over all pages, count as absent.
const TEXT_PRESENCE_CHARS: usize = 50;

impl PdfType {
    /// Classify a document from its extracted pages.
    pub fn of_pages(pages: &[PdfPage]) -> Self {
        let text_len: usize = pages.iter().map(|p| p.text.trim().len()).sum();
        let has_text = text_len > TEXT_PRESENCE_CHARS;
        let has_images = pages.iter().any(|p| p.image.is_some());

        match (has_text, has_images) {
            (true, false) => PdfType::Text,
            (false, true) => PdfType::Image,
            (true, true) => PdfType::Hybrid,
            (false, false) => PdfType::Empty,
        }
    }
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Text layer of every page, in page order.
    fn extract_page_texts(&self) -> Result<Vec<String>>;

    /// Extract embedded images from a page (1-indexed).
    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>>;

    /// Text layer and first embedded image of each page, up to `max_pages`
    /// pages (0 = all).
    fn pages(&self, max_pages: usize) -> Result<Vec<PdfPage>>;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::{Document, Object, Stream, dictionary};

    /// PDF of `page_count` pages, each holding a 4x2 grayscale scan in its
    /// resources and no text layer.
    pub fn scanned_pdf(page_count: u32) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = (0..page_count)
            .map(|_| {
                let image_id = doc.add_object(Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => 4,
                        "Height" => 2,
                        "ColorSpace" => "DeviceGray",
                        "BitsPerComponent" => 8,
                    },
                    vec![200u8; 8],
                ));
                let content_id = doc.add_object(Stream::new(dictionary! {}, b"q Q".to_vec()));
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                    "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                    "Resources" => dictionary! {
                        "XObject" => dictionary! { "Im1" => image_id },
                    },
                })
                .into()
            })
            .collect();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    fn page(text: &str, with_image: bool) -> PdfPage {
        PdfPage {
            number: 1,
            text: text.to_string(),
            image: with_image.then(|| DynamicImage::ImageLuma8(GrayImage::new(2, 2))),
        }
    }

    #[test]
    fn test_pdf_type_of_pages() {
        let letter = "TRANSFER CERTIFICATE Register No: 40217 Name of Student: PRIYA";

        assert_eq!(PdfType::of_pages(&[page(letter, false)]), PdfType::Text);
        assert_eq!(PdfType::of_pages(&[page("", true)]), PdfType::Image);
        assert_eq!(
            PdfType::of_pages(&[page(letter, false), page("  ", true)]),
            PdfType::Hybrid
        );
        assert_eq!(PdfType::of_pages(&[page("short", false)]), PdfType::Empty);
        assert_eq!(PdfType::of_pages(&[]), PdfType::Empty);
    }
}
