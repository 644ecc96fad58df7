//! File-level processing: bytes of an image or PDF in, one extraction
//! result per page out.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::{CertxError, OcrError, PdfError, Result};
use crate::extract::{CertificateParser, ExtractionResult};
use crate::models::config::{OcrConfig, PdfConfig};
use crate::models::record::{Document, StudentRecord};
use crate::ocr::{OcrBackend, prepare_page};
use crate::pdf::{PdfExtractor, PdfPage, PdfProcessor, PdfType};

/// Accepted input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Pdf,
}

impl FileKind {
    /// Image extensions decoded with the `image` crate.
    pub const IMAGE_EXTENSIONS: [&'static str; 6] = ["png", "jpg", "jpeg", "tif", "tiff", "bmp"];

    /// Classify a file by its extension (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(FileKind::Pdf),
            e if Self::IMAGE_EXTENSIONS.contains(&e) => Ok(FileKind::Image),
            _ => Err(CertxError::UnsupportedFile(name.to_string())),
        }
    }
}

/// Turns certificate files into records.
///
/// Cheap to clone; clones share the parser and the OCR engine, so one
/// processor can feed a pool of batch workers.
#[derive(Clone)]
pub struct DocumentProcessor {
    parser: Arc<CertificateParser>,
    ocr: Option<Arc<dyn OcrBackend>>,
    ocr_config: OcrConfig,
    pdf_config: PdfConfig,
}

impl DocumentProcessor {
    /// Create a processor without an OCR engine; only PDFs with a usable
    /// text layer can be processed until [`with_ocr`](Self::with_ocr) is
    /// called.
    pub fn new(parser: CertificateParser, ocr_config: OcrConfig, pdf_config: PdfConfig) -> Self {
        Self {
            parser: Arc::new(parser),
            ocr: None,
            ocr_config,
            pdf_config,
        }
    }

    /// Attach the OCR engine used for images and scanned pages.
    pub fn with_ocr(mut self, ocr: Arc<dyn OcrBackend>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    /// Read and process one file from disk.
    pub fn process_file(&self, path: &Path) -> Result<Vec<ExtractionResult>> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        FileKind::from_name(&filename)?;
        let bytes = std::fs::read(path)?;
        self.process_bytes(&bytes, &filename)
    }

    /// Process file contents; `filename` decides the format and labels the
    /// resulting records.
    pub fn process_bytes(&self, bytes: &[u8], filename: &str) -> Result<Vec<ExtractionResult>> {
        let start = Instant::now();

        let documents = self.documents(bytes, filename)?;
        let results: Vec<ExtractionResult> = documents
            .iter()
            .map(|document| self.parser.parse(document))
            .collect();

        info!(
            "Processed {} ({} pages) in {}ms",
            filename,
            results.len(),
            start.elapsed().as_millis()
        );
        Ok(results)
    }

    /// Like [`process_bytes`](Self::process_bytes), keeping only the records.
    pub fn records(&self, bytes: &[u8], filename: &str) -> Result<Vec<StudentRecord>> {
        Ok(self
            .process_bytes(bytes, filename)?
            .into_iter()
            .map(|r| r.record)
            .collect())
    }

    /// OCR step: one [`Document`] per page.
    pub fn documents(&self, bytes: &[u8], filename: &str) -> Result<Vec<Document>> {
        match FileKind::from_name(filename)? {
            FileKind::Image => {
                let image = image::load_from_memory(bytes)?;
                let text = self.recognize(&image)?;
                Ok(vec![Document::new(text, filename)])
            }
            FileKind::Pdf => {
                let mut extractor = PdfExtractor::new();
                extractor.load(bytes)?;
                let pages = extractor.pages(self.pdf_config.max_pages)?;
                info!(
                    "{}: {:?} PDF, {} pages",
                    filename,
                    PdfType::of_pages(&pages),
                    pages.len()
                );

                pages
                    .into_iter()
                    .map(|page| {
                        let label = format!("{}_page_{}", filename, page.number);
                        Ok(Document::new(self.page_text(page)?, label))
                    })
                    .collect()
            }
        }
    }

    fn page_text(&self, page: PdfPage) -> Result<String> {
        let embedded_len = page.text.trim().chars().count();

        if self.pdf_config.prefer_embedded_text && embedded_len >= self.pdf_config.min_text_length
        {
            debug!("Page {}: using text layer ({} chars)", page.number, embedded_len);
            return Ok(page.text);
        }

        match page.image {
            Some(image) => {
                debug!("Page {}: running OCR on embedded scan", page.number);
                self.recognize(&image)
            }
            None if embedded_len > 0 => {
                debug!("Page {}: short text layer and no scan", page.number);
                Ok(page.text)
            }
            None => {
                warn!("{}", PdfError::EmptyPage(page.number));
                Ok(String::new())
            }
        }
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let ocr = self.ocr.as_ref().ok_or_else(|| OcrError::EngineUnavailable {
            engine: "none".to_string(),
            reason: "no OCR engine configured".to_string(),
        })?;

        let prepared = prepare_page(image, &self.ocr_config);
        let text = ocr.recognize(&prepared)?;
        debug!("{} recognized {} chars", ocr.name(), text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::scanned_pdf;
    use image::{GenericImageView, GrayImage, ImageFormat};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::sync::Mutex;

    /// Returns canned text and remembers the sizes of the pages it saw.
    struct FakeOcr {
        text: &'static str,
        seen: Mutex<Vec<(u32, u32)>>,
    }

    impl FakeOcr {
        fn new(text: &'static str) -> Arc<Self> {
            Arc::new(Self {
                text,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl OcrBackend for FakeOcr {
        fn name(&self) -> &str {
            "fake"
        }

        fn recognize(&self, image: &DynamicImage) -> std::result::Result<String, OcrError> {
            self.seen.lock().unwrap().push(image.dimensions());
            Ok(self.text.to_string())
        }
    }

    const SCAN_TEXT: &str = "Register No: 31337\nName: KAVYA R\nSex: Female\nDOB 02/03/2007";

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(GrayImage::new(width, height))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn processor(ocr: Arc<FakeOcr>) -> DocumentProcessor {
        DocumentProcessor::new(
            CertificateParser::new(),
            OcrConfig::default(),
            PdfConfig::default(),
        )
        .with_ocr(ocr)
    }

    #[test]
    fn test_file_kind() {
        assert_eq!(FileKind::from_name("a.PDF").unwrap(), FileKind::Pdf);
        assert_eq!(FileKind::from_name("scan.JPeG").unwrap(), FileKind::Image);
        assert_eq!(FileKind::from_name("dir/x.tiff").unwrap(), FileKind::Image);
        assert!(matches!(
            FileKind::from_name("notes.docx"),
            Err(CertxError::UnsupportedFile(_))
        ));
        assert!(FileKind::from_name("no_extension").is_err());
    }

    #[test]
    fn test_image_is_labelled_by_filename() {
        let ocr = FakeOcr::new(SCAN_TEXT);
        let records = processor(ocr.clone()).records(&png(300, 200), "kavya.png").unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, "kavya.png");
        assert_eq!(records[0].register_number, "31337");
        assert_eq!(records[0].name, "KAVYA R");
        assert_eq!(records[0].sex, "Female");
        assert_eq!(records[0].dob, "02/03/2007");

        // Narrow scans are upscaled before OCR
        assert_eq!(*ocr.seen.lock().unwrap(), vec![(600, 400)]);
    }

    #[test]
    fn test_pdf_pages_are_labelled_by_page() {
        let ocr = FakeOcr::new(SCAN_TEXT);
        let records = processor(ocr.clone()).records(&scanned_pdf(2), "batch.pdf").unwrap();

        let labels: Vec<&str> = records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(labels, vec!["batch.pdf_page_1", "batch.pdf_page_2"]);
        assert!(records.iter().all(|r| r.register_number == "31337"));
        assert_eq!(ocr.seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_max_pages() {
        let ocr = FakeOcr::new(SCAN_TEXT);
        let mut processor = processor(ocr);
        processor.pdf_config.max_pages = 1;

        assert_eq!(processor.records(&scanned_pdf(3), "x.pdf").unwrap().len(), 1);
    }

    #[test]
    fn test_image_without_ocr_engine_fails() {
        let processor = DocumentProcessor::new(
            CertificateParser::new(),
            OcrConfig::default(),
            PdfConfig::default(),
        );

        assert!(matches!(
            processor.records(&png(10, 10), "a.png"),
            Err(CertxError::Ocr(OcrError::EngineUnavailable { .. }))
        ));
    }

    #[test]
    fn test_corrupt_files_are_errors() {
        let processor = processor(FakeOcr::new(""));

        assert!(matches!(
            processor.records(b"not a png", "a.png"),
            Err(CertxError::Image(_))
        ));
        assert!(matches!(
            processor.records(b"not a pdf", "a.pdf"),
            Err(CertxError::Pdf(_))
        ));
    }

    #[test]
    fn test_blank_scan_gives_empty_record() {
        let results = processor(FakeOcr::new(""))
            .process_bytes(&png(1200, 1200), "blank.jpg")
            .unwrap();

        assert_eq!(results[0].record, StudentRecord::new("blank.jpg"));
        assert_eq!(results[0].missing.len(), 7);
    }
}
