//! In-process OCR using `pure-onnx-ocr` (PaddleOCR models, no external
//! ONNX Runtime).

use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use pure_onnx_ocr::engine::{OcrEngine, OcrEngineBuilder};
use tracing::{debug, info};

use crate::error::OcrError;

use super::OcrBackend;

/// Boxes whose top edges fall in the same band of this many pixels are
/// read as one line.
const LINE_BAND_PX: f64 = 20.0;

/// Placeholder the recognizer emits for characters outside its dictionary.
const UNKNOWN_TOKEN: &str = "[UNK]";

const ENGINE: &str = "onnx";

/// A page to recognize and where to send its text.
type Job = (DynamicImage, mpsc::Sender<Result<String, OcrError>>);

/// OCR engine backed by `pure-onnx-ocr`.
///
/// The underlying engine is neither `Send` nor `Sync`, so it lives on a
/// dedicated worker thread for its whole life. Pages are sent to that
/// thread and recognized one at a time; the thread stops when the
/// `OnnxEngine` is dropped.
pub struct OnnxEngine {
    jobs: mpsc::Sender<Job>,
}

/// One recognized box: top-left corner and text.
struct Word {
    x: f64,
    y: f64,
    text: String,
}

impl OnnxEngine {
    /// Load `det.onnx`, `latin_rec.onnx` and `latin_dict.txt` from `model_dir`.
    pub fn from_dir(model_dir: &Path, strip_unknown_tokens: bool) -> Result<Self, OcrError> {
        let det_path = model_dir.join("det.onnx");
        let rec_path = model_dir.join("latin_rec.onnx");
        let dict_path = model_dir.join("latin_dict.txt");

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.is_file() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        let (ready_tx, ready_rx) = mpsc::channel();
        let (jobs_tx, jobs_rx) = mpsc::channel::<Job>();

        thread::Builder::new()
            .name("onnx-ocr".to_string())
            .spawn(move || {
                let engine = match build_engine(&det_path, &rec_path, &dict_path) {
                    Ok(engine) => engine,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                for (image, reply) in jobs_rx {
                    let _ = reply.send(recognize_page(&engine, &image, strip_unknown_tokens));
                }
                debug!("pure-onnx-ocr worker stopped");
            })
            .map_err(|e| OcrError::ModelLoad(format!("cannot start OCR worker: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(OcrError::ModelLoad(
                    "OCR worker exited while loading models".to_string(),
                ));
            }
        }

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self { jobs: jobs_tx })
    }
}

impl OcrBackend for OnnxEngine {
    fn name(&self) -> &str {
        ENGINE
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let (reply_tx, reply_rx) = mpsc::channel();

        self.jobs
            .send((image.clone(), reply_tx))
            .map_err(|_| worker_stopped())?;

        reply_rx.recv().map_err(|_| worker_stopped())?
    }
}

fn build_engine(
    det_path: &Path,
    rec_path: &Path,
    dict_path: &Path,
) -> Result<OcrEngine, OcrError> {
    OcrEngineBuilder::new()
        .det_model_path(det_path)
        .rec_model_path(rec_path)
        .dictionary_path(dict_path)
        .build()
        .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))
}

fn recognize_page(
    engine: &OcrEngine,
    image: &DynamicImage,
    strip_unknown_tokens: bool,
) -> Result<String, OcrError> {
    let start = Instant::now();
    let (width, height) = image.dimensions();

    let results = engine
        .run_from_image(image)
        .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

    let words: Vec<Word> = results
        .iter()
        .map(|r| {
            let (x, y) = r
                .bounding_box
                .exterior()
                .coords()
                .fold((f64::INFINITY, f64::INFINITY), |(x, y), c| {
                    (x.min(c.x), y.min(c.y))
                });
            let text = if strip_unknown_tokens {
                r.text.replace(UNKNOWN_TOKEN, " ")
            } else {
                r.text.clone()
            };
            Word { x, y, text }
        })
        .collect();

    debug!(
        "pure-onnx-ocr: {} boxes on {}x{} in {}ms",
        words.len(),
        width,
        height,
        start.elapsed().as_millis()
    );

    Ok(reading_order(words))
}

fn worker_stopped() -> OcrError {
    OcrError::EngineUnavailable {
        engine: ENGINE.to_string(),
        reason: "OCR worker thread stopped".to_string(),
    }
}

/// Join boxes into lines: sorted top to bottom by band, left to right
/// within a band. Label and value boxes on one printed line end up on
/// one text line.
fn reading_order(mut words: Vec<Word>) -> String {
    let band = |w: &Word| (w.y / LINE_BAND_PX) as i64;
    words.sort_by(|a, b| {
        band(a)
            .cmp(&band(b))
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<(i64, Vec<&str>)> = Vec::new();
    for word in &words {
        let text = word.text.trim();
        if text.is_empty() {
            continue;
        }
        match lines.last_mut() {
            Some((b, parts)) if *b == band(word) => parts.push(text),
            _ => lines.push((band(word), vec![text])),
        }
    }

    lines
        .into_iter()
        .map(|(_, parts)| parts.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}
