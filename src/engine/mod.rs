pub mod ocr;
pub mod process;
pub mod tts;

use anyhow::Result;
use std::path::Path;

pub use ocr::CommandOcr;
pub use tts::CommandTts;

/// Reads the text printed on an image.
pub trait OcrEngine {
    fn detect_text(&self, image: &[u8]) -> Result<String>;
}

/// Speaks `text` into an audio file at `output`.
pub trait TtsEngine {
    fn synthesize(&self, text: &str, output: &Path) -> Result<()>;
}
