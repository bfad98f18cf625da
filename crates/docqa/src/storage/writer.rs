//! JSON result documents on disk

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::ResultDocument;

/// Writes one pretty-printed JSON document per source into an output folder
pub struct ResultWriter {
    output_dir: PathBuf,
}

impl ResultWriter {
    /// Create the writer, creating the output folder if it is missing
    pub fn create(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Destination for a given output key
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.output_dir.join(format!("{}.json", key))
    }

    /// Serialize `document` to `<output_dir>/<key>.json`, replacing any existing file.
    ///
    /// The JSON is written to a temporary file in the same folder and renamed
    /// into place, so readers never see a partial document.
    pub fn save(&self, document: &ResultDocument, key: &str) -> Result<PathBuf> {
        let path = self.path_for(key);
        let json = serde_json::to_string_pretty(document)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".docqa-")
            .suffix(".json.tmp")
            .tempfile_in(&self.output_dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path)
            .map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote {} bytes to {}", json.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnswerRecord, QUESTIONS};

    fn document(source: &str, short: &str) -> ResultDocument {
        let mut qa = AnswerRecord::new();
        qa.insert(QUESTIONS[0], short);
        qa.insert(QUESTIONS[1], "Longer description with ünïcode ✓ intact");
        ResultDocument::new(source, qa)
    }

    #[test]
    fn test_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("output");
        let writer = ResultWriter::create(&out).unwrap();
        assert!(out.is_dir());
        assert_eq!(writer.path_for("deck"), out.join("deck.json"));
    }

    #[test]
    fn test_save_is_pretty_utf8_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ResultWriter::create(dir.path()).unwrap();

        let path = writer.save(&document("brochure.pdf", "Bikes"), "brochure").unwrap();
        let written = std::fs::read_to_string(&path).unwrap();

        assert!(written.starts_with("{\n  \"source\": \"brochure.pdf\",\n  \"qa\": {\n    \""));
        assert!(written.contains("ünïcode ✓ intact"));
        assert!(!written.contains("\\u"));

        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(serde_json::to_string_pretty(&parsed).unwrap(), written);

        let typed: ResultDocument = serde_json::from_str(&written).unwrap();
        let keys: Vec<_> = typed.qa.questions().collect();
        assert_eq!(keys, QUESTIONS.to_vec());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ResultWriter::create(dir.path()).unwrap();

        writer.save(&document("a.docx", "first run"), "a").unwrap();
        let path = writer.save(&document("a.docx", "second run"), "a").unwrap();

        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("second run"));
        assert!(!written.contains("first run"));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }
}
