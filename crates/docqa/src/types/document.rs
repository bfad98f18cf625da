//! Result documents pairing a source with its question/answer record

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The fixed questions asked about every source, in order
pub const QUESTIONS: [&str; 2] = [
    "provide short description of the product or services?",
    "provide long description of the product or services?",
];

/// Question to answer mapping that keeps question order.
///
/// Serializes as a JSON object whose keys appear in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerRecord {
    entries: Vec<(String, String)>,
}

impl AnswerRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer, replacing any earlier answer to the same question in place
    pub fn insert(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        let question = question.into();
        let answer = answer.into();
        match self.entries.iter_mut().find(|(q, _)| *q == question) {
            Some(entry) => entry.1 = answer,
            None => self.entries.push((question, answer)),
        }
    }

    /// Answer for a question
    pub fn get(&self, question: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(q, _)| q == question)
            .map(|(_, a)| a.as_str())
    }

    /// Questions in insertion order
    pub fn questions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(q, _)| q.as_str())
    }

    /// (question, answer) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(q, a)| (q.as_str(), a.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AnswerRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (question, answer) in &self.entries {
            map.serialize_entry(question, answer)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AnswerRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = AnswerRecord;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of question strings to answer strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut record = AnswerRecord::new();
                while let Some((question, answer)) = access.next_entry::<String, String>()? {
                    record.insert(question, answer);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// Persisted record for one source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultDocument {
    /// File name or URL of the source
    pub source: String,
    /// Answers keyed by question
    pub qa: AnswerRecord,
}

impl ResultDocument {
    pub fn new(source: impl Into<String>, qa: AnswerRecord) -> Self {
        Self {
            source: source.into(),
            qa,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_record_keeps_order() {
        let mut qa = AnswerRecord::new();
        qa.insert("zeta?", "last letter");
        qa.insert("alpha?", "first letter");

        let questions: Vec<_> = qa.questions().collect();
        assert_eq!(questions, vec!["zeta?", "alpha?"]);

        let json = serde_json::to_string(&qa).unwrap();
        assert_eq!(json, r#"{"zeta?":"last letter","alpha?":"first letter"}"#);
    }

    #[test]
    fn test_answer_record_replaces_in_place() {
        let mut qa = AnswerRecord::new();
        qa.insert("a", "1");
        qa.insert("b", "2");
        qa.insert("a", "3");
        assert_eq!(qa.len(), 2);
        assert_eq!(qa.get("a"), Some("3"));
        assert_eq!(qa.questions().next(), Some("a"));
    }

    #[test]
    fn test_result_document_json_shape() {
        let mut qa = AnswerRecord::new();
        qa.insert(QUESTIONS[0], "Café menus");
        qa.insert(QUESTIONS[1], "A longer answer");
        let doc = ResultDocument::new("menu.pdf", qa);

        let json = serde_json::to_string_pretty(&doc).unwrap();
        let expected = format!(
            "{{\n  \"source\": \"menu.pdf\",\n  \"qa\": {{\n    \"{}\": \"Café menus\",\n    \"{}\": \"A longer answer\"\n  }}\n}}",
            QUESTIONS[0], QUESTIONS[1]
        );
        assert_eq!(json, expected);

        let parsed: ResultDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
    }
}
