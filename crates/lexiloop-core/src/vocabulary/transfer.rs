//! CSV import and export for the vocabulary bank.
//!
//! Import accepts spreadsheets exported from any tool as long as the first
//! row holds headers. Columns are recognized by keyword in English,
//! Japanese, Chinese and Spanish, so `単語,翻訳,例文` and
//! `Word,Translation,Example` both work.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use super::{NewVocabulary, VocabularyItem};
use crate::error::TransferError;

const WORD_KEYS: &[&str] = &["word", "単語", "单词", "palabra"];
const TRANSLATION_KEYS: &[&str] = &["translation", "翻訳", "翻译", "traducción", "meaning", "中文"];
const EXAMPLE_KEYS: &[&str] = &["example", "例文", "例句", "ejemplo", "sentence"];
const PRONUNCIATION_KEYS: &[&str] = &[
    "pronunciation",
    "読み",
    "发音",
    "pronunciación",
    "romaji",
    "pinyin",
];
const NOTES_KEYS: &[&str] = &["note", "备注", "メモ", "nota", "remark"];

const EXPORT_HEADER: [&str; 8] = [
    "word",
    "translation",
    "example",
    "pronunciation",
    "notes",
    "mastery_level",
    "review_count",
    "next_review_at",
];

/// Column index for each recognized field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub word: Option<usize>,
    pub translation: Option<usize>,
    pub example: Option<usize>,
    pub pronunciation: Option<usize>,
    pub notes: Option<usize>,
}

impl ColumnMapping {
    /// Match each header against the keyword lists. A header is assigned to
    /// the first field it matches (word, translation, example,
    /// pronunciation, notes); when several headers match one field the
    /// rightmost one wins.
    pub fn detect<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut mapping = Self::default();
        for (index, header) in headers.into_iter().enumerate() {
            let lower = header.trim().to_lowercase();
            if lower.is_empty() {
                continue;
            }
            let matches = |keys: &[&str]| keys.iter().any(|k| lower.contains(k));
            let slot = if matches(WORD_KEYS) {
                &mut mapping.word
            } else if matches(TRANSLATION_KEYS) {
                &mut mapping.translation
            } else if matches(EXAMPLE_KEYS) {
                &mut mapping.example
            } else if matches(PRONUNCIATION_KEYS) {
                &mut mapping.pronunciation
            } else if matches(NOTES_KEYS) {
                &mut mapping.notes
            } else {
                continue;
            };
            *slot = Some(index);
        }
        mapping
    }
}

/// A data row that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
    /// 1-based row number, counting the header row.
    pub row: usize,
    pub reason: String,
}

/// Parsed import, ready to be stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub mapping: ColumnMapping,
    pub entries: Vec<NewVocabulary>,
    pub failed: Vec<ImportFailure>,
    pub blank_rows: usize,
}

/// Parse a CSV vocabulary sheet. Every accepted row becomes a
/// [`NewVocabulary`] tagged with `language` and `level`.
///
/// # Errors
/// Fails on unreadable CSV, a sheet without header and data rows, a sheet
/// without a word column, or a missing language/level.
pub fn import_csv<R: Read>(
    reader: R,
    language: &str,
    level: &str,
) -> Result<ImportReport, TransferError> {
    let (language, level) = (language.trim(), level.trim());
    if language.is_empty() || level.is_empty() {
        return Err(TransferError::MissingClassification);
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let rows = csv_reader
        .records()
        .collect::<Result<Vec<csv::StringRecord>, csv::Error>>()?;
    if rows.len() < 2 {
        return Err(TransferError::NotEnoughRows);
    }

    let mapping = ColumnMapping::detect(rows[0].iter());
    let word_column = mapping.word.ok_or(TransferError::MissingWordColumn)?;

    let mut report = ImportReport {
        mapping,
        ..Default::default()
    };
    for (offset, row) in rows.iter().enumerate().skip(1) {
        let row_number = offset + 1;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            report.blank_rows += 1;
            continue;
        }
        let cell = |column: Option<usize>| {
            column
                .and_then(|c| row.get(c))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let entry = NewVocabulary {
            word: cell(Some(word_column)),
            translation: cell(mapping.translation),
            example: cell(mapping.example),
            pronunciation: cell(mapping.pronunciation),
            notes: cell(mapping.notes),
            language: language.to_string(),
            level: level.to_string(),
        };
        match entry.validate() {
            Ok(entry) => report.entries.push(entry),
            Err(err) => report.failed.push(ImportFailure {
                row: row_number,
                reason: err.to_string(),
            }),
        }
    }
    tracing::debug!(
        imported = report.entries.len(),
        failed = report.failed.len(),
        "parsed vocabulary sheet"
    );
    Ok(report)
}

/// Write `items` as CSV with review progress columns. Returns the row count.
///
/// # Errors
/// `NothingToExport` for an empty selection, or any writer failure.
pub fn export_csv<W: Write>(writer: W, items: &[VocabularyItem]) -> Result<usize, TransferError> {
    if items.is_empty() {
        return Err(TransferError::NothingToExport);
    }
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPORT_HEADER)?;
    for item in items {
        let mastery = item.mastery_level.get().to_string();
        let review_count = item.review_count.to_string();
        let next_review_at = item.next_review_at.to_rfc3339();
        csv_writer.write_record([
            item.word.as_str(),
            item.translation.as_str(),
            item.example.as_str(),
            item.pronunciation.as_str(),
            item.notes.as_str(),
            mastery.as_str(),
            review_count.as_str(),
            next_review_at.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(items.len())
}

/// Write a sample import sheet for `language` (english when unknown).
pub fn write_template<W: Write>(writer: W, language: &str) -> Result<(), TransferError> {
    let rows: [[&str; 5]; 3] = match language {
        "japanese" => [
            ["単語", "翻訳", "例文", "読み", "メモ"],
            ["こんにちは", "你好", "こんにちは、田中さん。", "konnichiwa", "常用问候语"],
            ["ありがとう", "谢谢", "ありがとうございます。", "arigatou", "感谢表达"],
        ],
        "spanish" => [
            ["Palabra", "Traducción", "Ejemplo", "Pronunciación", "Notas"],
            ["hola", "你好", "Hola, ¿cómo estás?", "ola", "常用问候"],
            ["gracias", "谢谢", "Muchas gracias.", "grasias", "感谢表达"],
        ],
        _ => [
            ["Word", "Translation", "Example", "Pronunciation", "Notes"],
            ["hello", "你好", "Hello, how are you?", "/həˈləʊ/", "常用问候"],
            ["thanks", "谢谢", "Thanks for your help.", "/θæŋks/", "感谢表达"],
        ],
    };
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
