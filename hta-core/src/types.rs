//! Fundamental data types: retrieved literature records and the sparse
//! per-record data points the evidence extractor derives from them.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::HtaError;

/// Number of identifying fields every data point carries regardless of category.
pub const BASELINE_FIELD_COUNT: usize = 4;

/// One article retrieved from the literature source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteratureRecord {
    /// Source identifier (PubMed ID). Not guaranteed unique.
    #[serde(rename = "pmid", alias = "identifier", default, deserialize_with = "null_as_empty")]
    pub identifier: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(rename = "abstract", default, deserialize_with = "null_as_empty")]
    pub abstract_text: String,
    /// Publication year as free text; not validated as numeric.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub year: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub journal: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub doi: String,
    /// Author names as "First Last".
    #[serde(default, deserialize_with = "authors_list_or_joined")]
    pub authors: Vec<String>,
}

impl LiteratureRecord {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_abstract(mut self, abstract_text: impl Into<String>) -> Self {
        self.abstract_text = abstract_text.into();
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }

    pub fn with_doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = doi.into();
        self
    }

    pub fn with_journal(mut self, journal: impl Into<String>) -> Self {
        self.journal = journal.into();
        self
    }

    pub fn with_authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    /// Authors joined for display, e.g. `"Jane Doe; Ravi Kumar"`.
    pub fn authors_display(&self) -> String {
        self.authors.join("; ")
    }

    /// Parse a JSON array of records, as written by the search step or by hand.
    pub fn list_from_json(content: &str) -> crate::Result<Vec<Self>> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        if !value.is_array() {
            return Err(HtaError::invalid_input(
                "expected a JSON array of literature records",
            ));
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AuthorsRepr {
    List(Vec<String>),
    Joined(String),
}

fn authors_list_or_joined<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let authors = match Option::<AuthorsRepr>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(AuthorsRepr::List(list)) => list,
        Some(AuthorsRepr::Joined(joined)) => joined
            .split(';')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
    };
    Ok(authors)
}

/// A single extracted metric value, kept as the matched text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricValue {
    pub name: String,
    pub value: String,
}

/// Sparse attribute set derived from one record under one project category.
///
/// The baseline fields are copied verbatim from the source record; metrics
/// appear in rule evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDataPoint {
    #[serde(rename = "pmid")]
    pub identifier: String,
    pub title: String,
    pub year: String,
    pub doi: String,
    #[serde(default)]
    pub metrics: Vec<MetricValue>,
}

impl ExtractedDataPoint {
    /// A data point holding only the baseline fields of `record`.
    pub fn baseline(record: &LiteratureRecord) -> Self {
        Self {
            identifier: record.identifier.clone(),
            title: record.title.clone(),
            year: record.year.clone(),
            doi: record.doi.clone(),
            metrics: Vec::new(),
        }
    }

    /// Populated field count: the four baseline fields plus every metric.
    pub fn field_count(&self) -> usize {
        BASELINE_FIELD_COUNT + self.metrics.len()
    }

    /// Whether at least one metric beyond the baseline fields was found.
    pub fn is_informative(&self) -> bool {
        self.field_count() > BASELINE_FIELD_COUNT
    }

    pub fn get(&self, metric: &str) -> Option<&str> {
        self.metrics
            .iter()
            .find(|m| m.name == metric)
            .map(|m| m.value.as_str())
    }

    /// Set `metric`, replacing an earlier value of the same name in place.
    pub fn set(&mut self, metric: impl Into<String>, value: impl Into<String>) {
        let name = metric.into();
        let value = value.into();
        match self.metrics.iter_mut().find(|m| m.name == name) {
            Some(existing) => existing.value = value,
            None => self.metrics.push(MetricValue { name, value }),
        }
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|m| m.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_missing_fields_default_to_empty() {
        let record: LiteratureRecord =
            serde_json::from_str(r#"{"pmid": "123", "title": null}"#).unwrap();
        assert_eq!(record.identifier, "123");
        assert_eq!(record.title, "");
        assert_eq!(record.abstract_text, "");
        assert!(record.authors.is_empty());
    }

    #[test]
    fn test_record_authors_accepts_joined_string() {
        let record: LiteratureRecord = serde_json::from_str(
            r#"{"pmid": "1", "authors": "Jane Doe; Ravi Kumar; "}"#,
        )
        .unwrap();
        assert_eq!(record.authors, vec!["Jane Doe", "Ravi Kumar"]);
        assert_eq!(record.authors_display(), "Jane Doe; Ravi Kumar");
    }

    #[test]
    fn test_record_authors_accepts_list() {
        let record: LiteratureRecord =
            serde_json::from_str(r#"{"pmid": "1", "authors": ["A B", "C D"]}"#).unwrap();
        assert_eq!(record.authors.len(), 2);
    }

    #[test]
    fn test_list_from_json() {
        let records =
            LiteratureRecord::list_from_json(r#"[{"pmid": "1"}, {"pmid": "2", "year": "2020"}]"#)
                .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].year, "2020");

        let err = LiteratureRecord::list_from_json(r#"{"pmid": "1"}"#).unwrap_err();
        assert!(matches!(err, HtaError::InvalidInput(_)));
        let err = LiteratureRecord::list_from_json("not json").unwrap_err();
        assert!(matches!(err, HtaError::Serialization(_)));
    }

    #[test]
    fn test_record_serializes_abstract_key() {
        let record = LiteratureRecord::new("42").with_abstract("Efficacy 90%.");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["pmid"], "42");
        assert_eq!(json["abstract"], "Efficacy 90%.");
    }

    #[test]
    fn test_data_point_field_count() {
        let record = LiteratureRecord::new("7").with_title("T");
        let mut point = ExtractedDataPoint::baseline(&record);
        assert_eq!(point.field_count(), 4);
        assert!(!point.is_informative());

        point.set("efficacy", "85");
        assert_eq!(point.field_count(), 5);
        assert!(point.is_informative());
        assert_eq!(point.get("efficacy"), Some("85"));
        assert_eq!(point.get("cost"), None);
    }

    #[test]
    fn test_data_point_set_replaces_in_place() {
        let mut point = ExtractedDataPoint::baseline(&LiteratureRecord::new("1"));
        point.set("sensitivity", "80");
        point.set("cost", "12");
        point.set("sensitivity", "81");
        let names: Vec<&str> = point.metric_names().collect();
        assert_eq!(names, vec!["sensitivity", "cost"]);
        assert_eq!(point.get("sensitivity"), Some("81"));
    }
}
