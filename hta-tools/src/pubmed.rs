//! PubMed E-utilities client: esearch/efetch over HTTP and an efetch XML parser.

use std::time::Duration;

use async_trait::async_trait;
use hta_core::LiteratureRecord;
use hta_core::config::PubMedConfig;
use quick_xml::Reader as XmlReader;
use quick_xml::events::{BytesStart, Event};
use serde::Deserialize;

use crate::error::{Result, ToolsError};

const USER_AGENT: &str = "hta-evidence/0.3 (literature extraction)";

/// Anything that can turn a query into literature records.
#[async_trait]
pub trait LiteratureSource: Send + Sync {
    async fn search_and_fetch(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<LiteratureRecord>>;
}

// ── PubMed Client ─────────────────────────────────────────────

/// HTTP client for NCBI E-utilities.
pub struct PubMedClient {
    client: reqwest::Client,
    base_url: String,
    email: String,
    hard_limit: usize,
    batch_size: usize,
    batch_delay: Duration,
}

impl PubMedClient {
    pub fn new(config: &PubMedConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            client,
            base_url,
            email: config.email.clone(),
            hard_limit: config.hard_limit,
            batch_size: config.batch_size.max(1),
            batch_delay: Duration::from_millis(config.batch_delay_ms),
        })
    }

    /// Search PubMed and return matching PMIDs.
    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let url = self.esearch_url(query, max_results);
        tracing::debug!(url = %url, "PubMed esearch");
        let body = self.get_text(&url).await?;
        parse_esearch_response(&body)
    }

    /// Fetch article metadata and abstracts for the given PMIDs.
    pub async fn fetch_abstracts(&self, ids: &[String]) -> Result<Vec<LiteratureRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.efetch_url(ids);
        tracing::debug!(url = %url, ids = ids.len(), "PubMed efetch");
        let body = self.get_text(&url).await?;
        parse_efetch_response(&body)
    }

    /// Search, cap at the hard limit, then fetch in batches with a flat pause
    /// after each batch.
    pub async fn search_and_fetch(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<LiteratureRecord>> {
        tracing::info!(query, "Searching PubMed");
        let mut ids = self.search(query, max_results).await?;
        tracing::info!(found = ids.len(), "PubMed search returned identifiers");
        ids.truncate(self.hard_limit);

        let mut records = Vec::with_capacity(ids.len());
        for batch in ids.chunks(self.batch_size) {
            records.extend(self.fetch_abstracts(batch).await?);
            tokio::time::sleep(self.batch_delay).await;
        }
        Ok(records)
    }

    pub fn esearch_url(&self, query: &str, max_results: usize) -> String {
        format!(
            "{}esearch.fcgi?db=pubmed&term={}&retmax={}&retmode=json&email={}",
            self.base_url,
            urlencoding::encode(query),
            max_results,
            urlencoding::encode(&self.email),
        )
    }

    pub fn efetch_url(&self, ids: &[String]) -> String {
        format!(
            "{}efetch.fcgi?db=pubmed&id={}&retmode=xml&email={}",
            self.base_url,
            urlencoding::encode(&ids.join(",")),
            urlencoding::encode(&self.email),
        )
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToolsError::Api {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl LiteratureSource for PubMedClient {
    async fn search_and_fetch(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<LiteratureRecord>> {
        PubMedClient::search_and_fetch(self, query, max_results).await
    }
}

// ── esearch JSON ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ESearchResponse {
    #[serde(default)]
    esearchresult: ESearchResult,
}

#[derive(Default, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

/// Identifiers from an esearch JSON body. A missing list is empty.
pub fn parse_esearch_response(body: &str) -> Result<Vec<String>> {
    let response: ESearchResponse = serde_json::from_str(body)
        .map_err(|e| ToolsError::parse("esearch response", e.to_string()))?;
    Ok(response.esearchresult.idlist)
}

// ── efetch XML ────────────────────────────────────────────────

/// An article field filled from element text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Pmid,
    Title,
    Abstract,
    Year,
    Journal,
    Doi,
    LastName,
    ForeName,
}

/// Fields of the `<PubmedArticle>` being read. The first element of each
/// kind wins.
#[derive(Default)]
struct ArticleBuilder {
    pmid: Option<String>,
    title: Option<String>,
    abstract_text: Option<String>,
    year: Option<String>,
    journal: Option<String>,
    doi: Option<String>,
    authors: Vec<String>,
    last_name: Option<String>,
    fore_name: Option<String>,
}

impl ArticleBuilder {
    /// The still-unset field an element opening under `parent` fills.
    fn target(&self, name: &[u8], parent: Option<&[u8]>, is_doi: bool) -> Option<Field> {
        let (field, slot) = match (name, parent) {
            (b"PMID", _) => (Field::Pmid, &self.pmid),
            (b"ArticleTitle", _) => (Field::Title, &self.title),
            (b"AbstractText", _) => (Field::Abstract, &self.abstract_text),
            (b"Year", Some(b"PubDate")) => (Field::Year, &self.year),
            (b"Title", Some(b"Journal")) => (Field::Journal, &self.journal),
            (b"ELocationID", _) if is_doi => (Field::Doi, &self.doi),
            (b"LastName", Some(b"Author")) => (Field::LastName, &self.last_name),
            (b"ForeName", Some(b"Author")) => (Field::ForeName, &self.fore_name),
            _ => return None,
        };
        slot.is_none().then_some(field)
    }

    fn set(&mut self, field: Field, value: &str) {
        let slot = match field {
            Field::Pmid => &mut self.pmid,
            Field::Title => &mut self.title,
            Field::Abstract => &mut self.abstract_text,
            Field::Year => &mut self.year,
            Field::Journal => &mut self.journal,
            Field::Doi => &mut self.doi,
            Field::LastName => &mut self.last_name,
            Field::ForeName => &mut self.fore_name,
        };
        *slot = Some(value.trim().to_string());
    }

    fn start_author(&mut self) {
        self.last_name = None;
        self.fore_name = None;
    }

    /// Keep the author only when both name parts are present.
    fn finish_author(&mut self) {
        if let (Some(first), Some(last)) = (self.fore_name.take(), self.last_name.take()) {
            self.authors.push(format!("{first} {last}"));
        }
    }

    fn finish(self) -> LiteratureRecord {
        LiteratureRecord {
            identifier: self.pmid.unwrap_or_default(),
            title: normalize_whitespace(&self.title.unwrap_or_default()),
            abstract_text: self.abstract_text.unwrap_or_default(),
            year: self.year.unwrap_or_default(),
            journal: self.journal.unwrap_or_default(),
            doi: self.doi.unwrap_or_default(),
            authors: self.authors,
        }
    }
}

fn is_doi(element: &BytesStart) -> bool {
    element
        .attributes()
        .flatten()
        .any(|attr| attr.key.as_ref() == b"EIdType" && *attr.value == *b"doi")
}

/// Parse every `<PubmedArticle>` in an efetch XML body.
///
/// Text of a captured element includes its descendants, so inline markup
/// such as `<i>` inside a title is flattened away.
pub fn parse_efetch_response(xml: &str) -> Result<Vec<LiteratureRecord>> {
    let mut reader = XmlReader::from_str(xml);
    let mut records = Vec::new();
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut article: Option<ArticleBuilder> = None;
    // Field being read, the depth of its element, and the text so far.
    let mut capture: Option<(Field, usize, String)> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(ToolsError::parse(
                    "efetch response",
                    format!("error at position {}: {e}", reader.buffer_position()),
                ));
            }
        };

        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"PubmedArticle" {
                    article = Some(ArticleBuilder::default());
                } else if let Some(builder) = article.as_mut()
                    && capture.is_none()
                {
                    if name == b"Author" {
                        builder.start_author();
                    }
                    let parent = path.last().map(Vec::as_slice);
                    if let Some(field) = builder.target(&name, parent, is_doi(&e)) {
                        capture = Some((field, path.len() + 1, String::new()));
                    }
                }
                path.push(name);
            }
            Event::Empty(e) => {
                if let Some(builder) = article.as_mut()
                    && capture.is_none()
                {
                    let parent = path.last().map(Vec::as_slice);
                    if let Some(field) = builder.target(e.local_name().as_ref(), parent, is_doi(&e))
                    {
                        builder.set(field, "");
                    }
                }
            }
            Event::Text(t) => {
                if let Some((_, _, text)) = capture.as_mut() {
                    let unescaped = t
                        .unescape()
                        .map_err(|e| ToolsError::parse("efetch text", e.to_string()))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(c) => {
                if let Some((_, _, text)) = capture.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => {
                let depth = path.len();
                if capture.as_ref().is_some_and(|(_, at, _)| *at == depth)
                    && let (Some((field, _, text)), Some(builder)) =
                        (capture.take(), article.as_mut())
                {
                    builder.set(field, &text);
                }
                match e.local_name().as_ref() {
                    b"Author" => {
                        if let Some(builder) = article.as_mut() {
                            builder.finish_author();
                        }
                    }
                    b"PubmedArticle" => {
                        if let Some(builder) = article.take() {
                            records.push(builder.finish());
                        }
                    }
                    _ => {}
                }
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}

/// Normalize whitespace: collapse runs of whitespace into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
