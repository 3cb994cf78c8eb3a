//! Source client for the Yuque open API

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::Result;
use crate::http::{Body, HttpClient, join_url};
use crate::models::{DocBrief, RepoBrief, parse_timestamp};
use crate::service::SourceService;

/// Fixed page size of the listing endpoints
const PAGE_SIZE: usize = 20;

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct RepoRecord {
    id: u64,
    name: String,
    updated_at: String,
}

#[derive(Deserialize)]
struct DocRecord {
    id: u64,
    title: String,
    updated_at: String,
}

#[derive(Deserialize)]
struct TocRecord {
    /// Zero for pure heading entries
    #[serde(default)]
    id: u64,
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    parent_uuid: String,
}

#[derive(Deserialize)]
struct DocDetailRecord {
    #[serde(default)]
    body_html: String,
}

/// Blocking Yuque client authenticated with an access token
pub struct YuqueClient {
    http: HttpClient,
    domain: String,
    user_id: String,
    auth: String,
}

impl YuqueClient {
    pub fn new(domain: impl Into<String>, user_id: impl Into<String>, auth: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            domain: domain.into(),
            user_id: user_id.into(),
            auth: auth.into(),
        }
    }

    fn get<T: serde::de::DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let mut request = self
            .http
            .request("GET", &join_url(&self.domain, path))
            .set("X-Auth-Token", &self.auth);
        for (key, value) in query {
            request = request.query(key, value);
        }
        let response = self.http.send(request, Body::Empty)?;
        let envelope: Envelope<T> = HttpClient::json(response)?;
        Ok(envelope.data)
    }

    fn list_repo_page(&self, offset: usize) -> Result<Vec<RepoRecord>> {
        // The repos endpoint ignores `limit`
        self.get(
            &format!("/api/v2/users/{}/repos", self.user_id),
            &[("offset", offset.to_string())],
        )
    }

    fn list_doc_page(&self, repo_id: &str, offset: usize) -> Result<Vec<DocRecord>> {
        self.get(
            &format!("/api/v2/repos/{repo_id}/docs"),
            &[("offset", offset.to_string()), ("limit", PAGE_SIZE.to_string())],
        )
    }

    fn toc(&self, repo_id: &str) -> Result<Vec<TocRecord>> {
        self.get(&format!("/api/v2/repos/{repo_id}/toc"), &[])
    }
}

/// Collect every page of an offset-paginated listing
fn collect_pages<T>(mut fetch: impl FnMut(usize) -> Result<Vec<T>>) -> Result<Vec<T>> {
    let mut all = Vec::new();
    let mut offset = 0;
    loop {
        let page = fetch(offset)?;
        let len = page.len();
        all.extend(page);
        if len < PAGE_SIZE {
            return Ok(all);
        }
        offset += PAGE_SIZE;
    }
}

/// Attach `uuid`/`parent_uuid` from the table of contents to each doc.
///
/// Docs missing from the table of contents become top-level documents.
fn join_toc(repo_id: &str, docs: Vec<DocRecord>, toc: Vec<TocRecord>) -> Result<Vec<DocBrief>> {
    let links: HashMap<u64, TocRecord> = toc
        .into_iter()
        .filter(|entry| entry.id != 0)
        .map(|entry| (entry.id, entry))
        .collect();

    docs.into_iter()
        .map(|doc| {
            let (uuid, parent_uuid) = match links.get(&doc.id) {
                Some(link) => (
                    link.uuid.clone(),
                    Some(link.parent_uuid.clone()).filter(|p| !p.is_empty()),
                ),
                None => {
                    tracing::debug!(doc = %doc.title, "Document missing from table of contents");
                    (String::new(), None)
                }
            };
            Ok(DocBrief {
                id: doc.id.to_string(),
                repo_id: repo_id.to_string(),
                title: doc.title,
                mtime: parse_timestamp(&doc.updated_at)?,
                uuid,
                parent_uuid,
            })
        })
        .collect()
}

impl SourceService for YuqueClient {
    fn list_all_repos(&self) -> Result<Vec<RepoBrief>> {
        let records = collect_pages(|offset| self.list_repo_page(offset))?;
        records
            .into_iter()
            .map(|r| {
                Ok(RepoBrief {
                    id: r.id.to_string(),
                    title: r.name,
                    mtime: parse_timestamp(&r.updated_at)?,
                })
            })
            .collect()
    }

    fn list_all_docs_in_repo(&self, repo_id: &str) -> Result<Vec<DocBrief>> {
        let docs = collect_pages(|offset| self.list_doc_page(repo_id, offset))?;
        let toc = self.toc(repo_id)?;
        tracing::debug!(repo_id, docs = docs.len(), "Listed source documents");
        join_toc(repo_id, docs, toc)
    }

    fn get_doc_body(&self, repo_id: &str, doc_id: &str) -> Result<String> {
        let detail: DocDetailRecord = self.get(&format!("/api/v2/repos/{repo_id}/docs/{doc_id}"), &[])?;
        Ok(detail.body_html)
    }
}
