//! Destination client for the Confluence REST API

use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::Result;
use crate::http::{Body, HttpClient, join_url};
use crate::models::{AttachmentBrief, PageBrief, parse_timestamp};
use crate::service::DestinationService;

/// Page size for content listings
const PAGE_SIZE: usize = 100;

#[derive(Deserialize)]
struct Results<T> {
    results: Vec<T>,
}

#[derive(Deserialize)]
struct IdRecord {
    id: String,
}

#[derive(Deserialize)]
struct VersionRecord {
    number: u64,
    when: String,
}

#[derive(Deserialize)]
struct PageRecord {
    id: String,
    title: String,
    version: VersionRecord,
    #[serde(default)]
    ancestors: Vec<IdRecord>,
}

impl PageRecord {
    fn into_brief(self) -> Result<PageBrief> {
        Ok(PageBrief {
            mtime: parse_timestamp(&self.version.when)?,
            id: self.id,
            title: self.title,
            version: self.version.number,
            ancestors: self.ancestors.into_iter().map(|a| a.id).collect(),
        })
    }
}

#[derive(Deserialize)]
struct SpaceRecord {
    key: String,
}

#[derive(Deserialize)]
struct OwnedRecord {
    space: SpaceRecord,
}

#[derive(Deserialize)]
struct AttachmentRecord {
    id: String,
    title: String,
}

/// Blocking Confluence client bound to one space
pub struct ConfluenceClient {
    http: HttpClient,
    domain: String,
    space: String,
    auth: String,
}

impl ConfluenceClient {
    /// `auth` is sent verbatim as the `Authorization` header
    pub fn new(domain: impl Into<String>, space: impl Into<String>, auth: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            domain: domain.into(),
            space: space.into(),
            auth: auth.into(),
        }
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        self.http
            .request(method, &join_url(&self.domain, path))
            .set("Authorization", &self.auth)
    }

    fn content_path(id: &str) -> String {
        format!("/rest/api/content/{id}")
    }

    fn list_page(&self, start: usize) -> Result<Vec<PageRecord>> {
        let request = self
            .request("GET", "/rest/api/content/")
            .query("spaceKey", &self.space)
            .query("expand", "version,ancestors")
            .query("start", &start.to_string())
            .query("limit", &PAGE_SIZE.to_string());
        let response = self.http.send(request, Body::Empty)?;
        let page: Results<PageRecord> = HttpClient::json(response)?;
        Ok(page.results)
    }
}

fn storage_body(body: &str) -> serde_json::Value {
    json!({ "storage": { "value": body, "representation": "storage" } })
}

/// Single-file `multipart/form-data` payload
fn multipart(boundary: &str, filename: &str, bytes: &[u8], content_type: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 256);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {content_type}\r\n\r\n",
            filename.replace('"', "%22")
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

impl DestinationService for ConfluenceClient {
    fn space_key(&self) -> &str {
        &self.space
    }

    fn list_all_pages(&self) -> Result<Vec<PageBrief>> {
        let mut pages = Vec::new();
        let mut start = 0;
        loop {
            let batch = self.list_page(start)?;
            let len = batch.len();
            for record in batch {
                pages.push(record.into_brief()?);
            }
            if len < PAGE_SIZE {
                break;
            }
            start += PAGE_SIZE;
        }
        tracing::debug!(space = %self.space, pages = pages.len(), "Listed destination pages");
        Ok(pages)
    }

    fn create_page(&self, title: &str, ancestors: &[String], body: &str) -> Result<PageBrief> {
        let payload = json!({
            "space": { "key": self.space },
            "type": "page",
            "title": title,
            "ancestors": ancestors.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>(),
            "body": storage_body(body),
        });
        let response = self
            .http
            .send(self.request("POST", "/rest/api/content/"), Body::Json(payload))?;
        HttpClient::json::<PageRecord>(response)?.into_brief()
    }

    fn update_page(&self, id: &str, title: &str, version: u64, body: &str) -> Result<PageBrief> {
        let payload = json!({
            "version": { "number": version },
            "type": "page",
            "title": title,
            "body": storage_body(body),
        });
        let response = self
            .http
            .send(self.request("PUT", &Self::content_path(id)), Body::Json(payload))?;
        HttpClient::json::<PageRecord>(response)?.into_brief()
    }

    fn update_page_title(&self, id: &str, title: &str, version: u64) -> Result<()> {
        let payload = json!({
            "version": { "number": version },
            "type": "page",
            "title": title,
        });
        self.http
            .send(self.request("PUT", &Self::content_path(id)), Body::Json(payload))?;
        Ok(())
    }

    fn delete_page(&self, id: &str) -> Result<()> {
        self.http
            .send(self.request("DELETE", &Self::content_path(id)), Body::Empty)?;
        Ok(())
    }

    fn get_page_space_owner(&self, id: &str) -> Result<String> {
        let request = self
            .request("GET", &Self::content_path(id))
            .query("expand", "space");
        let response = self.http.send(request, Body::Empty)?;
        let owned: OwnedRecord = HttpClient::json(response)?;
        Ok(owned.space.key)
    }

    fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<()> {
        let boundary = format!("wikisync-{}", Uuid::new_v4().simple());
        let payload = multipart(&boundary, filename, bytes, content_type);
        let request = self
            .request("POST", &format!("/rest/api/content/{page_id}/child/attachment"))
            .set("X-Atlassian-Token", "no-check")
            .set("Content-Type", &format!("multipart/form-data; boundary={boundary}"));
        self.http.send(request, Body::Bytes(&payload))?;
        Ok(())
    }

    fn find_attachment_by_name(
        &self,
        page_id: &str,
        filename: &str,
    ) -> Result<Option<AttachmentBrief>> {
        let request = self
            .request("GET", &format!("/rest/api/content/{page_id}/child/attachment"))
            .query("filename", filename);
        let response = self.http.send(request, Body::Empty)?;
        let found: Results<AttachmentRecord> = HttpClient::json(response)?;
        Ok(found
            .results
            .into_iter()
            .find(|a| a.title == filename)
            .map(|a| AttachmentBrief {
                id: a.id,
                title: a.title,
            }))
    }
}
