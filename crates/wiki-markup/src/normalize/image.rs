//! Image and vector graphic rewriting
//!
//! Raster images are uploaded as attachments of the destination page and
//! referenced by filename. Vector images (`.svg`) are fetched, sized to
//! their container and inlined through an `html` macro.

use crate::error::{Error, Result};
use crate::node::{Element, Node};
use crate::parse::Document;
use crate::serialize;

use super::AssetStore;
use super::macros;

/// Rewrite every `<img>` below `nodes`.
///
/// Failures are per image: the element is left unconverted and the walk
/// continues.
pub fn rewrite_images<A: AssetStore>(nodes: &mut [Node], assets: &A) {
    for node in nodes.iter_mut() {
        let Some(el) = node.as_element_mut() else {
            continue;
        };
        if !el.is("img") {
            rewrite_images(&mut el.children, assets);
            continue;
        }

        let Some(src) = el.get_attr("src").map(str::to_owned) else {
            tracing::debug!("Skipping image without src");
            continue;
        };

        let converted = if is_vector(&src) {
            embed_vector(&src, assets)
        } else {
            attach_raster(&src, assets)
        };

        match converted {
            Ok(replacement) => *node = replacement.into(),
            Err(e) => tracing::warn!(url = %src, "Leaving image unconverted: {}", e),
        }
    }
}

/// Whether the URL path ends in `.svg`
pub fn is_vector(url: &str) -> bool {
    url_path(url).to_ascii_lowercase().ends_with(".svg")
}

/// Last path segment of the URL, ignoring query and fragment
pub fn file_name(url: &str) -> Option<&str> {
    url_path(url)
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
}

/// Content type for an attachment, guessed from its extension
pub fn content_type(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Sizing style applied to inlined vector graphics
pub fn vector_style(width: &str, height: &str) -> String {
    format!("max-width:{width};max-height:{height};width:100%;height:100%;")
}

fn url_path(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

fn attach_raster<A: AssetStore>(url: &str, assets: &A) -> Result<Element> {
    let filename = file_name(url).ok_or_else(|| Error::InvalidImageUrl {
        url: url.to_string(),
    })?;
    let bytes = assets.fetch(url).map_err(|e| Error::asset(url, e))?;

    // Uploading an existing name would be rejected by the destination
    if assets
        .attachment_exists(filename)
        .map_err(|e| Error::asset(url, e))?
    {
        tracing::debug!(filename, "Attachment already present");
    } else {
        assets
            .upload_attachment(filename, &bytes, content_type(filename))
            .map_err(|e| Error::asset(url, e))?;
        tracing::info!(filename, "Uploaded attachment");
    }

    Ok(macros::attached_image(filename))
}

fn embed_vector<A: AssetStore>(url: &str, assets: &A) -> Result<Element> {
    let bytes = assets.fetch(url).map_err(|e| Error::asset(url, e))?;
    let markup = sized_vector_markup(&String::from_utf8_lossy(&bytes)).ok_or_else(|| {
        Error::VectorRootMissing {
            url: url.to_string(),
        }
    })?;
    Ok(macros::plain_text_macro("html", &markup))
}

/// Locate the root `<svg>`, apply [`vector_style`] from its declared size and
/// serialize it.
pub fn sized_vector_markup(source: &str) -> Option<String> {
    let doc = Document::parse(source);
    let mut svg = doc.find_element("svg")?.clone();

    let width = svg.get_attr("width").unwrap_or_default().to_string();
    let height = svg.get_attr("height").unwrap_or_default().to_string();
    svg.set_attr("style", vector_style(&width, &height));

    Some(serialize::element_to_storage(&svg))
}
