use crate::models::Image;
use crate::services::catalog::{CatalogError, CatalogStore};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::fmt::Write;
use std::sync::Arc;

/// Bytes that may not appear raw inside a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Rendering boundary for the public gallery page.
pub trait GalleryRenderer: Send + Sync {
    fn render(&self, images: &[Image]) -> String;
}

/// Read-only view over the catalog used by the public listing.
#[derive(Clone)]
pub struct GalleryService {
    catalog: CatalogStore,
    renderer: Arc<dyn GalleryRenderer>,
}

impl GalleryService {
    pub fn new(catalog: CatalogStore, renderer: Arc<dyn GalleryRenderer>) -> Self {
        Self { catalog, renderer }
    }

    /// All images with their categories. No filtering, sorting or paging.
    pub async fn list_for_display(&self) -> Result<Vec<Image>, CatalogError> {
        self.catalog.list_images().await
    }

    pub async fn render_page(&self) -> Result<String, CatalogError> {
        let images = self.list_for_display().await?;
        tracing::debug!("Rendering gallery with {} images", images.len());
        Ok(self.renderer.render(&images))
    }
}

/// Plain HTML page: one card per image with its thumbnail, categories,
/// age limit and creation date.
pub struct HtmlGalleryRenderer {
    title: String,
    media_url: String,
}

impl HtmlGalleryRenderer {
    pub fn new(title: impl Into<String>, media_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            media_url: media_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Media URL for a storage reference, each path segment percent-encoded.
    fn image_url(&self, reference: &str) -> String {
        let path = reference
            .trim_start_matches('/')
            .split('/')
            .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", self.media_url, path)
    }
}

impl GalleryRenderer for HtmlGalleryRenderer {
    fn render(&self, images: &[Image]) -> String {
        let title = escape_html(&self.title);
        let mut html = String::with_capacity(512 + images.len() * 256);

        // Writing into a String cannot fail.
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n"
        );

        if images.is_empty() {
            html.push_str("<p class=\"empty\">No images yet.</p>\n");
        } else {
            html.push_str("<ul class=\"gallery\">\n");
            for image in images {
                let image_title = escape_html(&image.title);
                let _ = write!(
                    html,
                    "<li class=\"image\">\n<img src=\"{}\" alt=\"{}\">\n<h2>{}</h2>\n",
                    escape_html(&self.image_url(&image.image)),
                    image_title,
                    image_title
                );

                if !image.categories.is_empty() {
                    html.push_str("<ul class=\"categories\">");
                    for category in &image.categories {
                        let _ = write!(html, "<li>{}</li>", escape_html(&category.name));
                    }
                    html.push_str("</ul>\n");
                }

                let _ = write!(
                    html,
                    "<p class=\"meta\">Age limit: {}+ &middot; Added {}</p>\n</li>\n",
                    image.age_limit,
                    image.created_date.format("%Y-%m-%d")
                );
            }
            html.push_str("</ul>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
