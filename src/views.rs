//! HTML views rendered by the web server.
//!
//! Templates live in `templates/` and are compiled in by askama.

use askama::Template;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

use crate::directory::CategoryListing;
use crate::models::{Category, Resource};
use crate::states::STATES;

pub struct StateOption {
    pub code: &'static str,
    pub name: &'static str,
}

pub struct CategoryLink {
    pub slug: &'static str,
    pub label: &'static str,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexView {
    pub states: Vec<StateOption>,
    pub categories: Vec<CategoryLink>,
}

impl IndexView {
    pub fn new() -> Self {
        Self {
            states: STATES
                .iter()
                .map(|&(code, name)| StateOption { code, name })
                .collect(),
            categories: Category::ALL
                .iter()
                .map(|c| CategoryLink {
                    slug: c.slug(),
                    label: c.label(),
                })
                .collect(),
        }
    }
}

impl Default for IndexView {
    fn default() -> Self {
        Self::new()
    }
}

/// A resource flattened for display; missing fields become empty strings.
pub struct ResourceCard {
    pub name: String,
    pub description: String,
    pub website: String,
    pub phone: String,
    pub address: String,
}

impl From<Resource> for ResourceCard {
    fn from(resource: Resource) -> Self {
        Self {
            name: resource.name,
            description: resource.description,
            website: resource
                .website
                .filter(|w| is_safe_url(w))
                .unwrap_or_default(),
            phone: resource.phone.unwrap_or_default(),
            address: resource.address.unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "category.html")]
pub struct CategoryView {
    pub category_name: String,
    pub state_name: String,
    pub resources: Vec<ResourceCard>,
}

impl From<CategoryListing> for CategoryView {
    fn from(listing: CategoryListing) -> Self {
        Self {
            category_name: listing.category_label,
            state_name: listing.state_name,
            resources: listing.resources.into_iter().map(ResourceCard::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsView {
    pub query: String,
    /// Pre-rendered HTML of the Markdown response.
    pub response_html: String,
}

impl ResultsView {
    pub fn new(query: impl Into<String>, response_markdown: &str) -> Self {
        Self {
            query: query.into(),
            response_html: markdown_to_html(response_markdown),
        }
    }
}

const SAFE_SCHEMES: [&str; 4] = ["http", "https", "mailto", "tel"];

/// Whether `url` may be emitted as a link target: a relative reference, or
/// an absolute URL whose scheme is `http`, `https`, `mailto` or `tel`.
pub fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    let Some(colon) = url.find(':') else {
        return true;
    };
    let scheme = &url[..colon];
    // A colon after a path, query or fragment delimiter is not a scheme
    if scheme.contains(['/', '?', '#']) {
        return true;
    }
    SAFE_SCHEMES.iter().any(|s| scheme.eq_ignore_ascii_case(s))
}

fn safe_dest(dest: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&dest) {
        dest
    } else {
        CowStr::Borrowed("#")
    }
}

/// Render Markdown to HTML. Raw HTML in the input is emitted as escaped
/// text and link or image targets outside [`is_safe_url`] become `#`, so
/// model output cannot inject markup or script URLs.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(CowStr::from(raw.into_string())),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_dest(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_dest(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
