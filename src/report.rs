//! Post QA/SEO report.

use crate::aggregator::{ImageAggregator, ImageInventory};
use crate::error::AnalyzeError;
use crate::image::ImageRecord;
use crate::normalize::UrlParts;
use crate::store::{
    BlockParser, ContentStore, MediaStore, Post, PostId, PostSummary, UserSummary,
};
use crate::text::{decode_entities, slugify, word_count};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

pub const META_SEO_TITLE: &str = "rank_math_title";
pub const META_SEO_DESCRIPTION: &str = "rank_math_description";
pub const META_FOCUS_KEYWORD: &str = "rank_math_focus_keyword";
pub const META_ROBOTS: &str = "rank_math_robots";

const TITLE_MIN_CHARS: usize = 30;
const TITLE_MAX_CHARS: usize = 70;
const DESCRIPTION_MIN_CHARS: usize = 120;
const DESCRIPTION_MAX_CHARS: usize = 320;

const DISPLAY_DATE_FORMAT: &str = "%B %-d, %Y %-I:%M %p";

#[derive(Debug, Clone, Serialize)]
pub struct SeoReport {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    /// `"yes"` or `"no"`
    pub noindex: &'static str,
    pub nofollow: &'static str,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostReport {
    pub url: String,
    pub title: String,
    pub author: Option<String>,
    pub published_date: String,
    pub updated_date: String,
    pub categories: String,
    pub tags: String,
    pub word_count: usize,
    pub seo: SeoReport,
    pub featured_image: Option<ImageRecord>,
    pub attached_images: ImageInventory,
    pub url_suggestions: Vec<String>,
}

/// Build the report for one post.
///
/// Fails only for a zero or unknown post id; everything about the post's
/// content degrades to partial results.
pub fn analyze_post<S, P>(store: &S, parser: &P, post_id: PostId) -> Result<PostReport, AnalyzeError>
where
    S: ContentStore + MediaStore + ?Sized,
    P: BlockParser + ?Sized,
{
    if post_id == 0 {
        return Err(AnalyzeError::InvalidPostId(post_id));
    }
    let post = store
        .post(post_id)
        .ok_or(AnalyzeError::PostNotFound(post_id))?;

    let images = ImageAggregator::new(store, store, parser).post_images(post_id);
    let seo = seo_report(&post);
    let url_suggestions = url_suggestions(&post, &seo.title);

    let featured_image = images.featured_image.map(|mut image| {
        image.decode_entities();
        image.upload_date = image.upload_date.as_deref().map(display_date);
        image
    });
    let mut attached_images = images.attached_images;
    attached_images
        .records_mut()
        .for_each(ImageRecord::decode_entities);

    let report = PostReport {
        url: decode_entities(&post.permalink),
        title: decode_entities(&post.title),
        author: post
            .author_id
            .and_then(|id| store.user_display_name(id))
            .map(|name| decode_entities(&name)),
        published_date: display_date(&post.date),
        updated_date: display_date(&post.modified),
        categories: join_decoded(&post.categories),
        tags: join_decoded(&post.tags),
        word_count: word_count(&post.content),
        seo,
        featured_image,
        attached_images,
        url_suggestions,
    };

    info!(
        post_id,
        images = report.attached_images.len(),
        issues = report.seo.issues.len(),
        "analyzed post"
    );
    Ok(report)
}

fn join_decoded(terms: &[String]) -> String {
    terms
        .iter()
        .map(|term| decode_entities(term))
        .collect::<Vec<_>>()
        .join(", ")
}

fn meta_string(post: &Post, key: &str) -> String {
    match post.meta.get(key) {
        Some(Value::String(s)) => decode_entities(s.trim()),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Robots directives stored either as a comma list or an array
fn robots_directives(post: &Post) -> Vec<String> {
    match post.meta.get(META_ROBOTS) {
        Some(Value::String(s)) => s.split(',').map(|d| d.trim().to_string()).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|d| d.trim().to_string())
            .collect(),
        _ => Vec::new(),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

pub fn seo_report(post: &Post) -> SeoReport {
    let title = meta_string(post, META_SEO_TITLE);
    let description = meta_string(post, META_SEO_DESCRIPTION);
    let keywords = meta_string(post, META_FOCUS_KEYWORD)
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();
    let robots = robots_directives(post);

    SeoReport {
        issues: seo_issues(&title, &description),
        title,
        description,
        keywords,
        noindex: yes_no(robots.iter().any(|d| d == "noindex")),
        nofollow: yes_no(robots.iter().any(|d| d == "nofollow")),
    }
}

pub fn seo_issues(title: &str, description: &str) -> Vec<String> {
    let mut issues = Vec::new();

    if title.is_empty() {
        issues.push("Missing SEO title".to_string());
    } else {
        let len = title.chars().count();
        if len < TITLE_MIN_CHARS {
            issues.push(format!("SEO title is short (<{TITLE_MIN_CHARS} chars)"));
        }
        if len > TITLE_MAX_CHARS {
            issues.push(format!("SEO title is long (>{TITLE_MAX_CHARS} chars)"));
        }
    }

    if description.is_empty() {
        issues.push("Missing meta description".to_string());
    } else {
        let len = description.chars().count();
        if len < DESCRIPTION_MIN_CHARS {
            issues.push(format!(
                "Meta description is short (<{DESCRIPTION_MIN_CHARS} chars)"
            ));
        }
        if len > DESCRIPTION_MAX_CHARS {
            issues.push(format!(
                "Meta description is long (>{DESCRIPTION_MAX_CHARS} chars)"
            ));
        }
    }

    issues
}

/// Candidate permalinks built from the SEO title, the post title or the URL.
///
/// `seo_title` is expected decoded; the post title is decoded here.
pub fn url_suggestions(post: &Post, seo_title: &str) -> Vec<String> {
    let title = decode_entities(&post.title);
    let base = [seo_title, title.as_str(), post.permalink.as_str()]
        .into_iter()
        .find(|candidate| !candidate.trim().is_empty())
        .unwrap_or_default();
    let slug = slugify(base);
    if slug.is_empty() {
        debug!(post_id = post.id, "no slug candidate");
        return Vec::new();
    }

    let parts = UrlParts::parse(&post.permalink);
    let scheme = if parts.scheme.is_empty() {
        "https"
    } else {
        parts.scheme.as_str()
    };
    let root = format!("{scheme}://{}", parts.host);

    vec![
        format!("{root}/{slug}"),
        format!("{root}/{slug}-1"),
        format!("{root}/{slug}-optimized"),
    ]
}

/// Stored timestamps are site-local without an offset, or RFC 3339.
/// Offset-less values are taken as UTC.
fn parse_stored_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map(|naive| naive.and_utc().fixed_offset())
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok())
}

/// Format a stored timestamp for display, keeping the raw value if it
/// cannot be parsed
pub fn display_date(raw: &str) -> String {
    let raw = raw.trim();
    match parse_stored_date(raw) {
        Some(dt) => dt.format(DISPLAY_DATE_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

/// ISO 8601 form of a stored timestamp, or the raw value
pub fn iso_date(raw: &str) -> String {
    let raw = raw.trim();
    match parse_stored_date(raw) {
        Some(dt) => dt.to_rfc3339(),
        None => raw.to_string(),
    }
}

/// Newest posts first; `limit` of zero lists all
pub fn list_posts<C: ContentStore + ?Sized>(store: &C, limit: usize) -> Vec<PostSummary> {
    let limit = (limit > 0).then_some(limit);
    store
        .recent_posts(limit)
        .into_iter()
        .map(|post| PostSummary {
            title: if post.title.trim().is_empty() {
                format!("Post #{}", post.id)
            } else {
                decode_entities(&post.title)
            },
            id: post.id,
            date: iso_date(&post.date),
            slug: post.slug,
            link: post.permalink,
            status: capitalize(&post.status),
        })
        .collect()
}

/// Users ordered by display name; `limit` of zero lists all.
///
/// An empty `role` means every user who can write posts.
pub fn list_users<C: ContentStore + ?Sized>(
    store: &C,
    limit: usize,
    role: Option<&str>,
) -> Vec<UserSummary> {
    let role = role.map(str::trim).filter(|r| !r.is_empty());
    let limit = if limit == 0 { usize::MAX } else { limit };
    store
        .users(role)
        .into_iter()
        .take(limit)
        .map(|user| UserSummary {
            id: user.id,
            name: if user.display_name.trim().is_empty() {
                user.login
            } else {
                decode_entities(&user.display_name)
            },
            email: user.email,
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
