use crate::image::ImageRecord;
use crate::report::PostReport;

/// Render a report as a Markdown summary for humans
pub fn format_report(report: &PostReport) -> String {
    let mut lines = Vec::new();

    let title = if report.title.is_empty() {
        "(untitled)"
    } else {
        report.title.as_str()
    };
    lines.push(format!("# {}", title));
    lines.push(String::new());

    if !report.url.is_empty() {
        lines.push(format!("**URL:** {}", report.url));
    }
    if let Some(author) = &report.author {
        lines.push(format!("**Author:** {}", author));
    }
    if !report.published_date.is_empty() {
        lines.push(format!("**Published:** {}", report.published_date));
    }
    if !report.updated_date.is_empty() {
        lines.push(format!("**Updated:** {}", report.updated_date));
    }
    if !report.categories.is_empty() {
        lines.push(format!("**Categories:** {}", report.categories));
    }
    if !report.tags.is_empty() {
        lines.push(format!("**Tags:** {}", report.tags));
    }
    lines.push(format!("**Words:** {}", report.word_count));

    lines.push(String::new());
    lines.push("## SEO".to_string());
    lines.push(String::new());
    lines.push(format!("- Title: {}", or_none(&report.seo.title)));
    lines.push(format!("- Description: {}", or_none(&report.seo.description)));
    if !report.seo.keywords.is_empty() {
        lines.push(format!("- Keywords: {}", report.seo.keywords.join(", ")));
    }
    lines.push(format!(
        "- Noindex: {} / Nofollow: {}",
        report.seo.noindex, report.seo.nofollow
    ));

    if !report.seo.issues.is_empty() {
        lines.push(String::new());
        lines.push("### Issues".to_string());
        lines.push(String::new());
        for issue in &report.seo.issues {
            lines.push(format!("- {}", issue));
        }
    }

    lines.push(String::new());
    lines.push("## Images".to_string());
    lines.push(String::new());

    match &report.featured_image {
        Some(image) => lines.push(format!("Featured: {}", describe(image))),
        None => lines.push("Featured: none".to_string()),
    }

    if report.attached_images.is_empty() {
        lines.push(String::new());
        lines.push("No other images found.".to_string());
    } else {
        lines.push(String::new());
        lines.push("| # | File | Type | Size | Alt |".to_string());
        lines.push("|---|------|------|------|-----|".to_string());
        for (i, image) in report.attached_images.records().enumerate() {
            lines.push(format!(
                "| {} | {} | {} | {} | {} |",
                i + 1,
                image.filename,
                if image.is_external() { "external" } else { "media-library" },
                dimensions(image),
                if image.alt.is_empty() { "**missing**" } else { image.alt.as_str() },
            ));
        }
    }

    if !report.url_suggestions.is_empty() {
        lines.push(String::new());
        lines.push("## URL suggestions".to_string());
        lines.push(String::new());
        for url in &report.url_suggestions {
            lines.push(format!("- {}", url));
        }
    }

    lines.join("\n") + "\n"
}

fn or_none(value: &str) -> &str {
    if value.is_empty() {
        "(none)"
    } else {
        value
    }
}

fn dimensions(image: &ImageRecord) -> String {
    match (image.width, image.height) {
        (Some(w), Some(h)) => format!("{}×{}", w, h),
        _ => "?".to_string(),
    }
}

fn describe(image: &ImageRecord) -> String {
    let mut text = image.filename.clone();
    if image.alt.is_empty() {
        text.push_str(" (alt text missing)");
    } else {
        text.push_str(&format!(" (alt: {})", image.alt));
    }
    text
}
