//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use inkwell_access::envelope::Page;
use inkwell_access::{GuardDecision, Layout, NavigationRequest, Profile};
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};
use crate::terminal::format_notice;

const TITLE_WIDTH: usize = 48;

pub(crate) fn print_json<S: Serialize + ?Sized>(value: &S) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

/// Payload of a reply envelope, or the value itself when it is not wrapped.
#[must_use]
pub(crate) fn payload(value: &Value) -> &Value {
    match value.get("data") {
        Some(data) if value.get("code").is_some() || value.get("success").is_some() => data,
        _ => value,
    }
}

/// Rows of a listing payload, accepting a bare array or any paged shape.
#[must_use]
pub(crate) fn listing(value: &Value) -> Page<Value> {
    let body = payload(value);
    if let Value::Array(rows) = body {
        return Page {
            page: None,
            page_size: None,
            total: u64::try_from(rows.len()).unwrap_or(u64::MAX),
            item: rows.clone(),
        };
    }
    serde_json::from_value(body.clone()).unwrap_or(Page {
        page: None,
        page_size: None,
        total: 0,
        item: Vec::new(),
    })
}

fn text<'a>(row: &'a Value, keys: &[&str]) -> &'a str {
    keys.iter()
        .find_map(|key| row.get(*key).and_then(Value::as_str))
        .unwrap_or("-")
}

fn id_of(row: &Value) -> String {
    row.get("id")
        .map_or_else(|| "-".to_string(), |id| id.to_string().trim_matches('"').to_string())
}

#[must_use]
pub(crate) fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let kept: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

pub(crate) fn render_article_list(value: &Value, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(value)?,
        OutputFormat::Table => {
            let page = listing(value);
            println!("{:>6} {:<10} {:<16} TITLE", "ID", "STATE", "AUTHOR");
            for row in &page.item {
                println!(
                    "{:>6} {:<10} {:<16} {}",
                    id_of(row),
                    text(row, &["state"]),
                    truncate(text(row, &["nickname", "authorName", "username"]), 16),
                    truncate(text(row, &["title"]), TITLE_WIDTH)
                );
            }
            println!("total: {}", page.total);
        }
    }
    Ok(())
}

pub(crate) fn render_article_detail(value: &Value, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(value)?,
        OutputFormat::Table => {
            let article = payload(value);
            println!("id: {}", id_of(article));
            println!("title: {}", text(article, &["title"]));
            println!(
                "author: {}",
                text(article, &["nickname", "authorName", "username"])
            );
            println!("state: {}", text(article, &["state"]));
            if let Some(category) = article.get("categoryName").and_then(Value::as_str) {
                println!("category: {category}");
            }
            println!("updated: {}", text(article, &["updateTime", "createTime"]));
            println!();
            println!("{}", text(article, &["content"]));
        }
    }
    Ok(())
}

pub(crate) fn render_comments(value: &Value, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(value)?,
        OutputFormat::Table => {
            let page = listing(value);
            for row in &page.item {
                println!(
                    "#{} {}: {}",
                    id_of(row),
                    text(row, &["nickname", "username", "userName"]),
                    text(row, &["content"])
                );
            }
            println!("total: {}", page.total);
        }
    }
    Ok(())
}

pub(crate) fn render_profile(profile: &Profile, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(profile)?,
        OutputFormat::Table => {
            println!("id: {}", profile.id);
            println!("name: {}", profile.display_name());
            println!("role: {}", profile.role.label());
            if let Some(email) = &profile.email {
                println!("email: {email}");
            }
        }
    }
    Ok(())
}

#[must_use]
pub(crate) const fn layout_label(layout: Option<Layout>) -> &'static str {
    match layout {
        Some(Layout::AuthorWorkspace) => "author workspace",
        Some(Layout::UserCenter) => "personal center",
        None => "public",
    }
}

#[derive(Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
enum DecisionView<'a> {
    Allow {
        path: &'a str,
        layout: &'static str,
    },
    Redirect {
        to: &'a str,
        replace: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        notice: Option<String>,
    },
}

pub(crate) fn render_decision(decision: &GuardDecision, format: OutputFormat) -> CliResult<()> {
    let view = match decision {
        GuardDecision::Allow { path, layout } => DecisionView::Allow {
            path,
            layout: layout_label(*layout),
        },
        GuardDecision::Redirect {
            to,
            replace,
            notice,
        } => DecisionView::Redirect {
            to,
            replace: *replace,
            notice: notice.as_ref().map(format_notice),
        },
    };
    match format {
        OutputFormat::Json => print_json(&view)?,
        OutputFormat::Table => match view {
            DecisionView::Allow { path, layout } => println!("allow {path} ({layout})"),
            DecisionView::Redirect {
                to,
                replace,
                notice,
            } => {
                let mode = if replace { "replace" } else { "push" };
                println!("redirect {to} ({mode})");
                if let Some(notice) = notice {
                    println!("{notice}");
                }
            }
        },
    }
    Ok(())
}

/// Report a navigation the pipeline requested while the command ran.
pub(crate) fn report_navigation(request: Option<NavigationRequest>) {
    if let Some(request) = request {
        eprintln!("session ended; continue at {}", request.to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listing_accepts_every_paged_shape() {
        let wrapped = json!({"code": 200, "data": {"total": 2, "item": [{"id": 1}, {"id": 2}]}});
        assert_eq!(listing(&wrapped).item.len(), 2);
        assert_eq!(listing(&wrapped).total, 2);

        let records = json!({"code": 200, "data": {"total": 1, "records": [{"id": 1}]}});
        assert_eq!(listing(&records).item.len(), 1);

        let bare = json!([{"id": 1}, {"id": 2}, {"id": 3}]);
        assert_eq!(listing(&bare).total, 3);

        assert!(listing(&json!("unexpected")).item.is_empty());
    }

    #[test]
    fn payload_unwraps_only_envelopes() {
        let article = json!({"id": 1, "data": "not an envelope"});
        assert_eq!(payload(&article), &article);
        let wrapped = json!({"code": 200, "data": {"id": 1}});
        assert_eq!(payload(&wrapped), &json!({"id": 1}));
    }

    #[test]
    fn row_fields_fall_back_through_aliases() {
        let row = json!({"id": "7", "authorName": "ink"});
        assert_eq!(id_of(&row), "7");
        assert_eq!(text(&row, &["nickname", "authorName"]), "ink");
        assert_eq!(text(&row, &["title"]), "-");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("短标题", 5), "短标题");
        assert_eq!(truncate("一二三四五六", 4), "一二三…");
    }

    #[test]
    fn layouts_have_readable_labels() {
        assert_eq!(layout_label(Some(Layout::AuthorWorkspace)), "author workspace");
        assert_eq!(layout_label(None), "public");
    }
}
