use inkwell_access::resolver::{CommentDraft, CommentQuery};

use crate::cli::{CommentArgs, CommentListArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{print_json, render_comments};

pub(crate) async fn handle_comments(
    ctx: &AppContext,
    args: CommentListArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let query = CommentQuery {
        page: args.page,
        page_size: args.page_size,
    };
    let comments = ctx.api.list_comments(args.article_id, query).await?;
    render_comments(&comments, format)
}

pub(crate) async fn handle_comment(
    ctx: &AppContext,
    args: CommentArgs,
    format: OutputFormat,
) -> CliResult<()> {
    if !ctx.session().is_authenticated() {
        return Err(CliError::validation(
            "commenting requires a session (run `inkwell login`)",
        ));
    }
    let draft = CommentDraft {
        article_id: args.article_id,
        content: args.content,
        parent_id: args.parent,
    };
    let reply = ctx.api.submit_comment(&draft).await?;
    match format {
        OutputFormat::Json => print_json(&reply),
        OutputFormat::Table => {
            println!("Comment posted on article {}.", draft.article_id);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context_for;
    use anyhow::{Result, anyhow};
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn comment_retries_alternate_routes_with_one_header() -> Result<()> {
        let server = MockServer::start_async().await;
        let first = server.mock(|when, then| {
            when.method(POST)
                .path("/api/article/5/comment")
                .header("authorization", "Bearer tok");
            then.status(404);
        });
        let second = server.mock(|when, then| {
            when.method(POST)
                .path("/api/article/comment")
                .header("authorization", "Bearer tok")
                .json_body(json!({
                    "articleId": 5, "article_id": 5, "aid": 5,
                    "content": "nice", "parentId": 0, "parent_id": 0
                }));
            then.status(200).json_body(json!({"code": 200, "message": "ok"}));
        });
        let dir = tempfile::tempdir()?;
        let ctx = context_for(&server, dir.path())?;
        ctx.session().credential().set("tok")?;

        let args = CommentArgs {
            article_id: 5,
            content: "nice".into(),
            parent: None,
        };
        handle_comment(&ctx, args, OutputFormat::Table)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        first.assert();
        second.assert();
        Ok(())
    }

    #[tokio::test]
    async fn anonymous_comment_is_refused_locally() -> Result<()> {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir()?;
        let ctx = context_for(&server, dir.path())?;
        let args = CommentArgs {
            article_id: 5,
            content: "nice".into(),
            parent: None,
        };
        let err = handle_comment(&ctx, args, OutputFormat::Table).await.err();
        assert_eq!(err.map(|e| e.exit_code()), Some(2));
        Ok(())
    }

    #[tokio::test]
    async fn comment_listing_uses_the_first_answering_route() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/article/3/comments");
            then.status(200).json_body(json!({
                "code": 200,
                "data": {"total": 1, "item": [{"id": 1, "nickname": "ink", "content": "hi"}]}
            }));
        });
        let dir = tempfile::tempdir()?;
        let ctx = context_for(&server, dir.path())?;
        let args = CommentListArgs {
            article_id: 3,
            ..CommentListArgs::default()
        };
        handle_comments(&ctx, args, OutputFormat::Table)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        mock.assert();
        Ok(())
    }
}
