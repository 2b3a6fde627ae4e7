use anyhow::anyhow;
use inkwell_access::resolver::ListQuery;
use inkwell_access::services::SearchQuery;

use crate::cli::{ArticleArgs, ArticleListArgs, OutputFormat, SearchArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_article_detail, render_article_list};

pub(crate) async fn handle_articles(
    ctx: &AppContext,
    args: ArticleListArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let query = ListQuery {
        page: args.page,
        page_size: args.page_size,
        category_id: args.category,
        state: args.state,
    };
    let listing = ctx.api.home_articles(&query).await?;
    render_article_list(&listing, format)
}

pub(crate) async fn handle_article(
    ctx: &AppContext,
    args: ArticleArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let article = ctx.api.article_detail(args.id).await?;
    render_article_detail(&article, format)
}

pub(crate) async fn handle_search(
    ctx: &AppContext,
    args: SearchArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let query = SearchQuery {
        keyword: args.keyword,
        page: args.page,
        page_size: args.page_size,
        state: None,
    };
    let reply = ctx.api.search_articles(&query).await?;
    let value = serde_json::to_value(&reply)
        .map_err(|err| CliError::failure(anyhow!("failed to format reply: {err}")))?;
    render_article_list(&value, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context_for;
    use anyhow::Result;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn anonymous_listing_falls_back_without_credentials() -> Result<()> {
        let server = MockServer::start_async().await;
        let rejected = server.mock(|when, then| {
            when.method(GET).path("/api/article");
            then.status(401).json_body(json!({"code": 0, "message": "sign in"}));
        });
        let served = server.mock(|when, then| {
            when.method(GET)
                .path("/api/article/list")
                .query_param("state", "已发布")
                .header_missing("authorization");
            then.status(200).json_body(
                json!({"code": 200, "data": {"total": 1, "item": [{"id": 1, "title": "Hello"}]}}),
            );
        });
        let dir = tempfile::tempdir()?;
        let ctx = context_for(&server, dir.path())?;

        handle_articles(&ctx, ArticleListArgs::default(), OutputFormat::Table)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        rejected.assert();
        served.assert();
        assert!(ctx.terminal.take_navigation().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn article_detail_reports_exhaustion() -> Result<()> {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir()?;
        let ctx = context_for(&server, dir.path())?;

        let err = handle_article(&ctx, ArticleArgs { id: 9 }, OutputFormat::Json)
            .await
            .err();
        assert!(
            matches!(err, Some(CliError::Failure(ref error)) if error.to_string().starts_with("article.detail"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn blank_keyword_is_a_validation_error() -> Result<()> {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir()?;
        let ctx = context_for(&server, dir.path())?;
        let args = SearchArgs {
            keyword: " ".into(),
            ..SearchArgs::default()
        };
        let err = handle_search(&ctx, args, OutputFormat::Table).await.err();
        assert_eq!(err.map(|e| e.exit_code()), Some(2));
        Ok(())
    }

    #[tokio::test]
    async fn search_sends_keyword_and_paging() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/search")
                .query_param("keyword", "rust")
                .query_param("page", "2")
                .query_param("pageSize", "5");
            then.status(200)
                .json_body(json!({"code": 200, "data": {"total": 0, "item": []}}));
        });
        let dir = tempfile::tempdir()?;
        let ctx = context_for(&server, dir.path())?;
        let args = SearchArgs {
            keyword: "rust".into(),
            page: Some(2),
            page_size: Some(5),
        };
        handle_search(&ctx, args, OutputFormat::Json)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        mock.assert();
        Ok(())
    }
}
