use std::io::{self, IsTerminal};

use anyhow::anyhow;
use inkwell_access::services::Credentials;

use crate::cli::{LoginArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_profile;

pub(crate) async fn handle_login(ctx: &AppContext, args: LoginArgs) -> CliResult<()> {
    if let Some(phone) = args.phone {
        let code = args
            .code
            .ok_or_else(|| CliError::validation("--code is required when signing in by phone"))?;
        ctx.api.login_by_phone(&phone, &code).await?;
    } else {
        let username = args
            .username
            .ok_or_else(|| CliError::validation("--username or --phone is required"))?;
        let password = resolve_password(args.password)?;
        ctx.api.login(&Credentials { username, password }).await?;
    }
    println!("Signed in; session stored in {}.", ctx.state_dir.display());
    Ok(())
}

pub(crate) fn handle_logout(ctx: &AppContext) -> CliResult<()> {
    let was_signed_in = ctx.session().is_authenticated();
    ctx.api.logout();
    println!("{}", if was_signed_in { "Signed out." } else { "Not signed in." });
    Ok(())
}

pub(crate) async fn handle_whoami(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    if !ctx.session().is_authenticated() {
        return Err(CliError::validation("not signed in (run `inkwell login`)"));
    }
    let profile = if let Some(profile) = ctx.session().profile().get() {
        profile
    } else {
        let profile = ctx.api.user_info().await?;
        ctx.session().profile().set(profile.clone());
        profile
    };
    render_profile(&profile, format)
}

fn resolve_password(provided: Option<String>) -> CliResult<String> {
    if let Some(value) = provided {
        if value.is_empty() {
            return Err(CliError::validation("password cannot be empty"));
        }
        return Ok(value);
    }

    if io::stdin().is_terminal() {
        let password = rpassword::prompt_password("Password: ").map_err(|err| {
            CliError::failure(anyhow!("failed to read password from stdin: {err}"))
        })?;
        if password.is_empty() {
            return Err(CliError::validation("password cannot be empty"));
        }
        Ok(password)
    } else {
        Err(CliError::validation(
            "password required; supply via --password or INKWELL_PASSWORD when running non-interactively",
        ))
    }
}
