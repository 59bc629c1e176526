use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use url::Url;
use youtrack_cli_auth::{client_secret_key, password_key, CredentialStore};
use youtrack_cli_config::{Config, OAuth2Profile};

use crate::profile::resolve_active_profile;

#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommand {
    /// Add or update a profile and store its password
    Login(LoginArgs),
    /// Record OAuth2 client-credentials settings for a profile
    Oauth2(OAuth2Args),
    /// Remove stored secrets (and optionally the profile)
    Logout(LogoutArgs),
    /// List configured profiles
    List,
    /// Log in to the server with the profile's credentials
    Test,
    /// Exchange client credentials for an access token and print it
    Token,
}

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    /// Profile name to create or update.
    #[arg(long)]
    pub profile: String,
    /// YouTrack base URL (e.g. https://example.myjetbrains.com/youtrack).
    #[arg(long)]
    pub base_url: String,
    /// Login name used on the login form.
    #[arg(long)]
    pub login: String,
    /// Password to store (falls back to YOUTRACK_PASSWORD env or interactive prompt).
    #[arg(long, env = "YOUTRACK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Mark this profile as the default one.
    #[arg(long)]
    pub default: bool,
}

#[derive(Args, Debug, Clone)]
pub struct OAuth2Args {
    /// Profile to attach the settings to.
    #[arg(long)]
    pub profile: String,
    /// Hub token endpoint.
    #[arg(long)]
    pub url: String,
    #[arg(long)]
    pub client_service_id: String,
    #[arg(long)]
    pub scope: String,
    /// Secret to store (falls back to YOUTRACK_CLIENT_SECRET env or interactive prompt).
    #[arg(long, env = "YOUTRACK_CLIENT_SECRET", hide_env_values = true)]
    pub client_service_secret: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct LogoutArgs {
    /// Profile to remove secrets for.
    #[arg(long)]
    pub profile: String,
    /// Remove the profile from config entirely (not just the stored secrets).
    #[arg(long)]
    pub remove_profile: bool,
}

pub async fn handle(
    command: AuthCommand,
    config: &mut Config,
    config_path: Option<&Path>,
    requested_profile: Option<&str>,
    store: &CredentialStore,
) -> Result<()> {
    match command {
        AuthCommand::Login(args) => login(args, config, config_path, store),
        AuthCommand::Oauth2(args) => oauth2(args, config, config_path, store),
        AuthCommand::Logout(args) => logout(args, config, config_path, store),
        AuthCommand::List => list_profiles(config, store),
        AuthCommand::Test => test_auth(config, requested_profile, store).await,
        AuthCommand::Token => token(config, requested_profile, store).await,
    }
}

fn login(
    args: LoginArgs,
    config: &mut Config,
    config_path: Option<&Path>,
    store: &CredentialStore,
) -> Result<()> {
    if args.profile.trim().is_empty() {
        return Err(anyhow!("Profile name cannot be empty"));
    }

    let base_url = Url::parse(&args.base_url)
        .with_context(|| format!("Invalid YouTrack URL: {}", args.base_url))?;

    let password = match args.password {
        Some(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password("Enter password: ")
            .context("Failed to read password from prompt")?,
    };
    if password.is_empty() {
        return Err(anyhow!("Password cannot be empty"));
    }

    let profile_entry = config.profiles.entry(args.profile.clone()).or_default();
    profile_entry.base_url = Some(base_url.as_str().trim_end_matches('/').to_string());
    profile_entry.login = Some(args.login.clone());

    if args.default || config.default_profile.is_none() {
        config.default_profile = Some(args.profile.clone());
    }

    store
        .set_secret(&password_key(&args.profile), &password)
        .context("Failed to store password")?;

    config
        .save(config_path)
        .context("Unable to persist configuration file")?;

    tracing::info!(
        profile = %args.profile,
        base_url = %base_url,
        "Profile saved and password stored"
    );
    Ok(())
}

fn oauth2(
    args: OAuth2Args,
    config: &mut Config,
    config_path: Option<&Path>,
    store: &CredentialStore,
) -> Result<()> {
    Url::parse(&args.url).with_context(|| format!("Invalid token URL: {}", args.url))?;

    let profile = config
        .profiles
        .get_mut(&args.profile)
        .ok_or_else(|| anyhow!("Profile '{}' does not exist", args.profile))?;

    let secret = match args.client_service_secret {
        Some(secret) if !secret.is_empty() => secret,
        _ => rpassword::prompt_password("Enter client service secret: ")
            .context("Failed to read secret from prompt")?,
    };
    if secret.is_empty() {
        return Err(anyhow!("Client service secret cannot be empty"));
    }

    profile.oauth2 = Some(OAuth2Profile {
        url: args.url,
        client_service_id: args.client_service_id,
        scope: args.scope,
    });

    store
        .set_secret(&client_secret_key(&args.profile), &secret)
        .context("Failed to store client service secret")?;

    config
        .save(config_path)
        .context("Unable to persist configuration file")?;

    tracing::info!(profile = %args.profile, "OAuth2 settings saved");
    Ok(())
}

fn logout(
    args: LogoutArgs,
    config: &mut Config,
    config_path: Option<&Path>,
    store: &CredentialStore,
) -> Result<()> {
    if !config.profiles.contains_key(&args.profile) {
        return Err(anyhow!("Profile '{}' does not exist", args.profile));
    }

    store
        .delete_secret(&password_key(&args.profile))
        .context("Failed to delete password")?;
    store
        .delete_secret(&client_secret_key(&args.profile))
        .context("Failed to delete client service secret")?;

    if args.remove_profile {
        config.profiles.remove(&args.profile);
        if config.default_profile.as_deref() == Some(args.profile.as_str()) {
            config.default_profile = config.profiles.keys().next().cloned();
        }
    }

    config
        .save(config_path)
        .context("Unable to persist configuration file")?;
    tracing::info!(profile = %args.profile, "Credentials removed");
    Ok(())
}

fn list_profiles(config: &Config, store: &CredentialStore) -> Result<()> {
    #[derive(Serialize)]
    struct Row<'a> {
        name: &'a str,
        base_url: &'a str,
        login: &'a str,
        has_password: bool,
        has_oauth2: bool,
        is_default: bool,
    }

    let mut rows = Vec::new();
    for (name, profile) in &config.profiles {
        rows.push(Row {
            name,
            base_url: profile.base_url.as_deref().unwrap_or(""),
            login: profile.login.as_deref().unwrap_or(""),
            has_password: store.get_secret(&password_key(name))?.is_some(),
            has_oauth2: profile.oauth2.is_some(),
            is_default: config.default_profile.as_deref() == Some(name.as_str()),
        });
    }

    if rows.is_empty() {
        tracing::info!("No profiles configured yet. Use `youtrack-cli auth login` to add one.");
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

async fn test_auth(
    config: &Config,
    requested_profile: Option<&str>,
    store: &CredentialStore,
) -> Result<()> {
    let profile = resolve_active_profile(config, requested_profile, store)?;
    let mut client = profile.cookie_client()?;

    println!("Testing login for profile '{}'...", profile.name);

    let logged_in = client.login().await.context("Login request failed")?;

    if !logged_in {
        return Err(anyhow!("Login refused for profile '{}'", profile.name));
    }

    println!("Login successful");
    println!("   Profile: {}", profile.name);
    println!("   Base URL: {}", profile.base_url);
    println!(
        "   Session cookie: {}",
        if client.state().auth_cookie.is_some() {
            "received"
        } else {
            "none"
        }
    );
    Ok(())
}

async fn token(
    config: &Config,
    requested_profile: Option<&str>,
    store: &CredentialStore,
) -> Result<()> {
    let profile = resolve_active_profile(config, requested_profile, store)?;
    let mut client = profile.token_client()?;
    let token = client
        .get_access_token()
        .await
        .context("Token exchange failed")?;

    println!("{}", serde_json::to_string_pretty(&token)?);
    Ok(())
}
