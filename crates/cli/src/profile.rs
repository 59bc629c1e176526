use anyhow::{anyhow, Result};
use tracing::warn;
use youtrack_cli_api::{Credentials, OAuth2Config, YouTrackClient};
use youtrack_cli_auth::{client_secret_key, password_key, CredentialStore};
use youtrack_cli_config::Config;

/// A resolved profile with its secrets looked up.
pub struct ActiveProfile {
    pub name: String,
    pub base_url: String,
    pub login: Option<String>,
    pub password: Option<String>,
    pub oauth2: Option<OAuth2Config>,
}

impl ActiveProfile {
    pub fn credentials(&self) -> Result<Credentials> {
        let name = &self.name;
        let login = self
            .login
            .as_deref()
            .ok_or_else(|| anyhow!("Profile '{name}' is missing a login."))?;
        let password = self.password.as_deref().ok_or_else(|| {
            anyhow!(
                "No password found for profile '{name}'. Set YOUTRACK_PASSWORD_{} or run `youtrack-cli auth login --profile {name}`",
                env_suffix(name)
            )
        })?;
        Ok(Credentials::login_password(login, password))
    }

    /// Client for the login form; fails when the login or password is unknown.
    pub fn cookie_client(&self) -> Result<YouTrackClient> {
        let credentials = self.credentials()?;
        Ok(YouTrackClient::new(
            &self.base_url,
            credentials,
            self.oauth2.clone(),
        )?)
    }

    /// Client for the client-credentials exchange; needs OAuth2 settings and a secret.
    pub fn token_client(&self) -> Result<YouTrackClient> {
        let name = &self.name;
        let oauth2 = self.oauth2.clone().ok_or_else(|| {
            anyhow!(
                "Profile '{name}' has no usable OAuth2 settings. Run `youtrack-cli auth oauth2 --profile {name}` or set YOUTRACK_CLIENT_SECRET_{}",
                env_suffix(name)
            )
        })?;
        Ok(YouTrackClient::new(
            &self.base_url,
            Credentials::default(),
            Some(oauth2),
        )?)
    }
}

pub fn resolve_active_profile(
    config: &Config,
    requested: Option<&str>,
    store: &CredentialStore,
) -> Result<ActiveProfile> {
    let (name, profile) = config
        .resolve_profile(requested)
        .ok_or_else(|| anyhow!("No profile configured. Run `youtrack-cli auth login` first."))?;

    let base_url = profile
        .base_url
        .clone()
        .ok_or_else(|| anyhow!("Profile '{name}' is missing a base_url."))?;

    let password = lookup_secret(name, "YOUTRACK_PASSWORD", &password_key(name), store)?;

    let oauth2 = match &profile.oauth2 {
        Some(settings) => {
            match lookup_secret(name, "YOUTRACK_CLIENT_SECRET", &client_secret_key(name), store)? {
                Some(secret) => Some(OAuth2Config {
                    url: settings.url.clone(),
                    client_service_id: settings.client_service_id.clone(),
                    client_service_secret: secret,
                    scope: settings.scope.clone(),
                }),
                None => {
                    warn!(profile = name, "OAuth2 settings present but no client service secret");
                    None
                }
            }
        }
        None => None,
    };

    Ok(ActiveProfile {
        name: name.to_string(),
        base_url,
        login: profile.login.clone(),
        password,
        oauth2,
    })
}

/// Profile env var → generic env var → credential store.
fn lookup_secret(
    profile: &str,
    env_prefix: &str,
    store_key: &str,
    store: &CredentialStore,
) -> Result<Option<String>> {
    let from_env = std::env::var(format!("{env_prefix}_{}", env_suffix(profile)))
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            std::env::var(env_prefix)
                .ok()
                .filter(|s| !s.trim().is_empty())
        });

    match from_env {
        Some(secret) => Ok(Some(secret)),
        None => store.get_secret(store_key),
    }
}

fn env_suffix(profile: &str) -> String {
    profile.to_uppercase().replace('-', "_")
}
