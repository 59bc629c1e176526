use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use youtrack_cli_api::{NewIssue, YouTrackClient};

use crate::profile::ActiveProfile;

#[derive(Subcommand, Debug, Clone)]
pub enum IssueCommand {
    /// Create a new issue
    Create(CreateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Project short name (e.g. SP)
    #[arg(long)]
    pub project: String,
    #[arg(long)]
    pub summary: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// Group allowed to see the issue
    #[arg(long)]
    pub permitted_group: Option<String>,
    /// Authenticate with an OAuth2 access token instead of the login form
    #[arg(long)]
    pub oauth2: bool,
}

pub async fn execute(command: IssueCommand, profile: &ActiveProfile) -> Result<()> {
    match command {
        IssueCommand::Create(args) => {
            let client = if args.oauth2 {
                profile.token_client()?
            } else {
                profile.cookie_client()?
            };
            create_issue(client, args).await
        }
    }
}

async fn create_issue(mut client: YouTrackClient, args: CreateArgs) -> Result<()> {
    if args.oauth2 {
        client
            .get_access_token()
            .await
            .context("Token exchange failed")?;
    } else if !client.login().await.context("Login request failed")? {
        return Err(anyhow!("Login refused by the server"));
    }

    let mut issue = NewIssue::new(&args.project, &args.summary).with_description(&args.description);
    if let Some(group) = &args.permitted_group {
        issue = issue.with_permitted_group(group);
    }

    if !client.issues().create(&issue).await? {
        return Err(anyhow!("Issue was not created in project {}", args.project));
    }

    tracing::info!(project = %args.project, summary = %args.summary, "Issue created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use youtrack_cli_api::{Credentials, OAuth2Config};

    fn args(oauth2: bool) -> CreateArgs {
        CreateArgs {
            project: "SP".to_string(),
            summary: "This is summary".to_string(),
            description: "This is description".to_string(),
            permitted_group: None,
            oauth2,
        }
    }

    fn client(server: &MockServer) -> YouTrackClient {
        YouTrackClient::new(
            server.uri(),
            Credentials::login_password("root", "secret"),
            Some(OAuth2Config {
                url: format!("{}/hub/api/rest/oauth2/token", server.uri()),
                client_service_id: "client".to_string(),
                client_service_secret: "secret".to_string(),
                scope: "scope".to_string(),
            }),
        )
        .unwrap()
    }

    fn profile(server: &MockServer, password: Option<&str>) -> ActiveProfile {
        ActiveProfile {
            name: "work".to_string(),
            base_url: server.uri(),
            login: Some("root".to_string()),
            password: password.map(str::to_string),
            oauth2: None,
        }
    }

    #[tokio::test]
    async fn test_execute_without_password_sends_nothing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/user/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<login>ok</login>"))
            .expect(0)
            .mount(&mock_server)
            .await;

        let err = execute(
            IssueCommand::Create(args(false)),
            &profile(&mock_server, None),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("No password found for profile 'work'"));
        assert!(err.to_string().contains("YOUTRACK_PASSWORD_WORK"));
    }

    #[tokio::test]
    async fn test_execute_with_oauth2_flag_requires_settings() {
        let mock_server = MockServer::start().await;

        let err = execute(
            IssueCommand::Create(args(true)),
            &profile(&mock_server, Some("hunter2")),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("no usable OAuth2 settings"));
    }

    #[tokio::test]
    async fn test_execute_uses_profile_password() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/user/login"))
            .and(body_string_contains("password=hunter2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<login>ok</login>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/rest/issue"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&mock_server)
            .await;

        execute(
            IssueCommand::Create(args(false)),
            &profile(&mock_server, Some("hunter2")),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_create_with_cookie_login() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/user/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Set-Cookie", "JSESSIONID=xyz; Path=/")
                    .set_body_string("<login>ok</login>"),
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/rest/issue"))
            .and(query_param("project", "SP"))
            .and(header("Cookie", "JSESSIONID=xyz"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        create_issue(client(&mock_server), args(false)).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_with_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/hub/api/rest/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/rest/issue"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        create_issue(client(&mock_server), args(true)).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_fails_when_login_refused() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/user/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string("something unexpected"))
            .mount(&mock_server)
            .await;

        let err = create_issue(client(&mock_server), args(false))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("Got unexpected response"));
    }

    #[tokio::test]
    async fn test_create_reports_rejected_issue() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/user/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<login>ok</login>"))
            .mount(&mock_server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/rest/issue"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let err = create_issue(client(&mock_server), args(false))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Issue was not created"));
    }
}
