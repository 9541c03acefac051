use secrecy::ExposeSecret as _;
use social_auth::{
    config::ProviderConfig,
    credentials::Consumer,
    flow::{AnyAccessToken, CallbackParams, ProviderRegistry},
    prelude::*,
};
use snafu::prelude::*;
use tracing_subscriber::EnvFilter;

#[snafu::report]
#[tokio::main]
pub async fn main() -> Result<(), snafu::Whatever> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let consumer = Consumer::from_env("CLIENT_ID", "CLIENT_SECRET")
        .whatever_context("Failed to read client credentials")?;

    let config: ProviderConfig = serde_json::from_value(serde_json::json!({
        "name": "github",
        "protocol": "oauth2",
        "base_uri": "https://api.github.com/",
        "authorize_uri": "https://github.com/login/oauth/authorize",
        "access_token_uri": "https://github.com/login/oauth/access_token",
        "redirect_uri_base": "http://localhost:8080/auth/cb",
        "scope": ["read:user"]
    }))
    .whatever_context("Invalid provider configuration")?;

    let registry = ProviderRegistry::from_configs([(config, consumer)])
        .whatever_context("Failed to build provider registry")?;
    let provider = registry
        .get("github")
        .whatever_context("Provider is not registered")?;

    let http_client = reqwest::Client::new();

    let mut flow = provider.new_flow();
    let authorization_url = provider
        .make_auth_url(&http_client, &mut flow)
        .await
        .whatever_context("Getting authorization URL failed")?;

    println!("Authorization URL: {authorization_url}");
    println!("Paste the URL you were redirected to:");

    let mut redirected = String::new();
    std::io::stdin()
        .read_line(&mut redirected)
        .whatever_context("Failed to read redirect URL")?;
    let redirected: http::Uri = redirected
        .trim()
        .parse()
        .whatever_context("Invalid redirect URL")?;

    let token = provider
        .exchange_for_token(
            &http_client,
            &mut flow,
            &CallbackParams::from_uri(&redirected),
        )
        .await
        .whatever_context("Getting access token failed")?;

    match token {
        AnyAccessToken::OAuth2(token) => {
            println!("Access token: {}", token.expose_secret());
        }
        AnyAccessToken::OAuth1(token) => {
            println!("Access token: {}", token.token().key());
        }
    }

    Ok(())
}
