use social_auth::{
    config::{Protocol, ProviderConfig},
    credentials::Consumer,
    flow::{
        CallbackParams,
        oauth1::{OAuth1FlowState, OAuth1Provider},
    },
    http::{TransportOptions, reqwest_client},
};
use snafu::prelude::*;
use tracing_subscriber::EnvFilter;

#[snafu::report]
#[tokio::main]
pub async fn main() -> Result<(), snafu::Whatever> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let consumer = Consumer::from_env("CONSUMER_KEY", "CONSUMER_SECRET")
        .whatever_context("Failed to read consumer credentials")?;

    let config = ProviderConfig::builder()
        .name("twitter")
        .protocol(Protocol::OAuth1)
        .base_uri("https://api.twitter.com/1.1/")
        .whatever_context("Invalid base URI")?
        .authorize_uri("https://api.twitter.com/oauth/authenticate")
        .whatever_context("Invalid authorize URI")?
        .request_token_uri("https://api.twitter.com/oauth/request_token")
        .whatever_context("Invalid request token URI")?
        .access_token_uri("https://api.twitter.com/oauth/access_token")
        .whatever_context("Invalid access token URI")?
        .redirect_uri_base("http://localhost:8080/auth/cb")
        .build();

    let transport = TransportOptions::default();
    let http_client =
        reqwest_client(&transport).whatever_context("Failed to build HTTP client")?;

    let provider = OAuth1Provider::builder()
        .config(config)
        .consumer(consumer)
        .transport(transport)
        .build()
        .whatever_context("Invalid provider configuration")?;

    let mut flow = OAuth1FlowState::default();
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

    let access_token = provider
        .get_access_token_by_request_parameters(
            &http_client,
            &mut flow,
            &CallbackParams::from_uri(&redirected),
        )
        .await
        .whatever_context("Getting access token failed")?;

    println!("Access token: {}", access_token.token().key());
    if let Some(user_id) = access_token.user_id() {
        println!("User ID: {user_id}");
    }

    Ok(())
}
