//! Command implementations.

pub mod enroll;
pub mod invites;
pub mod queue;
pub mod status;
pub mod users;

use rasenmaeher_client::{ApiClient, ClientError, Config, LocalStore};

/// Shared per-invocation state: the API client and the local state store,
/// with any persisted credential already installed on the client.
pub struct Context {
    pub client: ApiClient,
    pub store: LocalStore,
}

/// Build the command context from the environment.
pub async fn context() -> Result<Context, ClientError> {
    let config = Config::from_env()?;
    let client = ApiClient::new(&config);
    let store = LocalStore::open(&config.state_dir, client.base_url())?;

    // The environment token wins; otherwise fall back to the persisted one.
    if !client.has_token().await
        && let Some(token) = store.token()
    {
        client.set_token(token).await;
    }

    Ok(Context { client, store })
}
