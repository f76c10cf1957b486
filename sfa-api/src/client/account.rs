use crate::account::Account;
use crate::client::ApiClient;
use crate::client::error::RequestError;

/// fetches the current user's permission profile
pub struct RetrieveSelf {}

impl RetrieveSelf {
    pub fn new() -> Self {
        RetrieveSelf {}
    }

    pub async fn send(self, client: &ApiClient) -> Result<Account, RequestError> {
        let res = client.get("/self").send().await?;

        match res.status() {
            reqwest::StatusCode::OK => res.json(),
            _ => Err(res.into_status_error())
        }
    }
}

impl std::default::Default for RetrieveSelf {
    fn default() -> Self {
        RetrieveSelf::new()
    }
}
