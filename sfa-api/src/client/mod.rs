use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::{Method, StatusCode};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use sfa_lib::locale::{RequestKind, FALLBACK_LANGUAGE};

pub mod error;
pub mod transport;
pub mod retry;
pub mod vault;
pub mod session;
pub mod permissions;
pub mod account;
pub mod i18n;

use error::{ApiClientError, RequestError, StatusError};
use retry::RetryPolicy;
use session::SessionStore;
use transport::{ReqwestTransport, Transport, TransportError, TransportRequest};
use vault::{FileVault, MemoryVault};

pub const ACCEPT_LANG: &str = "accept-lang";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

struct ClientInner {
    transport: Arc<dyn Transport>,
    base_url: Url,
    session: SessionStore,
    retry: RetryPolicy,
}

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

/// per-call record; `attempts` bounds automatic resends
struct RequestContext {
    method: Method,
    url: Url,
    headers: HeaderMap,
    attempts: u8,
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder {
            url: Url::parse("http://localhost/").unwrap(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::new(),
            agent: None,
            vault_file: None,
            session: None,
            transport: None,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    pub fn get<U>(&self, path: U) -> ApiRequestBuilder<'_>
    where
        U: AsRef<str>
    {
        self.request(Method::GET, path)
    }

    pub fn post<U>(&self, path: U) -> ApiRequestBuilder<'_>
    where
        U: AsRef<str>
    {
        self.request(Method::POST, path)
    }

    pub fn put<U>(&self, path: U) -> ApiRequestBuilder<'_>
    where
        U: AsRef<str>
    {
        self.request(Method::PUT, path)
    }

    pub fn patch<U>(&self, path: U) -> ApiRequestBuilder<'_>
    where
        U: AsRef<str>
    {
        self.request(Method::PATCH, path)
    }

    pub fn delete<U>(&self, path: U) -> ApiRequestBuilder<'_>
    where
        U: AsRef<str>
    {
        self.request(Method::DELETE, path)
    }

    fn request<U>(&self, method: Method, path: U) -> ApiRequestBuilder<'_>
    where
        U: AsRef<str>
    {
        let url = self.inner.base_url.join(path.as_ref()).unwrap();

        ApiRequestBuilder {
            client: self,
            method,
            url,
            headers: HeaderMap::new(),
            body: Ok(None),
        }
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        mut headers: HeaderMap,
        body: Option<Bytes>
    ) -> Result<ApiResponse, RequestError> {
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let kind = RequestKind::classify(url.path());
        let lang = self.inner.session.resolve_language(&kind);
        let lang = HeaderValue::from_str(&lang)
            .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_LANGUAGE));

        headers.insert(ACCEPT_LANG, lang);

        if let Some(token) = self.inner.session.auth_token() {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                },
                Err(_) => {
                    tracing::warn!("stored auth token is not a valid header value; sending unauthenticated");
                }
            }
        }

        let mut context = RequestContext {
            method,
            url,
            headers,
            attempts: 0,
        };

        loop {
            let request = TransportRequest {
                method: context.method.clone(),
                url: context.url.clone(),
                headers: context.headers.clone(),
                body: body.clone(),
            };

            match self.inner.transport.execute(request).await {
                Ok(res) if res.status == StatusCode::UNAUTHORIZED => {
                    if let Err(err) = self.inner.session.clear() {
                        tracing::error!("failed clearing session after 401: {}", err);
                    }

                    return Err(RequestError::AuthExpired);
                },
                Ok(res) => {
                    return Ok(ApiResponse {
                        status: res.status,
                        headers: res.headers,
                        body: res.body,
                    });
                },
                Err(TransportError::Timeout) => {
                    return Err(RequestError::Timeout);
                },
                Err(TransportError::Network(source)) => {
                    if context.attempts >= self.inner.retry.max_retries {
                        return Err(RequestError::Network(source));
                    }

                    tracing::warn!(
                        "network failure for {} {}; retrying: {}",
                        context.method,
                        context.url,
                        source
                    );

                    tokio::time::sleep(self.inner.retry.delay).await;

                    context.attempts += 1;
                }
            }
        }
    }
}

pub struct ApiRequestBuilder<'a> {
    client: &'a ApiClient,
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Result<Option<Bytes>, serde_json::Error>,
}

impl<'a> ApiRequestBuilder<'a> {
    pub fn header<V>(mut self, name: &'static str, value: V) -> Self
    where
        V: AsRef<str>
    {
        match HeaderValue::from_str(value.as_ref()) {
            Ok(value) => {
                self.headers.insert(name, value);
            },
            Err(_) => {
                tracing::warn!("discarding invalid header value for {:?}", name);
            }
        }

        self
    }

    pub fn json<T>(mut self, body: &T) -> Self
    where
        T: Serialize
    {
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = serde_json::to_vec(body).map(|raw| Some(Bytes::from(raw)));

        self
    }

    pub async fn send(self) -> Result<ApiResponse, RequestError> {
        let body = self.body?;

        self.client.send(self.method, self.url, self.headers, body).await
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn json<T>(&self) -> Result<T, RequestError>
    where
        T: DeserializeOwned
    {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn into_status_error(self) -> RequestError {
        RequestError::Status(StatusError {
            status: self.status,
            body: self.body,
        })
    }
}

pub struct ApiClientBuilder {
    url: Url,
    timeout: Duration,
    retry: RetryPolicy,
    agent: Option<String>,
    vault_file: Option<PathBuf>,
    session: Option<SessionStore>,
    transport: Option<Arc<dyn Transport>>,
}

impl ApiClientBuilder {
    pub fn secure(&mut self, is_secure: bool) {
        if is_secure {
            self.url.set_scheme("https").unwrap();
        } else {
            self.url.set_scheme("http").unwrap();
        }
    }

    pub fn host<H>(&mut self, host: H) -> bool
    where
        H: AsRef<str>
    {
        self.url.set_host(Some(host.as_ref())).is_ok()
    }

    pub fn port(&mut self, port: Option<u16>) {
        self.url.set_port(port).unwrap()
    }

    pub fn base_url(&mut self, url: Url) {
        self.url = url;
    }

    pub fn timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn retry(&mut self, retry: RetryPolicy) {
        self.retry = retry;
    }

    pub fn user_agent<U>(&mut self, user_agent: U)
    where
        U: Into<String>
    {
        self.agent = Some(user_agent.into());
    }

    pub fn vault_file(&mut self, path: PathBuf) {
        self.vault_file = Some(path);
    }

    pub fn session_store(&mut self, store: SessionStore) {
        self.session = Some(store);
    }

    pub fn transport(&mut self, transport: Arc<dyn Transport>) {
        self.transport = Some(transport);
    }

    pub fn build(self) -> Result<ApiClient, ApiClientError> {
        let session = match (self.session, self.vault_file) {
            (Some(store), _) => store,
            (None, Some(path)) => SessionStore::new(Arc::new(FileVault::load(path)?)),
            (None, None) => SessionStore::new(Arc::new(MemoryVault::new())),
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let user_agent = self.agent.unwrap_or("sfa-api-client/0.1.0".into());
                let client = reqwest::Client::builder()
                    .timeout(self.timeout)
                    .user_agent(user_agent)
                    .build()?;

                Arc::new(ReqwestTransport::new(client))
            }
        };

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                transport,
                base_url: self.url,
                session,
                retry: self.retry,
            })
        })
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;
    use crate::client::session::Session;
    use crate::client::transport::testing::MockTransport;
    use crate::account::Role;
    use sfa_lib::locale::LocalePreference;

    fn test_client(transport: Arc<MockTransport>) -> (ApiClient, SessionStore) {
        let store = SessionStore::new(Arc::new(MemoryVault::new()));
        let mut builder = ApiClient::builder();

        builder.session_store(store.clone());
        builder.transport(transport);

        (builder.build().unwrap(), store)
    }

    #[tokio::test]
    async fn attaches_auth_and_locale_headers() {
        let mock = MockTransport::new();
        mock.respond(200, "{}");

        let (client, store) = test_client(mock.clone());

        store.set_auth_token("token").unwrap();
        store.set_locale(&LocalePreference {
            local_language: Some(String::from("en")),
            form_language: Some(String::from("fr")),
        }).unwrap();

        client.get("/products").send().await.unwrap();

        let request = mock.request(0);

        assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "Bearer token");
        assert_eq!(request.headers.get(ACCEPT_LANG).unwrap(), "fr");
        assert_eq!(request.headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(request.url.as_str(), "http://localhost/products");
    }

    #[tokio::test]
    async fn omits_authorization_without_token() {
        let mock = MockTransport::new();
        mock.respond(200, "{}");

        let (client, _store) = test_client(mock.clone());

        client.get("/products").send().await.unwrap();

        let request = mock.request(0);

        assert!(request.headers.get(AUTHORIZATION).is_none());
        assert_eq!(request.headers.get(ACCEPT_LANG).unwrap(), FALLBACK_LANGUAGE);
    }

    #[tokio::test]
    async fn translation_requests_ignore_form_override() {
        let mock = MockTransport::new();
        mock.respond(200, "{}");

        let (client, store) = test_client(mock.clone());

        store.set_locale(&LocalePreference {
            local_language: Some(String::from("en")),
            form_language: Some(String::from("fr")),
        }).unwrap();

        client.get("/translation/admin").send().await.unwrap();

        assert_eq!(mock.request(0).headers.get(ACCEPT_LANG).unwrap(), "en");
    }

    #[tokio::test]
    async fn unauthorized_clears_session_and_signals() {
        let mock = MockTransport::new();
        mock.respond(401, "");

        let (client, store) = test_client(mock.clone());

        store.set(Session {
            auth_token: Some(String::from("token")),
            user_entity: Some(String::from("user")),
            role: Some(Role { name: String::from("manager") }),
            account: Some(Default::default()),
        }).unwrap();
        store.set_locale(&LocalePreference {
            local_language: Some(String::from("en")),
            form_language: None,
        }).unwrap();

        let err = client.get("/products").send().await.unwrap_err();

        assert!(matches!(err, RequestError::AuthExpired), "got {:?}", err);

        let session = store.get();

        assert!(session.auth_token.is_none());
        assert!(session.user_entity.is_none());
        assert!(session.role.is_none());
        assert!(session.account.is_none());
        assert_eq!(store.locale().local_language.as_deref(), Some("en"));

        // a second 401 against the now empty store is a no-op teardown
        mock.respond(401, "");

        let err = client.get("/products").send().await.unwrap_err();

        assert!(matches!(err, RequestError::AuthExpired), "got {:?}", err);
        assert_eq!(mock.calls(), 2, "401 is terminal; no retry");
    }

    #[tokio::test(start_paused = true)]
    async fn retries_once_after_network_failure() {
        let mock = MockTransport::new();
        mock.fail_network();
        mock.respond(200, "{}");

        let (client, _store) = test_client(mock.clone());
        let started = tokio::time::Instant::now();

        let res = client.get("/products").send().await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(mock.calls(), 2);
        assert!(started.elapsed() >= Duration::from_millis(1000), "resend happens after the fixed backoff");
    }

    #[tokio::test(start_paused = true)]
    async fn second_network_failure_is_surfaced() {
        let mock = MockTransport::new();
        mock.fail_network();
        mock.fail_network();

        let (client, _store) = test_client(mock.clone());

        let err = client.get("/products").send().await.unwrap_err();

        assert!(matches!(err, RequestError::Network(_)), "got {:?}", err);
        assert_eq!(mock.calls(), 2, "at most one automatic resend");
    }

    #[tokio::test]
    async fn timeout_is_not_retried() {
        let mock = MockTransport::new();
        mock.fail_timeout();

        let (client, _store) = test_client(mock.clone());

        let err = client.get("/products").send().await.unwrap_err();

        assert!(matches!(err, RequestError::Timeout), "got {:?}", err);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn error_statuses_pass_through_verbatim() {
        let mock = MockTransport::new();
        mock.respond(500, "backend exploded");

        let (client, _store) = test_client(mock.clone());

        let res = client.get("/products").send().await.unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.body().as_ref(), b"backend exploded");
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_request_never_resends() {
        let mock = MockTransport::new();
        mock.fail_network();
        mock.respond(200, "{}");

        let (client, _store) = test_client(mock.clone());

        let handle = tokio::spawn(async move {
            client.get("/products").send().await
        });

        // let the first attempt fail and the backoff begin
        tokio::time::sleep(Duration::from_millis(10)).await;

        handle.abort();

        let _ = handle.await;

        tokio::time::sleep(Duration::from_millis(2000)).await;

        assert_eq!(mock.calls(), 1, "abandoned requests must not fire their retry");
    }

    #[tokio::test]
    async fn cleared_session_is_not_reused() {
        let mock = MockTransport::new();
        mock.respond(200, "{}");
        mock.respond(200, "{}");

        let (client, store) = test_client(mock.clone());

        store.set_auth_token("token").unwrap();

        client.get("/products").send().await.unwrap();

        store.clear().unwrap();

        client.get("/products").send().await.unwrap();

        assert!(mock.request(0).headers.get(AUTHORIZATION).is_some());
        assert!(mock.request(1).headers.get(AUTHORIZATION).is_none(), "no stale token reuse after clear");
    }

    #[test]
    fn builder_shapes_the_base_url() {
        let mut builder = ApiClient::builder();

        builder.secure(true);
        assert!(builder.host("api.storefront.test"));
        builder.port(None);

        let client = builder.build().unwrap();

        assert_eq!(client.inner.base_url.as_str(), "https://api.storefront.test/");
    }
}
