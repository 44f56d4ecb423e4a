#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration as StdDuration,
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use spotauth::{
    error::{AuthError, StoreError},
    management::{CredentialStore, MemoryCredentialStore, TokenAuthority},
    spotify::auth::TokenEndpoint,
    types::{Credential, TokenGrant, TokenResponse},
    utils::ManualClock,
};
use tokio::sync::Semaphore;

pub const REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn token_response(access: &str, refresh: Option<&str>) -> TokenResponse {
    TokenResponse {
        access_token: access.to_string(),
        expires_in: 3600,
        refresh_token: refresh.map(str::to_string),
        scope: "user-read-private".to_string(),
        token_type: "Bearer".to_string(),
    }
}

pub fn credential_expiring_in(secs: i64, refresh: Option<&str>) -> Credential {
    Credential {
        access_token: "access-1".to_string(),
        refresh_token: refresh.map(str::to_string),
        expires_at: t0() + Duration::seconds(secs),
        scope: "user-read-private".to_string(),
        token_type: "Bearer".to_string(),
    }
}

/// Token endpoint double: answers from a script, counts calls, and can hold
/// refresh answers back until released. Code exchanges are never held.
pub struct ScriptedEndpoint {
    calls: AtomicUsize,
    answered: AtomicUsize,
    grants: Mutex<Vec<TokenGrant>>,
    responses: Mutex<VecDeque<Result<TokenResponse, AuthError>>>,
    gate: Semaphore,
    panic_next: AtomicBool,
}

impl ScriptedEndpoint {
    /// Answers immediately.
    pub fn open() -> Arc<Self> {
        Arc::new(Self::with_permits(Semaphore::MAX_PERMITS))
    }

    /// Holds every refresh answer until [`ScriptedEndpoint::release`].
    pub fn held() -> Arc<Self> {
        Arc::new(Self::with_permits(0))
    }

    fn with_permits(permits: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            answered: AtomicUsize::new(0),
            grants: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
            gate: Semaphore::new(permits),
            panic_next: AtomicBool::new(false),
        }
    }

    pub fn push(&self, response: Result<TokenResponse, AuthError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Makes the next request to pass the gate panic instead of responding.
    pub fn panic_next(&self) {
        self.panic_next.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests that made it past the gate.
    pub fn answered(&self) -> usize {
        self.answered.load(Ordering::SeqCst)
    }

    pub fn grants(&self) -> Vec<TokenGrant> {
        self.grants.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenEndpoint for ScriptedEndpoint {
    async fn request_token(&self, grant: &TokenGrant) -> Result<TokenResponse, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.grants.lock().unwrap().push(grant.clone());

        // answers are taken in call order, whenever they are released
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AuthError::Transport("no scripted response".to_string())));

        if let TokenGrant::RefreshToken { .. } = grant {
            self.gate
                .acquire()
                .await
                .expect("gate closed")
                .forget();
        }

        self.answered.fetch_add(1, Ordering::SeqCst);
        if self.panic_next.swap(false, Ordering::SeqCst) {
            panic!("token endpoint blew up");
        }
        response
    }
}

/// Store that loads fine but refuses every write.
pub struct ReadOnlyStore {
    credential: Option<Credential>,
}

impl ReadOnlyStore {
    pub fn new(credential: Option<Credential>) -> Arc<Self> {
        Arc::new(Self { credential })
    }
}

#[async_trait]
impl CredentialStore for ReadOnlyStore {
    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self.credential.clone())
    }

    async fn save(&self, _credential: &Credential) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("read-only file system")))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub struct Harness {
    pub authority: TokenAuthority,
    pub endpoint: Arc<ScriptedEndpoint>,
    pub store: Arc<MemoryCredentialStore>,
    pub clock: Arc<ManualClock>,
}

pub async fn harness(
    endpoint: Arc<ScriptedEndpoint>,
    credential: Option<Credential>,
) -> Harness {
    let store = Arc::new(match credential {
        Some(c) => MemoryCredentialStore::with_credential(c),
        None => MemoryCredentialStore::new(),
    });
    let clock = Arc::new(ManualClock::new(t0()));

    let authority = TokenAuthority::restore(
        REDIRECT_URI,
        endpoint.clone(),
        store.clone(),
        clock.clone(),
    )
    .await
    .expect("memory store never fails");

    Harness {
        authority,
        endpoint,
        store,
        clock,
    }
}

/// Yields until `waiters` callers are queued on a refresh the endpoint has
/// already seen, failing the test after a few seconds.
pub async fn wait_for_waiters(h: &Harness, waiters: usize) {
    tokio::time::timeout(StdDuration::from_secs(5), async {
        while h.authority.pending_callers().await < waiters || h.endpoint.calls() == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("waiters never queued");
}
