//! Integration tests for the session cache.
//!
//! A fake vCenter stands in for the network. It counts logins and probes,
//! can expire every session at once, and can be slowed down to exercise
//! cancellation and concurrent callers.

use async_trait::async_trait;
use capv_session::{
    CacheConfig, CallContext, Credentials, EndpointSpec, SessionCache, SessionError, SessionKey,
};
use capv_vim::{Connection, Connector, Datacenter, Endpoint, ManagedObjectReference, VimError};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const VM_INSTANCE_UUID: &str = "5012c3a4-0000-4000-8000-00000000002a";
const VM_BIOS_UUID: &str = "4213a8c5-0000-4000-8000-00000000002a";
const MISSING_UUID: &str = "00000000-0000-4000-8000-000000000000";

// ============================================================================
// Fake vCenter
// ============================================================================

#[derive(Default)]
struct FakeVcenter {
    datacenters: Vec<&'static str>,
    logins: AtomicUsize,
    probes: AtomicUsize,
    /// Sessions created before the current epoch are expired.
    epoch: AtomicUsize,
    reject_login: AtomicBool,
    probe_error: AtomicBool,
    lookup_error: AtomicBool,
    login_delay_ms: AtomicU64,
    probe_delay_ms: AtomicU64,
    logged_in_as: Mutex<Vec<(String, String, String)>>,
    user_agents: Mutex<Vec<Option<String>>>,
}

impl FakeVcenter {
    fn with_datacenters(datacenters: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            datacenters: datacenters.to_vec(),
            ..Default::default()
        })
    }

    fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    fn expire_all_sessions(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    fn set_login_delay(&self, delay: Duration) {
        self.login_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    fn set_probe_delay(&self, delay: Duration) {
        self.probe_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    fn datacenter(&self, index: usize, path: String) -> Datacenter {
        Datacenter::new(
            ManagedObjectReference::new("Datacenter", format!("datacenter-{}", index + 1)),
            path,
        )
    }
}

struct FakeConnector(Arc<FakeVcenter>);

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, endpoint: &Endpoint) -> capv_vim::Result<Box<dyn Connection>> {
        let vc = &self.0;
        let delay = vc.login_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let credentials = endpoint.credentials().ok_or(VimError::NotAuthenticated)?;
        if vc.reject_login.load(Ordering::SeqCst) {
            return Err(VimError::InvalidLogin);
        }

        vc.logins.fetch_add(1, Ordering::SeqCst);
        vc.logged_in_as.lock().unwrap().push((
            endpoint.url().to_string(),
            credentials.username().to_string(),
            credentials.password().to_string(),
        ));
        vc.user_agents
            .lock()
            .unwrap()
            .push(endpoint.user_agent().map(str::to_string));

        Ok(Box::new(FakeConnection {
            vc: Arc::clone(vc),
            epoch: vc.epoch.load(Ordering::SeqCst),
        }))
    }
}

struct FakeConnection {
    vc: Arc<FakeVcenter>,
    epoch: usize,
}

impl FakeConnection {
    fn alive(&self) -> bool {
        self.epoch == self.vc.epoch.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for FakeConnection {
    async fn is_active(&self) -> capv_vim::Result<bool> {
        self.vc.probes.fetch_add(1, Ordering::SeqCst);
        let delay = self.vc.probe_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.vc.probe_error.load(Ordering::SeqCst) {
            return Err(VimError::UnexpectedResponse("status 503".into()));
        }
        Ok(self.alive())
    }

    async fn datacenter_or_default(&self, name: &str) -> capv_vim::Result<Datacenter> {
        if name.is_empty() {
            return match self.vc.datacenters.as_slice() {
                [_] => Ok(self.vc.datacenter(0, String::new())),
                [] => Err(VimError::DatacenterNotFound("*".into())),
                _ => Err(VimError::MultipleDatacenters),
            };
        }
        self.vc
            .datacenters
            .iter()
            .position(|dc| *dc == name)
            .map(|index| self.vc.datacenter(index, format!("/{name}")))
            .ok_or_else(|| VimError::DatacenterNotFound(name.to_string()))
    }

    async fn find_by_uuid(
        &self,
        datacenter: Option<&ManagedObjectReference>,
        uuid: &str,
        instance_uuid: bool,
    ) -> capv_vim::Result<Option<ManagedObjectReference>> {
        if !self.alive() {
            return Err(VimError::NotAuthenticated);
        }
        if self.vc.lookup_error.load(Ordering::SeqCst) {
            return Err(VimError::Fault {
                kind: "RuntimeFault".into(),
                message: "internal error".into(),
            });
        }
        // The VM lives in the first datacenter only.
        if datacenter.map(|dc| dc.value.as_str()) != Some("datacenter-1") {
            return Ok(None);
        }
        let wanted = if instance_uuid {
            VM_INSTANCE_UUID
        } else {
            VM_BIOS_UUID
        };
        Ok((uuid == wanted).then(|| ManagedObjectReference::new("VirtualMachine", "vm-42")))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn new_cache(vc: &Arc<FakeVcenter>) -> SessionCache {
    SessionCache::new(
        Arc::new(FakeConnector(Arc::clone(vc))),
        CacheConfig::default(),
    )
}

fn admin() -> Credentials {
    Credentials::new("administrator@vsphere.local", "s3cret")
}

fn vc_local() -> EndpointSpec {
    EndpointSpec::new("vc.local", "dc1")
}

fn bg() -> CallContext {
    CallContext::background()
}

// ============================================================================
// Acquire
// ============================================================================

#[tokio::test]
async fn test_first_acquire_logs_in_and_caches() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);

    let session = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();

    assert_eq!(vc.logins(), 1);
    assert!(session.is_initialized());
    let datacenter = session.datacenter().unwrap();
    assert_eq!(datacenter.path(), "/dc1");
    assert_eq!(datacenter.reference().value, "datacenter-1");
    assert_eq!(session.user_agent(), "infrastructure.cluster.x-k8s.io/v1alpha3");

    let key = SessionKey::new("vc.local", "administrator@vsphere.local", "dc1");
    let cached = cache.cached(&key).await.unwrap();
    assert!(Arc::ptr_eq(&cached, &session));
    assert_eq!(cache.len().await, 1);
    assert_eq!(cache.stats().misses(), 1);
    assert_eq!(cache.stats().created(), 1);
}

#[tokio::test]
async fn test_login_uses_normalized_url_and_credentials() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);

    cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();

    let seen = vc.logged_in_as.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![(
            "https://vc.local/sdk".to_string(),
            "administrator@vsphere.local".to_string(),
            "s3cret".to_string(),
        )]
    );
}

#[tokio::test]
async fn test_connection_carries_cache_user_agent() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let config = CacheConfig::builder()
        .user_agent("capv-sessionctl/0.1")
        .build();
    let cache = SessionCache::new(Arc::new(FakeConnector(Arc::clone(&vc))), config);

    let session = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();

    assert_eq!(session.user_agent(), "capv-sessionctl/0.1");
    let seen = vc.user_agents.lock().unwrap().clone();
    assert_eq!(seen, vec![Some("capv-sessionctl/0.1".to_string())]);
}

#[tokio::test]
async fn test_default_user_agent_reaches_connection() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);

    cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();

    let seen = vc.user_agents.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![Some("infrastructure.cluster.x-k8s.io/v1alpha3".to_string())]
    );
}

#[tokio::test]
async fn test_vc_local_scenario() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);
    let credentials = Credentials::new("admin", "pw");
    let endpoint = EndpointSpec::new("https://vc.local", "dc1");

    // Empty cache: one login, S1 stored.
    let s1 = cache.acquire(&bg(), &credentials, &endpoint).await.unwrap();
    assert_eq!(vc.logins(), 1);
    let key = SessionKey::new("https://vc.local", "admin", "dc1");
    assert!(Arc::ptr_eq(&cache.cached(&key).await.unwrap(), &s1));

    // Still live: S1 again, no new login.
    let again = cache.acquire(&bg(), &credentials, &endpoint).await.unwrap();
    assert!(Arc::ptr_eq(&again, &s1));
    assert_eq!(vc.logins(), 1);

    // Server expired it: S2 replaces S1 after exactly one more login.
    vc.expire_all_sessions();
    let s2 = cache.acquire(&bg(), &credentials, &endpoint).await.unwrap();
    assert!(!Arc::ptr_eq(&s2, &s1));
    assert_eq!(vc.logins(), 2);
    assert!(Arc::ptr_eq(&cache.cached(&key).await.unwrap(), &s2));
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_live_session_is_reused() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);

    let first = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();
    let second = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(vc.logins(), 1);
    assert_eq!(vc.probes(), 1);
    assert_eq!(cache.stats().hits(), 1);
    assert!((cache.stats().hit_rate() - 50.0).abs() < 0.01);
}

#[tokio::test]
async fn test_expired_session_is_replaced() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);
    let key = vc_local().key_for(&admin());

    let first = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();
    vc.expire_all_sessions();
    let second = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(vc.logins(), 2);
    assert_eq!(cache.stats().stale(), 1);
    assert_eq!(cache.len().await, 1);
    assert!(Arc::ptr_eq(&cache.cached(&key).await.unwrap(), &second));
}

#[tokio::test]
async fn test_probe_error_counts_as_stale() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);

    let first = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();
    vc.probe_error.store(true, Ordering::SeqCst);
    let second = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(vc.logins(), 2);
    assert_eq!(cache.stats().stale(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_probe_counts_as_stale_with_probe_timeout() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let config = CacheConfig::builder()
        .probe_timeout(Duration::from_secs(1))
        .build();
    let cache = SessionCache::new(Arc::new(FakeConnector(Arc::clone(&vc))), config);

    let first = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();
    vc.set_probe_delay(Duration::from_secs(60));
    let second = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(vc.logins(), 2);
}

#[tokio::test]
async fn test_empty_datacenter_selects_default() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);

    let session = cache
        .acquire(&bg(), &admin(), &EndpointSpec::new("vc.local", ""))
        .await
        .unwrap();

    let datacenter = session.datacenter().unwrap();
    assert_eq!(datacenter.path(), "");
    assert_eq!(datacenter.reference().value, "datacenter-1");
}

#[tokio::test]
async fn test_ambiguous_default_datacenter_fails() {
    let vc = FakeVcenter::with_datacenters(&["dc1", "dc2"]);
    let cache = new_cache(&vc);

    let result = cache
        .acquire(&bg(), &admin(), &EndpointSpec::new("vc.local", ""))
        .await;

    assert!(matches!(
        result,
        Err(SessionError::DatacenterNotFound {
            source: VimError::MultipleDatacenters,
            ..
        })
    ));
    assert!(cache.is_empty().await);
}

// ============================================================================
// Key identity
// ============================================================================

#[tokio::test]
async fn test_distinct_keys_get_distinct_sessions() {
    let vc = FakeVcenter::with_datacenters(&["dc1", "dc2"]);
    let cache = new_cache(&vc);

    let a = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();
    let b = cache
        .acquire(&bg(), &admin(), &EndpointSpec::new("vc.local", "dc2"))
        .await
        .unwrap();
    let c = cache
        .acquire(&bg(), &Credentials::new("capv@vsphere.local", "x"), &vc_local())
        .await
        .unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
    assert!(!Arc::ptr_eq(&b, &c));
    assert_eq!(vc.logins(), 3);
    assert_eq!(cache.len().await, 3);
}

#[tokio::test]
async fn test_password_change_reuses_session() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);

    let first = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();
    let rotated = Credentials::new("administrator@vsphere.local", "n3w-s3cret");
    let second = cache.acquire(&bg(), &rotated, &vc_local()).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(vc.logins(), 1);
}

// ============================================================================
// Failures leave the table unchanged
// ============================================================================

#[tokio::test]
async fn test_invalid_endpoint_makes_no_network_call() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);

    let result = cache
        .acquire(&bg(), &admin(), &EndpointSpec::new("ftp://vc.local", "dc1"))
        .await;

    match result {
        Err(SessionError::InvalidEndpoint { server, source }) => {
            assert_eq!(server, "ftp://vc.local");
            assert!(matches!(source, Some(VimError::InvalidUrl { .. })));
        }
        other => panic!("expected InvalidEndpoint, got {other:?}"),
    }
    assert_eq!(vc.logins(), 0);
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_empty_server_is_invalid_endpoint() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);

    let result = cache
        .acquire(&bg(), &admin(), &EndpointSpec::new("", "dc1"))
        .await;

    assert!(matches!(
        result,
        Err(SessionError::InvalidEndpoint { source: None, .. })
    ));
    assert_eq!(vc.logins(), 0);
}

#[tokio::test]
async fn test_rejected_login_keeps_stale_entry() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);
    let key = vc_local().key_for(&admin());

    let original = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();
    vc.expire_all_sessions();
    vc.reject_login.store(true, Ordering::SeqCst);

    let result = cache.acquire(&bg(), &admin(), &vc_local()).await;

    match result {
        Err(SessionError::AuthenticationFailed { server, source }) => {
            assert_eq!(server, "vc.local");
            assert!(matches!(source, VimError::InvalidLogin));
        }
        other => panic!("expected AuthenticationFailed, got {other:?}"),
    }
    let cached = cache.cached(&key).await.unwrap();
    assert!(Arc::ptr_eq(&cached, &original));
    assert_eq!(cache.stats().failures(), 1);
}

#[tokio::test]
async fn test_unknown_datacenter_is_not_cached() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);
    let endpoint = EndpointSpec::new("vc.local", "dc9");

    let result = cache.acquire(&bg(), &admin(), &endpoint).await;

    match result {
        Err(SessionError::DatacenterNotFound { datacenter, source }) => {
            assert_eq!(datacenter, "dc9");
            assert!(matches!(source, VimError::DatacenterNotFound(name) if name == "dc9"));
        }
        other => panic!("expected DatacenterNotFound, got {other:?}"),
    }
    assert!(!cache.contains(&endpoint.key_for(&admin())).await);
}

// ============================================================================
// Cancellation and deadlines
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_cancelled_acquire_leaves_no_entry() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = Arc::new(new_cache(&vc));
    vc.set_login_delay(Duration::from_secs(60));

    let token = CancellationToken::new();
    let ctx = CallContext::background().with_cancellation(token.clone());

    let task = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.acquire(&ctx, &admin(), &vc_local()).await })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    token.cancel();

    let result = task.await.unwrap();
    assert!(matches!(result, Err(SessionError::Cancelled)));
    assert!(cache.is_empty().await);
    assert_eq!(vc.logins(), 0);

    // The lock was released; a later call goes through.
    vc.set_login_delay(Duration::ZERO);
    cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();
    assert_eq!(cache.len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_exceeded_leaves_no_entry() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);
    vc.set_login_delay(Duration::from_secs(60));

    let ctx = CallContext::background().with_timeout(Duration::from_secs(1));
    let result = cache.acquire(&ctx, &admin(), &vc_local()).await;

    assert!(matches!(result, Err(SessionError::DeadlineExceeded)));
    assert!(cache.is_empty().await);
    assert_eq!(cache.stats().failures(), 1);
}

#[tokio::test]
async fn test_already_cancelled_context_does_nothing() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);

    let ctx = CallContext::background();
    ctx.cancel();
    let result = cache.acquire(&ctx, &admin(), &vc_local()).await;

    assert!(matches!(result, Err(SessionError::Cancelled)));
    assert_eq!(vc.logins(), 0);
    assert!(cache.is_empty().await);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_acquires_share_one_login() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = Arc::new(new_cache(&vc));
    vc.set_login_delay(Duration::from_millis(50));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.acquire(&bg(), &admin(), &vc_local()).await })
        })
        .collect();

    let sessions: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(vc.logins(), 1);
    for session in &sessions[1..] {
        assert!(Arc::ptr_eq(&sessions[0], session));
    }
    assert_eq!(cache.stats().created(), 1);
    assert_eq!(cache.stats().hits(), 15);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_acquires_for_different_keys() {
    let vc = FakeVcenter::with_datacenters(&["dc1", "dc2"]);
    let cache = Arc::new(new_cache(&vc));

    let handles: Vec<_> = ["dc1", "dc2", "dc1", "dc2"]
        .into_iter()
        .map(|dc| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                cache
                    .acquire(&bg(), &admin(), &EndpointSpec::new("vc.local", dc))
                    .await
            })
        })
        .collect();

    for joined in futures::future::join_all(handles).await {
        joined.unwrap().unwrap();
    }

    assert_eq!(vc.logins(), 2);
    assert_eq!(cache.len().await, 2);
}

// ============================================================================
// Resolution
// ============================================================================

#[tokio::test]
async fn test_find_by_instance_uuid() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);
    let session = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();

    let vm = session.find_by_instance_uuid(VM_INSTANCE_UUID).await.unwrap();
    assert_eq!(vm, Some(ManagedObjectReference::new("VirtualMachine", "vm-42")));

    // A BIOS UUID does not match as an instance UUID.
    let vm = session.find_by_instance_uuid(VM_BIOS_UUID).await.unwrap();
    assert_eq!(vm, None);
}

#[tokio::test]
async fn test_find_by_uuid() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);
    let session = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();

    let vm = session.find_by_uuid(VM_BIOS_UUID).await.unwrap();
    assert_eq!(vm.unwrap().to_string(), "VirtualMachine:vm-42");

    assert_eq!(session.find_by_uuid(MISSING_UUID).await.unwrap(), None);
}

#[tokio::test]
async fn test_lookup_is_scoped_to_session_datacenter() {
    let vc = FakeVcenter::with_datacenters(&["dc1", "dc2"]);
    let cache = new_cache(&vc);
    let session = cache
        .acquire(&bg(), &admin(), &EndpointSpec::new("vc.local", "dc2"))
        .await
        .unwrap();

    let vm = session.find_by_instance_uuid(VM_INSTANCE_UUID).await.unwrap();
    assert_eq!(vm, None);
}

#[tokio::test]
async fn test_lookup_failure_is_resolution_failed() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);
    let session = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();
    vc.lookup_error.store(true, Ordering::SeqCst);

    let result = session.find_by_instance_uuid(VM_INSTANCE_UUID).await;

    match result {
        Err(SessionError::ResolutionFailed { kind, uuid, source }) => {
            assert_eq!(kind, "instance uuid");
            assert_eq!(uuid, VM_INSTANCE_UUID);
            assert!(matches!(source, VimError::Fault { .. }));
        }
        other => panic!("expected ResolutionFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_lookup_on_expired_session_fails_until_reacquired() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let cache = new_cache(&vc);
    let stale = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();
    vc.expire_all_sessions();

    let result = stale.find_by_uuid(VM_BIOS_UUID).await;
    assert!(matches!(
        result,
        Err(SessionError::ResolutionFailed {
            source: VimError::NotAuthenticated,
            ..
        })
    ));

    let fresh = cache.acquire(&bg(), &admin(), &vc_local()).await.unwrap();
    assert!(fresh.find_by_uuid(VM_BIOS_UUID).await.unwrap().is_some());
}

#[tokio::test]
async fn test_independent_caches_do_not_share_sessions() {
    let vc = FakeVcenter::with_datacenters(&["dc1"]);
    let one = new_cache(&vc);
    let two = new_cache(&vc);

    let a = one.acquire(&bg(), &admin(), &vc_local()).await.unwrap();
    let b = two.acquire(&bg(), &admin(), &vc_local()).await.unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(vc.logins(), 2);
}
