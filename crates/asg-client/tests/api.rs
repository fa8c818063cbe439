//! End-to-end manager behavior against a scripted upstream.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde_json::{Value, json};

use asg_client::{
    ApiClient, ClientError, Credential, GroupManager, MASTER_ROLE_LABEL, NodeRef, RawResponse,
    SignedRequest, Transport,
};
use asg_core::{CacheConfig, CloudConfig, CoreError, GlobalConfig};
use asg_sign::{params_from_json, verify_request};

const SECRET: &str = "SK";

/// Serves list/describe/create/delete from a fixed set of group documents,
/// rejecting any request whose signature does not verify.
struct ScriptedTransport {
    groups: Vec<Value>,
    sent: Mutex<Vec<SignedRequest>>,
    describes: AtomicUsize,
    fail_everything: AtomicBool,
}

impl ScriptedTransport {
    fn new(groups: Vec<Value>) -> Self {
        Self {
            groups,
            sent: Mutex::new(Vec::new()),
            describes: AtomicUsize::new(0),
            fail_everything: AtomicBool::new(false),
        }
    }

    fn sent(&self) -> Vec<SignedRequest> {
        self.sent.lock().unwrap().clone()
    }

    fn last(&self) -> SignedRequest {
        self.sent().last().cloned().expect("no request sent")
    }

    fn respond(&self, request: &SignedRequest) -> Value {
        let path = request.url.split('?').next().unwrap_or_default();
        let tail = path.rsplit("/scalingGroups").next().unwrap_or_default();

        match (&request.method, tail) {
            (&Method::GET, "") => json!({
                "code": "200",
                "requestId": "req-list",
                "result": {"total": self.groups.len(), "items": self.groups},
            }),
            (&Method::GET, id) => {
                self.describes.fetch_add(1, Ordering::SeqCst);
                let id = id.trim_start_matches('/');
                match self.groups.iter().find(|g| g["id"].to_string() == id) {
                    Some(group) => json!({"code": "200", "result": group}),
                    None => json!({"code": "404", "message": "group not found", "requestId": "req-404"}),
                }
            }
            _ => json!({"code": 200, "result": {}}),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: SignedRequest) -> anyhow::Result<RawResponse> {
        self.sent.lock().unwrap().push(request.clone());

        let mut headers = HeaderMap::new();
        headers.insert("X-Gateway-Route-No", HeaderValue::from_static("route-9"));

        let mut signed = request.metadata.clone();
        signed.remove("Content-Type");
        let authentic = verify_request(&params_from_json(&request.body), SECRET, &signed);

        let body = if self.fail_everything.load(Ordering::SeqCst) {
            json!({"code": "500", "message": "internal", "requestId": "req-500"})
        } else if !authentic {
            json!({"code": "4001", "message": "signature mismatch", "requestId": "req-auth"})
        } else {
            self.respond(&request)
        };

        Ok(RawResponse {
            status: StatusCode::OK,
            headers,
            body: serde_json::to_vec(&body)?,
        })
    }
}

fn managed_group(id: i64, name: &str, min: u32, max: u32, members: Value) -> Value {
    json!({
        "id": id,
        "name": name,
        "status": "normal",
        "disk": {"system_disk": {"disk_capacity": 40, "disk_type": "ssd"}},
        "node_config": {"res": {"type_name": "c2.large", "resource": {"cpu": 4, "mem": 8}}},
        "auto_scale": {"node_min": min, "node_max": max},
        "scale_node": members,
    })
}

fn upstream() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "default", "scale_node": [{"providerID": "i-0", "status": "running"}]}),
        managed_group(
            42,
            "workers",
            1,
            3,
            json!([
                {"providerID": "i-1", "status": "running"},
                {"providerID": "i-2", "status": "deleting"},
                {"providerID": "i-3", "status": "creating"},
                {"providerID": "", "status": "creating"},
                {"providerID": "i-4", "status": "failed"},
            ]),
        ),
        managed_group(
            43,
            "batch",
            0,
            5,
            json!([
                {"providerID": "i-9", "status": "running"},
                {"providerID": "i-8", "status": "hibernating"},
            ]),
        ),
    ]
}

fn config(node_groups: &[&str]) -> CloudConfig {
    CloudConfig {
        global: GlobalConfig {
            endpoint: "https://api.example.net".into(),
            access_key: "AK".into(),
            secret_key: SECRET.into(),
            cluster_id: "c-1".into(),
            region_id: "r-1".into(),
        },
        cache: CacheConfig::default(),
        node_groups: node_groups.iter().map(|s| s.to_string()).collect(),
    }
}

async fn manager(transport: &Arc<ScriptedTransport>) -> GroupManager {
    GroupManager::from_config(&config(&["1:5:burst---workers", "0:5:batch"]), transport.clone())
        .await
        .unwrap()
}

#[tokio::test]
async fn bootstrap_registers_specs_with_upstream_bounds() {
    let transport = Arc::new(ScriptedTransport::new(upstream()));
    let manager = manager(&transport).await;

    let groups = manager.cache().groups().await;
    assert_eq!(groups.len(), 2);
    let workers = &groups[0];
    assert_eq!(workers.id(), "42");
    assert_eq!(workers.rule_name(), Some("burst"));
    assert_eq!((workers.min_size(), workers.max_size()), (1, 3));
    assert_eq!(groups[1].rule_name(), None);

    // Discovery only; membership is fetched lazily.
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn discovery_skips_unmanageable_groups() {
    let transport = Arc::new(ScriptedTransport::new(upstream()));
    let manager = manager(&transport).await;

    let names: Vec<String> = manager
        .list_scaling_groups()
        .await
        .unwrap()
        .iter()
        .map(|g| g.name().to_string())
        .collect();
    assert_eq!(names, vec!["workers", "batch"]);
}

#[tokio::test]
async fn unknown_spec_group_fails_bootstrap() {
    let transport = Arc::new(ScriptedTransport::new(upstream()));
    let err = GroupManager::from_config(&config(&["1:5:nope"]), transport)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Config(CoreError::InvalidSpec(_))));
}

#[tokio::test]
async fn missing_node_groups_fail_bootstrap() {
    let transport = Arc::new(ScriptedTransport::new(upstream()));
    let err = GroupManager::from_config(&config(&[]), transport)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Config(CoreError::Config(_))));
}

#[tokio::test]
async fn node_lookup_resolves_through_cache() {
    let transport = Arc::new(ScriptedTransport::new(upstream()));
    let manager = manager(&transport).await;

    let master = NodeRef::new("cp-0", "i-1").with_label(MASTER_ROLE_LABEL, "");
    assert!(manager.group_for_node(&master).await.unwrap().is_none());
    assert_eq!(transport.describes.load(Ordering::SeqCst), 0);

    let worker = NodeRef::new("node-a", "i-1");
    let group = manager.group_for_node(&worker).await.unwrap().unwrap();
    assert_eq!(group.id(), "42");
    assert_eq!(transport.describes.load(Ordering::SeqCst), 2);

    let batch = manager.group_for_instance("i-9").await.unwrap().unwrap();
    assert_eq!(batch.id(), "43");
    assert_eq!(transport.describes.load(Ordering::SeqCst), 2);

    // Joining node without provider id: looked up by name, memoized absent.
    let joining = NodeRef::new("node-b", "");
    assert!(manager.group_for_node(&joining).await.unwrap().is_none());
    assert!(manager.cache().is_known_absent("node-b").await);

    // Failed instances are not members.
    assert!(manager.group_for_instance("i-4").await.unwrap().is_none());
}

#[tokio::test]
async fn desired_size_excludes_deleting() {
    let transport = Arc::new(ScriptedTransport::new(upstream()));
    let manager = manager(&transport).await;

    assert_eq!(manager.instances("42").await.unwrap().len(), 3);
    assert_eq!(manager.desired_size("42").await.unwrap(), 2);
}

#[tokio::test]
async fn increase_size_respects_max_and_signs_body() {
    let transport = Arc::new(ScriptedTransport::new(upstream()));
    let manager = manager(&transport).await;

    manager.increase_size("42", 1).await.unwrap();
    let request = transport.last();
    assert_eq!(request.method, Method::POST);
    assert_eq!(
        request.url,
        "https://api.example.net/csk-open/api/csk/r-1/clusters/c-1/scalingGroups/42/instances"
    );
    assert_eq!(
        Value::Object(request.body.clone()),
        json!({"delta": 1, "scale_type": "auto", "rule_name": "burst"})
    );
    assert_eq!(request.metadata.get("content-type"), Some("application/json"));
    assert_eq!(request.metadata.get("accessKey"), Some("AK"));
    assert_eq!(request.metadata.get("algorithm"), Some("HmacSHA256"));
    assert!(request.metadata.is_signed());

    let sent_before = transport.sent().len();
    let err = manager.increase_size("42", 2).await.unwrap_err();
    assert!(matches!(err, ClientError::Bounds(_)));
    // The describe went out; no create did.
    assert_eq!(transport.sent().len(), sent_before + 1);
    assert_eq!(transport.last().method, Method::GET);

    let err = manager.increase_size("42", 0).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));

    let err = manager.increase_size("7", 1).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));
}

#[tokio::test]
async fn delete_instances_checks_membership_and_min() {
    let transport = Arc::new(ScriptedTransport::new(upstream()));
    let manager = manager(&transport).await;

    manager.delete_instances("42", &["i-1".to_string()]).await.unwrap();
    let request = transport.last();
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(
        Value::Object(request.body.clone()),
        json!({"instanceIds": ["i-1"], "rule_name": "burst", "scale_type": "auto"})
    );

    let err = manager
        .delete_instances("42", &["i-1".to_string(), "i-3".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Bounds(_)));

    let err = manager
        .delete_instances("42", &["i-9".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));
}

#[tokio::test]
async fn api_errors_carry_envelope_details() {
    let transport = Arc::new(ScriptedTransport::new(upstream()));
    let manager = manager(&transport).await;
    transport.fail_everything.store(true, Ordering::SeqCst);

    match manager.desired_size("42").await.unwrap_err() {
        ClientError::Api { code, message, request_id, route, .. } => {
            assert_eq!(code, "500");
            assert_eq!(message, "internal");
            assert_eq!(request_id, "req-500");
            assert_eq!(route, "route-9");
        }
        other => panic!("unexpected error: {other}"),
    }

    // A failed resync surfaces as a resolution error and memoizes nothing.
    let err = manager.group_for_instance("i-1").await.unwrap_err();
    assert!(matches!(err, ClientError::Resolve(_)));
    assert!(!manager.cache().is_known_absent("i-1").await);
}

#[tokio::test]
async fn wrong_secret_is_rejected_upstream() {
    let transport = Arc::new(ScriptedTransport::new(upstream()));
    let client = ApiClient::new(
        "https://api.example.net",
        "r-1",
        "c-1",
        Credential::new("AK", "not-the-secret"),
        transport.clone(),
    )
    .unwrap();

    match client.list_scaling_groups().await.unwrap_err() {
        ClientError::Api { code, .. } => assert_eq!(code, "4001"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unrecognized_status_still_resolves_to_group() {
    let transport = Arc::new(ScriptedTransport::new(upstream()));
    let manager = manager(&transport).await;

    let group = manager.group_for_instance("i-8").await.unwrap().unwrap();
    assert_eq!(group.id(), "43");
    assert!(!manager.cache().is_known_absent("i-8").await);
    assert_eq!(manager.desired_size("43").await.unwrap(), 2);
}
