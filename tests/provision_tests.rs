//! Full provisioning runs against mocked backends, with both APIs
//! served from one mock server.

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use gcc_admin_seed::prelude::*;

fn profile() -> AdminProfile {
    AdminProfile {
        email: "admin@gcc.com".to_string(),
        password: "GCC@Admin2024".to_string(),
        first_name: "Super".to_string(),
        last_name: "Administrator".to_string(),
        full_name: "Super Administrator".to_string(),
        department: "Administration".to_string(),
        position: "Super Admin".to_string(),
        phone_number: "+966500000000".to_string(),
    }
}

fn firebase(server: &MockServer) -> Firebase {
    let options = FirebaseOptions::default()
        .with_auth_endpoint(&server.uri())
        .with_firestore_endpoint(&server.uri());
    Firebase::new_with_options("demo-project", Credentials::Emulator, options).unwrap()
}

fn commit_request(requests: &[Request]) -> Value {
    let request = requests
        .iter()
        .find(|request| request.url.path().ends_with("documents:commit"))
        .expect("a commit request was sent");
    serde_json::from_slice(&request.body).unwrap()
}

#[tokio::test]
async fn a_fresh_run_creates_the_identity_and_stamps_both_timestamps() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/demo-project/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "fresh-1",
            "email": "admin@gcc.com",
            "displayName": "Super Administrator"
        })))
        .mount(&mock_server)
        .await;

    // The record does not exist when probed, and is readable after the
    // commit. Mount order decides which mock answers first.
    Mock::given(method("GET"))
        .and(path("/v1/projects/demo-project/databases/(default)/documents/users/fresh-1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "Document not found.", "status": "NOT_FOUND" }
        })))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/projects/demo-project/databases/(default)/documents/users/fresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/demo-project/databases/(default)/documents/users/fresh-1",
            "fields": {
                "id": { "stringValue": "fresh-1" },
                "fullName": { "stringValue": "Super Administrator" },
                "email": { "stringValue": "admin@gcc.com" },
                "roles": { "arrayValue": { "values": [{ "stringValue": "super_admin" }] } },
                "department": { "stringValue": "Administration" },
                "position": { "stringValue": "Super Admin" },
                "isActive": { "booleanValue": true },
                "createdAt": { "timestampValue": "2024-03-01T08:00:00Z" },
                "lastLogin": { "timestampValue": "2024-03-01T08:00:00Z" }
            }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/demo-project/databases/(default)/documents:commit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "commitTime": "2024-03-01T08:00:00Z"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let firebase = firebase(&mock_server);
    let provisioner = Provisioner::new(firebase.identity(), firebase.firestore());
    let report = provisioner.provision(&profile()).await.unwrap();

    assert_eq!(report.uid, "fresh-1");
    assert!(report.created);
    assert_eq!(report.roles, vec!["super_admin"]);
    assert_eq!(report.full_name, "Super Administrator");

    let commit = commit_request(&mock_server.received_requests().await.unwrap());
    let write = &commit["writes"][0];
    assert_eq!(write["update"]["fields"]["id"], json!({ "stringValue": "fresh-1" }));
    // A record that does not exist yet gets both stamps
    assert_eq!(
        write["updateTransforms"],
        json!([
            { "fieldPath": "createdAt", "setToServerValue": "REQUEST_TIME" },
            { "fieldPath": "lastLogin", "setToServerValue": "REQUEST_TIME" }
        ])
    );
}

#[tokio::test]
async fn a_repeat_run_converges_the_account_without_touching_created_at() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/demo-project/accounts"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "EMAIL_EXISTS" }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/demo-project/accounts:lookup"))
        .and(body_partial_json(json!({ "email": ["admin@gcc.com"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{
                "localId": "existing-1",
                "email": "admin@gcc.com",
                "displayName": "Super Administrator"
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/demo-project/accounts:update"))
        .and(body_partial_json(json!({
            "localId": "existing-1",
            "password": "GCC@Admin2024"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "existing-1"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // The record already exists with a creation time, both on the probe
    // and on the verification read
    Mock::given(method("GET"))
        .and(path(
            "/v1/projects/demo-project/databases/(default)/documents/users/existing-1",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/demo-project/databases/(default)/documents/users/existing-1",
            "fields": {
                "id": { "stringValue": "existing-1" },
                "fullName": { "stringValue": "Super Administrator" },
                "email": { "stringValue": "admin@gcc.com" },
                "roles": { "arrayValue": { "values": [{ "stringValue": "super_admin" }] } },
                "department": { "stringValue": "Administration" },
                "position": { "stringValue": "Super Admin" },
                "createdAt": { "timestampValue": "2023-11-20T12:00:00Z" }
            }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/demo-project/databases/(default)/documents:commit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "commitTime": "2024-03-01T08:00:00Z"
        })))
        .mount(&mock_server)
        .await;

    let firebase = firebase(&mock_server);
    let provisioner = Provisioner::new(firebase.identity(), firebase.firestore());
    let report = provisioner.provision(&profile()).await.unwrap();

    assert_eq!(report.uid, "existing-1");
    assert!(!report.created);

    let commit = commit_request(&mock_server.received_requests().await.unwrap());
    let write = &commit["writes"][0];
    // The stored creation time survives: only lastLogin is restamped
    assert_eq!(
        write["updateTransforms"],
        json!([{ "fieldPath": "lastLogin", "setToServerValue": "REQUEST_TIME" }])
    );
    let mask: Vec<&str> = write["updateMask"]["fieldPaths"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(!mask.contains(&"createdAt"));
    assert!(!mask.contains(&"lastLogin"));
}

#[tokio::test]
async fn an_unexpected_create_failure_stops_the_run_before_any_write() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/demo-project/accounts"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "INSUFFICIENT_PERMISSION" }
        })))
        .mount(&mock_server)
        .await;

    // Neither recovery nor document traffic may happen
    Mock::given(method("POST"))
        .and(path("/v1/projects/demo-project/accounts:lookup"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/demo-project/databases/(default)/documents:commit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let firebase = firebase(&mock_server);
    let provisioner = Provisioner::new(firebase.identity(), firebase.firestore());
    let err = provisioner.provision(&profile()).await.unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::Unknown));
    assert!(err.to_string().contains("INSUFFICIENT_PERMISSION"));
}
