//! Integration tests for granting and revoking bucket access

mod common;

use std::time::Duration;

use bytes::Bytes;

use ::common::iam::{ACCESS_KEY_LEN, SECRET_KEY_LEN};
use ::common::provisioner::{
    Code, GrantAccessRequest, ProvisionError, Provisioner, ProvisionerConfig,
    RevokeAccessRequest, RevokeScope,
};
use ::common::store::DirectoryStore;

fn grant(bucket: &str, account: &str) -> GrantAccessRequest {
    GrantAccessRequest {
        bucket_id: bucket.to_string(),
        account_name: account.to_string(),
    }
}

fn revoke(account: &str) -> RevokeAccessRequest {
    RevokeAccessRequest {
        account_id: account.to_string(),
        bucket_id: None,
    }
}

#[tokio::test]
async fn test_grant_on_empty_document() {
    let (provisioner, store) = common::setup_provisioner();

    let response = provisioner.grant_access(grant("b1", "alice")).await.unwrap();

    assert_eq!(response.account_id, "alice");
    let s3 = response.s3().unwrap();
    assert_eq!(s3.access_key_id.len(), ACCESS_KEY_LEN);
    assert_eq!(s3.secret_access_key.len(), SECRET_KEY_LEN);
    assert_eq!(s3.endpoint, common::ENDPOINT);
    assert_eq!(s3.region, common::REGION);

    let doc = common::read_document(&store).await.unwrap();
    let alice = doc.identity("alice").unwrap();
    assert_eq!(
        alice.actions,
        vec!["Read:b1", "Write:b1", "List:b1", "Tagging:b1"]
    );
    assert_eq!(alice.credentials.len(), 1);
    assert_eq!(alice.credentials[0].access_key, s3.access_key_id);
    assert_eq!(alice.credentials[0].secret_key, s3.secret_access_key);
}

#[tokio::test]
async fn test_repeated_grant_appends_credentials() {
    let (provisioner, store) = common::setup_provisioner();

    let first = provisioner.grant_access(grant("b1", "alice")).await.unwrap();
    let second = provisioner.grant_access(grant("b1", "alice")).await.unwrap();
    assert_ne!(
        first.s3().unwrap().access_key_id,
        second.s3().unwrap().access_key_id
    );

    let doc = common::read_document(&store).await.unwrap();
    assert_eq!(doc.identities.len(), 1);
    let alice = doc.identity("alice").unwrap();
    assert_eq!(alice.credentials.len(), 2);
    assert_eq!(alice.actions.len(), 4);
}

#[tokio::test]
async fn test_grant_multiple_buckets_and_accounts() {
    let (provisioner, store) = common::setup_provisioner();

    provisioner.grant_access(grant("b1", "alice")).await.unwrap();
    provisioner.grant_access(grant("b2", "alice")).await.unwrap();
    provisioner.grant_access(grant("b1", "bob")).await.unwrap();

    let doc = common::read_document(&store).await.unwrap();
    let names: Vec<_> = doc.identities.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);
    assert_eq!(doc.identity("alice").unwrap().actions.len(), 8);
    assert_eq!(doc.identity("bob").unwrap().actions.len(), 4);
}

#[tokio::test]
async fn test_grant_rejects_empty_fields() {
    let (provisioner, store) = common::setup_provisioner();

    let err = provisioner.grant_access(grant("", "alice")).await.unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
    let err = provisioner.grant_access(grant("b1", "")).await.unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);

    assert_eq!(store.lookups(), 0);
}

#[tokio::test]
async fn test_grant_preserves_foreign_document_content() {
    let (provisioner, store) = common::setup_provisioner();
    let existing = br#"{
  "identities": [
    {
      "name": "admin",
      "credentials": [{ "accessKey": "ADMINKEY", "secretKey": "ADMINSECRET" }],
      "actions": ["Admin"]
    }
  ],
  "accounts": [{ "id": "admin" }]
}"#;
    store
        .inner()
        .create("/etc/iam", "identity.json", Bytes::from_static(existing))
        .await
        .unwrap();

    provisioner.grant_access(grant("b1", "alice")).await.unwrap();

    let doc = common::read_document(&store).await.unwrap();
    assert_eq!(doc.identities[0].name, "admin");
    assert_eq!(doc.identities[0].actions, vec!["Admin"]);
    assert!(doc.extra.contains_key("accounts"));
    assert!(doc.identity("alice").is_some());
}

#[tokio::test]
async fn test_grant_surfaces_malformed_document() {
    let (provisioner, store) = common::setup_provisioner();
    store
        .inner()
        .create("/etc/iam", "identity.json", Bytes::from_static(b"{ broken"))
        .await
        .unwrap();

    let err = provisioner.grant_access(grant("b1", "alice")).await.unwrap_err();
    assert!(matches!(err, ProvisionError::MalformedDocument(_)));
    assert_eq!(err.code(), Code::Internal);
}

#[tokio::test]
async fn test_grant_surfaces_unavailable_without_retry() {
    let (provisioner, store) = common::setup_provisioner();
    store.fail_lookups(1);

    let err = provisioner.grant_access(grant("b1", "alice")).await.unwrap_err();
    assert_eq!(err.code(), Code::Unavailable);
    assert_eq!(store.lookups(), 1);
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn test_grant_retries_lost_races() {
    let (provisioner, store) = common::setup_provisioner();
    provisioner.grant_access(grant("b1", "bob")).await.unwrap();

    store.conflict_updates(2);
    provisioner.grant_access(grant("b1", "alice")).await.unwrap();

    let doc = common::read_document(&store).await.unwrap();
    assert!(doc.identity("alice").is_some());
    assert!(doc.identity("bob").is_some());
}

#[tokio::test]
async fn test_grant_gives_up_after_bounded_attempts() {
    let (provisioner, store) = common::setup_with_config(ProvisionerConfig {
        max_attempts: 2,
        ..common::test_config()
    });
    store.conflict_updates(usize::MAX);

    let err = provisioner.grant_access(grant("b1", "alice")).await.unwrap_err();
    assert!(matches!(err, ProvisionError::Conflict { attempts: 2 }));
    assert_eq!(err.code(), Code::Aborted);
    assert_eq!(store.writes(), 2);
}

#[tokio::test]
async fn test_grant_surfaces_vanished_document() {
    let (provisioner, store) = common::setup_provisioner();
    provisioner.grant_access(grant("b1", "bob")).await.unwrap();
    store.vanish_updates(1);

    let err = provisioner.grant_access(grant("b1", "alice")).await.unwrap_err();
    assert!(matches!(err, ProvisionError::DocumentVanished));
}

#[tokio::test]
async fn test_concurrent_grants_keep_every_account() {
    let (provisioner, store) = common::setup_with_config(ProvisionerConfig {
        max_attempts: 50,
        ..common::test_config()
    });
    store.set_delay(Some(Duration::from_millis(2)));

    let accounts: Vec<String> = (0..8).map(|i| format!("account-{}", i)).collect();
    let calls = accounts.iter().map(|account| {
        let provisioner = provisioner.clone();
        let req = grant("shared", account);
        async move { provisioner.grant_access(req).await }
    });
    for result in futures::future::join_all(calls).await {
        result.unwrap();
    }

    let doc = common::read_document(&store).await.unwrap();
    for account in &accounts {
        assert!(doc.identity(account).is_some(), "lost update for {}", account);
    }
}

#[tokio::test]
async fn test_grant_deadline_exceeded() {
    let (provisioner, store) = common::setup_with_config(ProvisionerConfig {
        call_timeout: Some(Duration::from_millis(20)),
        ..common::test_config()
    });
    store.set_delay(Some(Duration::from_millis(200)));

    let err = provisioner.grant_access(grant("b1", "alice")).await.unwrap_err();
    assert!(matches!(err, ProvisionError::DeadlineExceeded(_)));
    assert_eq!(err.code(), Code::DeadlineExceeded);
}

#[tokio::test]
async fn test_revoke_when_document_absent() {
    let (provisioner, store) = common::setup_provisioner();

    provisioner.revoke_access(revoke("alice")).await.unwrap();

    assert!(common::read_document(&store).await.is_none());
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn test_revoke_removes_account() {
    let (provisioner, store) = common::setup_provisioner();
    provisioner.grant_access(grant("b1", "alice")).await.unwrap();
    provisioner.grant_access(grant("b2", "alice")).await.unwrap();
    provisioner.grant_access(grant("b1", "bob")).await.unwrap();

    provisioner.revoke_access(revoke("alice")).await.unwrap();
    provisioner.revoke_access(revoke("alice")).await.unwrap();

    let doc = common::read_document(&store).await.unwrap();
    assert!(doc.identity("alice").is_none());
    assert!(doc.identity("bob").is_some());
}

#[tokio::test]
async fn test_revoke_rejects_empty_account() {
    let (provisioner, _store) = common::setup_provisioner();
    let err = provisioner.revoke_access(revoke("")).await.unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn test_revoke_treats_vanished_document_as_success() {
    let (provisioner, store) = common::setup_provisioner();
    provisioner.grant_access(grant("b1", "alice")).await.unwrap();
    store.vanish_updates(1);

    provisioner.revoke_access(revoke("alice")).await.unwrap();
}

#[tokio::test]
async fn test_revoke_surfaces_unavailable() {
    let (provisioner, store) = common::setup_provisioner();
    provisioner.grant_access(grant("b1", "alice")).await.unwrap();
    store.fail_writes(1);

    let err = provisioner.revoke_access(revoke("alice")).await.unwrap_err();
    assert_eq!(err.code(), Code::Unavailable);

    let doc = common::read_document(&store).await.unwrap();
    assert!(doc.identity("alice").is_some());
}

#[tokio::test]
async fn test_revoke_per_bucket() {
    let (provisioner, store) = common::setup_with_config(ProvisionerConfig {
        revoke_scope: RevokeScope::Bucket,
        ..common::test_config()
    });
    provisioner.grant_access(grant("b1", "alice")).await.unwrap();
    provisioner.grant_access(grant("b2", "alice")).await.unwrap();

    provisioner
        .revoke_access(RevokeAccessRequest {
            account_id: "alice".into(),
            bucket_id: Some("b1".into()),
        })
        .await
        .unwrap();

    let doc = common::read_document(&store).await.unwrap();
    let alice = doc.identity("alice").unwrap();
    assert_eq!(
        alice.actions,
        vec!["Read:b2", "Write:b2", "List:b2", "Tagging:b2"]
    );
    assert_eq!(alice.credentials.len(), 2);

    provisioner
        .revoke_access(RevokeAccessRequest {
            account_id: "alice".into(),
            bucket_id: Some("b2".into()),
        })
        .await
        .unwrap();
    let doc = common::read_document(&store).await.unwrap();
    assert!(doc.identity("alice").is_none());
}

#[tokio::test]
async fn test_revoke_per_bucket_requires_bucket() {
    let (provisioner, _store) = common::setup_with_config(ProvisionerConfig {
        revoke_scope: RevokeScope::Bucket,
        ..common::test_config()
    });
    let err = provisioner.revoke_access(revoke("alice")).await.unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn test_revoke_per_bucket_keeps_account_without_grants() {
    let (provisioner, store) = common::setup_with_config(ProvisionerConfig {
        revoke_scope: RevokeScope::Bucket,
        ..common::test_config()
    });
    let existing = br#"{
  "identities": [
    {
      "name": "alice",
      "credentials": [{ "accessKey": "ALICEKEY", "secretKey": "ALICESECRET" }],
      "actions": []
    }
  ]
}"#;
    store
        .inner()
        .create("/etc/iam", "identity.json", Bytes::from_static(existing))
        .await
        .unwrap();

    provisioner
        .revoke_access(RevokeAccessRequest {
            account_id: "alice".into(),
            bucket_id: Some("b1".into()),
        })
        .await
        .unwrap();

    assert_eq!(store.writes(), 0);
    let doc = common::read_document(&store).await.unwrap();
    let alice = doc.identity("alice").unwrap();
    assert_eq!(alice.credentials[0].access_key, "ALICEKEY");
}
