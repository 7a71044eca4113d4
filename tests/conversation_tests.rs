//! Conversation and membership integration tests

mod common;

use assert_matches::assert_matches;
use common::database::TestDatabase;
use uuid::Uuid;
use xfchat::db::{conversations, messages, receipts, users};
use xfchat::models::{MemberRole, MessageKind};
use xfchat::ChatError;

#[tokio::test]
async fn test_creator_becomes_owner_member() {
    let db = TestDatabase::new().await;
    let alice = common::create_test_user(db.pool(), "alice").await;

    let conversation = conversations::create_conversation(db.pool(), alice.id, "Team")
        .await
        .unwrap();

    assert!(conversations::is_member(db.pool(), conversation.id, alice.id)
        .await
        .unwrap());

    let members = conversations::members_of(db.pool(), conversation.id)
        .await
        .unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, alice.id);
    assert_eq!(members[0].role, MemberRole::Owner);
}

#[tokio::test]
async fn test_user_mirror_roundtrip() {
    let db = TestDatabase::new().await;
    let alice = common::create_test_user(db.pool(), "alice").await;

    let fetched = users::get_user(db.pool(), alice.id)
        .await
        .unwrap()
        .expect("user should exist");
    assert_eq!(fetched.id, alice.id);
    assert_eq!(fetched.email, "alice@example.com");
    assert_eq!(fetched.first_name, "alice");

    assert!(users::get_user(db.pool(), Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_blank_titles_are_rejected() {
    let db = TestDatabase::new().await;
    let alice = common::create_test_user(db.pool(), "alice").await;

    for title in ["", "   ", "\t\n"] {
        let err = conversations::create_conversation(db.pool(), alice.id, title)
            .await
            .unwrap_err();
        assert_matches!(err, ChatError::InvalidArgument { .. });
    }
}

#[tokio::test]
async fn test_add_member_is_idempotent() {
    let db = TestDatabase::new().await;
    let alice = common::create_test_user(db.pool(), "alice").await;
    let bob = common::create_test_user(db.pool(), "bob").await;

    let conversation = conversations::create_conversation(db.pool(), alice.id, "Team")
        .await
        .unwrap();

    conversations::add_member(db.pool(), conversation.id, bob.id)
        .await
        .unwrap();
    conversations::add_member(db.pool(), conversation.id, bob.id)
        .await
        .unwrap();

    let members = conversations::members_of(db.pool(), conversation.id)
        .await
        .unwrap();
    assert_eq!(members.len(), 2);
}

#[tokio::test]
async fn test_add_member_unknown_conversation() {
    let db = TestDatabase::new().await;
    let bob = common::create_test_user(db.pool(), "bob").await;

    let err = conversations::add_member(db.pool(), Uuid::new_v4(), bob.id)
        .await
        .unwrap_err();
    assert_matches!(err, ChatError::NotFound { entity: "conversation", .. });
}

#[tokio::test]
async fn test_removed_member_loses_send_rights_but_not_messages() {
    let db = TestDatabase::new().await;
    let alice = common::create_test_user(db.pool(), "alice").await;
    let bob = common::create_test_user(db.pool(), "bob").await;

    let conversation = conversations::create_conversation(db.pool(), alice.id, "Team")
        .await
        .unwrap();
    conversations::add_member(db.pool(), conversation.id, bob.id)
        .await
        .unwrap();

    let message = messages::send_message(
        db.pool(),
        conversation.id,
        bob.id,
        MessageKind::Text,
        "before leaving",
        None,
    )
    .await
    .unwrap();

    conversations::remove_member(db.pool(), conversation.id, bob.id)
        .await
        .unwrap();
    assert!(!conversations::is_member(db.pool(), conversation.id, bob.id)
        .await
        .unwrap());

    // prior messages survive the removal
    let surviving = messages::get_message(db.pool(), message.id).await.unwrap();
    assert_eq!(surviving.map(|m| m.id), Some(message.id));

    // but sending again is denied
    let err = messages::send_message(
        db.pool(),
        conversation.id,
        bob.id,
        MessageKind::Text,
        "after leaving",
        None,
    )
    .await
    .unwrap_err();
    assert_matches!(err, ChatError::PermissionDenied { .. });
}

#[tokio::test]
async fn test_remove_unknown_membership() {
    let db = TestDatabase::new().await;
    let alice = common::create_test_user(db.pool(), "alice").await;
    let bob = common::create_test_user(db.pool(), "bob").await;

    let conversation = conversations::create_conversation(db.pool(), alice.id, "Team")
        .await
        .unwrap();

    let err = conversations::remove_member(db.pool(), conversation.id, bob.id)
        .await
        .unwrap_err();
    assert_matches!(err, ChatError::NotFound { entity: "membership", .. });

    // removing twice reports NotFound the second time as well
    conversations::add_member(db.pool(), conversation.id, bob.id)
        .await
        .unwrap();
    conversations::remove_member(db.pool(), conversation.id, bob.id)
        .await
        .unwrap();
    let err = conversations::remove_member(db.pool(), conversation.id, bob.id)
        .await
        .unwrap_err();
    assert_matches!(err, ChatError::NotFound { .. });
}

#[tokio::test]
async fn test_conversations_for_user() {
    let db = TestDatabase::new().await;
    let alice = common::create_test_user(db.pool(), "alice").await;
    let bob = common::create_test_user(db.pool(), "bob").await;

    let team = conversations::create_conversation(db.pool(), alice.id, "Team")
        .await
        .unwrap();
    conversations::create_conversation(db.pool(), alice.id, "Private notes")
        .await
        .unwrap();
    conversations::add_member(db.pool(), team.id, bob.id)
        .await
        .unwrap();

    let bobs = conversations::conversations_for_user(db.pool(), bob.id)
        .await
        .unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].id, team.id);

    let alices = conversations::conversations_for_user(db.pool(), alice.id)
        .await
        .unwrap();
    assert_eq!(alices.len(), 2);
}

#[tokio::test]
async fn test_delete_conversation_cascades() {
    let db = TestDatabase::new().await;
    let alice = common::create_test_user(db.pool(), "alice").await;
    let bob = common::create_test_user(db.pool(), "bob").await;

    let conversation = conversations::create_conversation(db.pool(), alice.id, "Doomed")
        .await
        .unwrap();
    conversations::add_member(db.pool(), conversation.id, bob.id)
        .await
        .unwrap();

    let message = messages::send_message(
        db.pool(),
        conversation.id,
        alice.id,
        MessageKind::Text,
        "hello",
        None,
    )
    .await
    .unwrap();
    receipts::mark_seen(db.pool(), message.id, bob.id)
        .await
        .unwrap();

    conversations::delete_conversation(db.pool(), conversation.id)
        .await
        .unwrap();

    assert!(conversations::get_conversation(db.pool(), conversation.id)
        .await
        .unwrap()
        .is_none());
    assert!(!conversations::is_member(db.pool(), conversation.id, alice.id)
        .await
        .unwrap());

    let page = messages::list_messages(db.pool(), conversation.id, None, 10)
        .await
        .unwrap();
    assert!(page.messages.is_empty());

    assert!(messages::get_message(db.pool(), message.id)
        .await
        .unwrap()
        .is_none());
    assert!(receipts::seen_by(db.pool(), message.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_delete_unknown_conversation() {
    let db = TestDatabase::new().await;

    let err = conversations::delete_conversation(db.pool(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert_matches!(err, ChatError::NotFound { .. });
}
