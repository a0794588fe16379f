use super::common::*;
use crate::social::conversations::domain::{ConversationId, MessageId};
use crate::social::conversations::events::{ConversationListener, MessageEvent};

#[tokio::test]
async fn send_message_publishes_one_event_per_message() {
    let (service, _, bus) = build_service();
    let (ava, ben) = (profile_id("ava"), profile_id("ben"));
    let conversation = service.open_direct(&ava, &ben).expect("opens");

    let mut rx = bus.subscribe();

    let first = service
        .send_message(&ava, &conversation.id, "hello")
        .expect("sends");
    let second = service
        .send_message(&ben, &conversation.id, "hi back")
        .expect("sends");

    let event = rx.recv().await.expect("first event");
    assert_eq!(event.message_id, first.id);
    assert_eq!(event.conversation_id, conversation.id);
    assert_eq!(event.sender, ava);

    let event = rx.recv().await.expect("second event");
    assert_eq!(event.message_id, second.id);
    assert_eq!(event.sender, ben);
}

#[tokio::test]
async fn dropping_the_receiver_unsubscribes() {
    let (service, _, bus) = build_service();
    let (ava, ben) = (profile_id("ava"), profile_id("ben"));
    let conversation = service.open_direct(&ava, &ben).expect("opens");

    let rx = bus.subscribe();
    drop(rx);

    // Publishing into a channel with no live receivers still succeeds; the
    // store stays the source of truth.
    service
        .send_message(&ava, &conversation.id, "anyone there?")
        .expect("sends");
}

#[test]
fn listener_dedupes_duplicate_deliveries() {
    let mut listener = ConversationListener::new();
    let event = MessageEvent {
        message_id: MessageId("msg-000123".to_string()),
        conversation_id: ConversationId("dm-000001".to_string()),
        sender: profile_id("ava"),
    };

    assert!(listener.observe(&event));
    assert!(!listener.observe(&event), "redelivery must be a no-op");

    let other = MessageEvent {
        message_id: MessageId("msg-000124".to_string()),
        ..event.clone()
    };
    assert!(listener.observe(&other));
}
