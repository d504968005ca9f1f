// tests/feedback_tests.rs

use ticketbot_core::services::dialogue::DialogueRepository;
use ticketbot_core::test_utils::helpers::*;
use ticketbot_core::Error;
use ticketbot_common::traits::repository_traits::{EventRepository, UserEventRepository, UserRepository};

const GUEST: i64 = 42;
const ADMIN: i64 = 100;

#[tokio::test]
async fn test_feedback_is_stored_and_forwarded() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN]);
    let repos = t.store.repositories();
    repos.users.create_user(&sample_user(GUEST)).await?;
    let event_id = repos.events.create_event(&upcoming_event("Spring Ball")).await?;
    repos.user_events.add_user_event(GUEST, event_id).await?;

    t.say(GUEST, "Feedback").await;
    t.press(GUEST, "leave_feedback").await;
    let picker = t.transport.last_to(GUEST).await.unwrap();
    assert_eq!(picker.button_payloads(), vec![format!("feedback_event_{event_id}")]);

    t.press(GUEST, &format!("feedback_event_{event_id}")).await;
    t.say(GUEST, "Great music!").await;

    let stored = t.store.all_feedback().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].event_id, event_id);
    assert_eq!(stored[0].body, "Great music!");
    assert!(t.dialogues.get_state(GUEST).await?.is_none());

    let forwarded = t.last_text(ADMIN).await;
    assert!(forwarded.contains("Spring Ball"));
    assert!(forwarded.contains("Great music!"));
    assert!(forwarded.contains(&sample_user(GUEST).phone_number));
    Ok(())
}

#[tokio::test]
async fn test_feedback_only_for_attended_events() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN]);
    let repos = t.store.repositories();
    repos.users.create_user(&sample_user(GUEST)).await?;
    let event_id = repos.events.create_event(&upcoming_event("Spring Ball")).await?;

    t.press(GUEST, "leave_feedback").await;
    assert_eq!(t.last_text(GUEST).await, "You have not attended any events yet.");

    t.press(GUEST, &format!("feedback_event_{event_id}")).await;
    assert!(t.dialogues.get_state(GUEST).await?.is_none());
    assert!(t.store.all_feedback().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_my_events_lists_album_links() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[]);
    let repos = t.store.repositories();
    repos.users.create_user(&sample_user(GUEST)).await?;
    let mut event = upcoming_event("Spring Ball");
    event.photo_album_link = Some("https://photos.example.com/ball".into());
    let event_id = repos.events.create_event(&event).await?;
    repos.user_events.add_user_event(GUEST, event_id).await?;

    t.press(GUEST, "my_events").await;
    let text = t.last_text(GUEST).await;
    assert!(text.contains("Spring Ball"));
    assert!(text.contains("https://photos.example.com/ball"));
    Ok(())
}
