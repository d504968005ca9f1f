// tests/repository_tests.rs
//
// Runs against a real Postgres (TEST_DATABASE_URL / DATABASE_ADMIN_URL):
//   cargo test --test repository_tests -- --ignored

use rust_decimal::Decimal;
use ticketbot_core::repositories::postgres::PostgresDialogueRepository;
use ticketbot_core::repositories::Repositories;
use ticketbot_core::services::dialogue::{Dialogue, DialogueRepository, PurchaseStep};
use ticketbot_core::test_utils::helpers::*;
use ticketbot_core::Error;
use ticketbot_common::models::{AdminNotification, EventFieldValue};
use ticketbot_common::traits::repository_traits::{
    AdminNotificationRepository, EventRepository, PaymentLinkRepository, TicketRepository,
    UsedTicketRepository, UserRepository,
};

#[tokio::test]
#[ignore = "needs a Postgres test database"]
async fn test_postgres_take_for_buyer_is_exclusive() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repos = Repositories::postgres(db.pool().clone());

    for (admin_id, message_id) in [(100, 1), (200, 2)] {
        repos
            .notifications
            .add_notification(&AdminNotification { admin_id, message_id, buyer_id: 42 })
            .await?;
    }
    repos
        .notifications
        .add_notification(&AdminNotification { admin_id: 100, message_id: 3, buyer_id: 43 })
        .await?;

    let (a, b) = tokio::join!(
        repos.notifications.take_for_buyer(42),
        repos.notifications.take_for_buyer(42),
    );
    let (a, b) = (a?, b?);
    assert_eq!(a.len() + b.len(), 2);
    assert!(a.is_empty() || b.is_empty());
    assert!(!repos.notifications.has_pending(42).await?);
    assert!(repos.notifications.has_pending(43).await?);
    Ok(())
}

#[tokio::test]
#[ignore = "needs a Postgres test database"]
async fn test_postgres_event_lifecycle() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repos = Repositories::postgres(db.pool().clone());

    repos.users.create_user(&sample_user(42)).await?;
    assert!(repos.users.create_user(&sample_user(42)).await.is_err());

    let event_id = repos.events.create_event(&upcoming_event("Spring Ball")).await?;
    let mut closed = upcoming_event("Closed");
    closed.is_sale_active = false;
    repos.events.create_event(&closed).await?;
    let now = chrono::Local::now().naive_local();
    let active = repos.events.list_active_events(now).await?;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].event_id, event_id);

    let before = repos.events.get_event(event_id).await?.unwrap();
    assert!(repos
        .events
        .update_field(event_id, &EventFieldValue::Price(Decimal::new(75050, 2)))
        .await?);
    let after = repos.events.get_event(event_id).await?.unwrap();
    let mut expected = before.clone();
    expected.price = Decimal::new(75050, 2);
    assert_eq!(after, expected);

    let ticket = repos.tickets.create_ticket(42, event_id, "qr_code/t.png").await?;
    assert!(!repos.used_tickets.is_used(ticket.ticket_id).await?);
    repos.used_tickets.mark_used(ticket.ticket_id).await?;
    repos.used_tickets.mark_used(ticket.ticket_id).await?;
    assert!(repos.used_tickets.is_used(ticket.ticket_id).await?);

    let attendees = repos.tickets.list_attendees(event_id).await?;
    assert_eq!(attendees.len(), 1);
    assert_eq!(attendees[0].phone_number, sample_user(42).phone_number);

    assert!(repos.events.delete_event(event_id).await?);
    assert!(repos.tickets.get_ticket(ticket.ticket_id).await?.is_none());
    assert!(!repos.events.delete_event(event_id).await?);
    Ok(())
}

#[tokio::test]
#[ignore = "needs a Postgres test database"]
async fn test_postgres_dialogue_and_payment_link() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repos = Repositories::postgres(db.pool().clone());
    let dialogues = PostgresDialogueRepository::new(db.pool().clone());

    let state = Dialogue::Purchase(PurchaseStep::AwaitingReceipt {
        event_id: 7,
        price: Decimal::new(50000, 2),
    });
    dialogues.set_state(42, &state).await?;
    assert_eq!(dialogues.get_state(42).await?, Some(state));
    dialogues.clear_state(42).await?;
    assert!(dialogues.get_state(42).await?.is_none());

    assert!(repos.payment_link.get_link().await?.is_none());
    repos.payment_link.set_link("https://pay.example.com/a").await?;
    repos.payment_link.set_link("https://pay.example.com/b").await?;
    assert_eq!(repos.payment_link.get_link().await?.as_deref(), Some("https://pay.example.com/b"));
    Ok(())
}
