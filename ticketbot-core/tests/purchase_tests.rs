// tests/purchase_tests.rs

use std::collections::BTreeSet;
use ticketbot_core::services::dialogue::{Dialogue, DialogueRepository, PurchaseStep};
use ticketbot_core::services::{Decision, Resolution};
use ticketbot_core::test_utils::helpers::*;
use ticketbot_core::test_utils::mocks::Sent;
use ticketbot_core::Error;
use ticketbot_common::models::InputFile;
use ticketbot_common::traits::repository_traits::{
    EventRepository, PaymentLinkRepository, UserRepository,
};

const BUYER: i64 = 42;
const ADMIN_A: i64 = 100;
const ADMIN_B: i64 = 200;

async fn on_sale_event(t: &TestBot, with_template: bool) -> Result<i64, Error> {
    let repos = t.store.repositories();
    let mut event = upcoming_event("Spring Ball");
    if with_template {
        let path = write_template(&t.settings.templates_dir, "template_test.png")?;
        event.template_path = Some(path.to_string_lossy().into_owned());
    }
    let event_id = repos.events.create_event(&event).await?;
    repos.payment_link.set_link("https://pay.example.com/donate").await?;
    repos.users.create_user(&sample_user(BUYER)).await?;
    Ok(event_id)
}

/// Walks the buyer from the catalogue button to a submitted receipt.
async fn submit_receipt(t: &TestBot, event_id: i64) {
    t.press(BUYER, &format!("order_{event_id}")).await;
    t.press(BUYER, &format!("buy_{event_id}")).await;
    t.press(BUYER, "payment_confirmed").await;
    t.send(photo(BUYER, "receipt-file")).await;
}

#[tokio::test]
async fn test_receipt_reaches_every_admin() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN_A, ADMIN_B]);
    let event_id = on_sale_event(&t, true).await?;

    submit_receipt(&t, event_id).await;

    assert_eq!(
        t.dialogues.get_state(BUYER).await?,
        Some(Dialogue::Purchase(PurchaseStep::AwaitingApproval { event_id }))
    );
    let prompts = t.store.all_notifications().await;
    assert_eq!(prompts.len(), 2);
    assert!(prompts.iter().all(|p| p.buyer_id == BUYER));

    for admin in [ADMIN_A, ADMIN_B] {
        let sent = t.transport.last_to(admin).await.unwrap();
        match &sent {
            Sent::Image { image, .. } => assert_eq!(image, &InputFile::FileId("receipt-file".into())),
            other => panic!("expected the receipt photo, got {other:?}"),
        }
        assert_eq!(
            sent.button_payloads(),
            vec![
                format!("confirm_payment_{BUYER}_{event_id}"),
                format!("disable_payment_{BUYER}_{event_id}"),
            ]
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_two_approvals_issue_one_ticket() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN_A, ADMIN_B]);
    let event_id = on_sale_event(&t, true).await?;
    submit_receipt(&t, event_id).await;
    let prompt_ids: BTreeSet<(i64, i64)> = t
        .store
        .all_notifications()
        .await
        .iter()
        .map(|p| (p.admin_id, p.message_id))
        .collect();

    let payload = format!("confirm_payment_{BUYER}_{event_id}");
    t.press(ADMIN_A, &payload).await;
    t.press(ADMIN_B, &payload).await;

    assert_eq!(t.store.all_tickets().await.len(), 1);
    assert_eq!(t.store.all_user_events().await.len(), 1);
    assert!(t.store.all_notifications().await.is_empty());
    let deleted: BTreeSet<(i64, i64)> = t.transport.deleted().await.into_iter().collect();
    assert_eq!(deleted, prompt_ids);
    assert!(t.dialogues.get_state(BUYER).await?.is_none());

    let ticket_messages: Vec<Sent> = t
        .transport
        .sent_to(BUYER)
        .await
        .into_iter()
        .filter(|s| matches!(s, Sent::Image { .. }))
        .collect();
    assert_eq!(ticket_messages.len(), 1);
    assert_eq!(ticket_messages[0].text(), "Your ticket for: Spring Ball");
    Ok(())
}

#[tokio::test]
async fn test_concurrent_decisions_settle_once() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN_A, ADMIN_B]);
    let event_id = on_sale_event(&t, true).await?;
    submit_receipt(&t, event_id).await;

    let approvals = t.bot.approvals();
    let (a, b) = tokio::join!(
        approvals.resolve(ADMIN_A, BUYER, event_id, Decision::Approve),
        approvals.resolve(ADMIN_B, BUYER, event_id, Decision::Reject),
    );
    let outcomes = [a?, b?];

    let settled = outcomes
        .iter()
        .filter(|r| **r != Resolution::AlreadyResolved)
        .count();
    assert_eq!(settled, 1);
    let issued = t.store.all_tickets().await.len();
    let approved = outcomes.iter().any(|r| matches!(r, Resolution::Approved { .. }));
    assert_eq!(issued, usize::from(approved));
    assert_eq!(t.store.all_user_events().await.len(), usize::from(approved));
    Ok(())
}

#[tokio::test]
async fn test_reject_then_approve_is_ignored() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN_A, ADMIN_B]);
    let event_id = on_sale_event(&t, true).await?;
    submit_receipt(&t, event_id).await;

    t.press(ADMIN_A, &format!("disable_payment_{BUYER}_{event_id}")).await;
    assert!(t.last_text(BUYER).await.contains("rejected"));
    assert!(t.last_text(BUYER).await.contains("@manager"));

    let late = t
        .bot
        .approvals()
        .resolve(ADMIN_B, BUYER, event_id, Decision::Approve)
        .await?;
    assert_eq!(late, Resolution::AlreadyResolved);
    assert!(t.store.all_tickets().await.is_empty());
    assert!(t.store.all_user_events().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_buyer_cannot_approve_own_payment() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN_A]);
    let event_id = on_sale_event(&t, true).await?;
    submit_receipt(&t, event_id).await;

    t.press(BUYER, &format!("confirm_payment_{BUYER}_{event_id}")).await;

    assert_eq!(t.last_text(BUYER).await, "This action is available to administrators only.");
    assert!(t.store.all_tickets().await.is_empty());
    assert_eq!(t.store.all_notifications().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_issued_ticket_image_is_written() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN_A]);
    let event_id = on_sale_event(&t, true).await?;
    submit_receipt(&t, event_id).await;

    let resolution = t
        .bot
        .approvals()
        .resolve(ADMIN_A, BUYER, event_id, Decision::Approve)
        .await?;
    let Resolution::Approved { ticket: Some(ticket) } = resolution else {
        panic!("expected an issued ticket, got {resolution:?}");
    };
    assert_eq!(ticket.user_id, BUYER);
    assert_eq!(ticket.event_id, event_id);
    assert!(ticket.image_path.ends_with(&format!("ticket_{BUYER}_{event_id}.png")));

    let rendered = image::open(&ticket.image_path).unwrap().to_rgba8();
    assert_eq!(rendered.dimensions(), blank_template().dimensions());
    Ok(())
}

#[tokio::test]
async fn test_delivery_failure_keeps_ticket() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN_A]);
    let event_id = on_sale_event(&t, true).await?;
    submit_receipt(&t, event_id).await;

    t.transport.fail_images(true);
    let resolution = t
        .bot
        .approvals()
        .resolve(ADMIN_A, BUYER, event_id, Decision::Approve)
        .await?;

    assert_eq!(resolution, Resolution::Approved { ticket: None });
    assert_eq!(t.store.all_tickets().await.len(), 1);
    assert!(t.last_text(BUYER).await.contains("@manager"));
    let admin_notice = t.last_text(ADMIN_A).await;
    assert!(admin_notice.contains("could not be issued"));
    assert!(!admin_notice.contains("Bad Request"));
    Ok(())
}

#[tokio::test]
async fn test_missing_template_issues_nothing() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN_A]);
    let event_id = on_sale_event(&t, false).await?;
    submit_receipt(&t, event_id).await;

    let resolution = t
        .bot
        .approvals()
        .resolve(ADMIN_A, BUYER, event_id, Decision::Approve)
        .await?;

    assert_eq!(resolution, Resolution::Approved { ticket: None });
    assert!(t.store.all_tickets().await.is_empty());
    assert_eq!(t.store.all_user_events().await.len(), 1);
    assert!(t.last_text(ADMIN_A).await.contains("could not be issued"));
    Ok(())
}

#[tokio::test]
async fn test_no_admins_points_buyer_to_manager() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[]);
    let event_id = on_sale_event(&t, true).await?;
    submit_receipt(&t, event_id).await;

    assert!(t.dialogues.get_state(BUYER).await?.is_none());
    assert!(t.store.all_notifications().await.is_empty());
    assert!(t.last_text(BUYER).await.contains("@manager"));
    Ok(())
}

#[tokio::test]
async fn test_purchase_cannot_be_cancelled_while_checked() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN_A]);
    let event_id = on_sale_event(&t, true).await?;
    submit_receipt(&t, event_id).await;

    t.press(BUYER, "payment_cancelled").await;

    assert_eq!(
        t.dialogues.get_state(BUYER).await?,
        Some(Dialogue::Purchase(PurchaseStep::AwaitingApproval { event_id }))
    );
    assert!(t.last_text(BUYER).await.contains("can no longer be cancelled"));
    Ok(())
}

#[tokio::test]
async fn test_cancel_before_payment() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN_A]);
    let event_id = on_sale_event(&t, true).await?;

    t.press(BUYER, &format!("order_{event_id}")).await;
    t.press(BUYER, &format!("buy_{event_id}")).await;
    t.press(BUYER, "payment_cancelled").await;

    assert!(t.dialogues.get_state(BUYER).await?.is_none());
    assert_eq!(t.last_text(BUYER).await, "Purchase cancelled.");
    assert!(t.store.all_notifications().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_missing_payment_link_is_reported() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN_A]);
    let repos = t.store.repositories();
    let event_id = repos.events.create_event(&upcoming_event("Spring Ball")).await?;
    repos.users.create_user(&sample_user(BUYER)).await?;

    t.press(BUYER, &format!("order_{event_id}")).await;
    t.press(BUYER, &format!("buy_{event_id}")).await;

    assert!(t.dialogues.get_state(BUYER).await?.is_none());
    assert!(t.last_text(BUYER).await.contains("payment is not set up yet"));
    Ok(())
}

#[tokio::test]
async fn test_catalogue_lists_only_active_events() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[]);
    let repos = t.store.repositories();
    repos.users.create_user(&sample_user(BUYER)).await?;

    repos.events.create_event(&upcoming_event("On sale")).await?;
    let mut closed = upcoming_event("Closed");
    closed.is_sale_active = false;
    repos.events.create_event(&closed).await?;
    let mut past = upcoming_event("Past");
    past.starts_at = chrono::NaiveDate::from_ymd_opt(2000, 1, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    repos.events.create_event(&past).await?;

    t.say(BUYER, "Buy ticket").await;

    let entries = t.transport.sent_to(BUYER).await;
    assert_eq!(entries.len(), 1);
    assert!(entries[0].text().starts_with("On sale"));
    Ok(())
}

#[tokio::test]
async fn test_empty_catalogue_points_to_channel() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[]);

    t.say(BUYER, "Buy ticket").await;
    assert!(t.last_text(BUYER).await.contains("https://t.me/test_news"));
    Ok(())
}

#[tokio::test]
async fn test_pending_purchase_blocks_another_from_the_menu() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN_A, ADMIN_B]);
    let first = on_sale_event(&t, true).await?;
    t.store
        .repositories()
        .events
        .create_event(&upcoming_event("Autumn Ball"))
        .await?;
    submit_receipt(&t, first).await;

    t.say(BUYER, "Buy ticket").await;

    assert!(t.last_text(BUYER).await.contains("still being checked"));
    assert_eq!(
        t.dialogues.get_state(BUYER).await?,
        Some(Dialogue::Purchase(PurchaseStep::AwaitingApproval { event_id: first }))
    );
    assert_eq!(t.store.all_notifications().await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_old_order_button_cannot_stack_a_second_receipt() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN_A, ADMIN_B]);
    let first = on_sale_event(&t, true).await?;
    let second = t
        .store
        .repositories()
        .events
        .create_event(&upcoming_event("Autumn Ball"))
        .await?;
    submit_receipt(&t, first).await;

    submit_receipt(&t, second).await;

    let prompts = t.store.all_notifications().await;
    assert_eq!(prompts.len(), 2);
    let buyer_texts: Vec<String> = t
        .transport
        .sent_to(BUYER)
        .await
        .iter()
        .map(|s| s.text().to_string())
        .collect();
    assert!(buyer_texts.iter().any(|m| m.contains("still being checked")));

    t.press(ADMIN_A, &format!("confirm_payment_{BUYER}_{first}")).await;
    let tickets = t.store.all_tickets().await;
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].event_id, first);
    assert!(t.store.all_notifications().await.is_empty());

    // settled, so a new purchase goes through again
    t.transport.clear().await;
    submit_receipt(&t, second).await;
    assert_eq!(
        t.dialogues.get_state(BUYER).await?,
        Some(Dialogue::Purchase(PurchaseStep::AwaitingApproval { event_id: second }))
    );
    assert_eq!(t.store.all_notifications().await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_missing_bot_username_issues_nothing() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let mut config = StaticConfig::with_admins(&[ADMIN_A]);
    config.bot_username = String::new();
    let t = TestBot::with_config(dir.path(), config);
    let event_id = on_sale_event(&t, true).await?;
    submit_receipt(&t, event_id).await;

    let resolution = t
        .bot
        .approvals()
        .resolve(ADMIN_A, BUYER, event_id, Decision::Approve)
        .await?;

    assert_eq!(resolution, Resolution::Approved { ticket: None });
    assert!(t.store.all_tickets().await.is_empty());
    assert!(t.last_text(ADMIN_A).await.contains("could not be issued"));
    assert!(t.last_text(BUYER).await.contains("@manager"));
    Ok(())
}
