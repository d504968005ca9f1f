// tests/redemption_tests.rs

use ticketbot_core::services::ticket_render::ticket_deep_link;
use ticketbot_core::services::redemption_service::parse_ticket_command;
use ticketbot_core::services::{Inspection, Redemption};
use ticketbot_core::test_utils::helpers::*;
use ticketbot_core::Error;
use ticketbot_common::models::Ticket;
use ticketbot_common::traits::repository_traits::{EventRepository, TicketRepository, UserRepository};

const HOLDER: i64 = 42;
const ADMIN: i64 = 100;

async fn seeded_ticket(t: &TestBot) -> Result<Ticket, Error> {
    let repos = t.store.repositories();
    repos.users.create_user(&sample_user(HOLDER)).await?;
    let event_id = repos.events.create_event(&upcoming_event("Spring Ball")).await?;
    repos.tickets.create_ticket(HOLDER, event_id, "qr_code/ticket.png").await
}

#[tokio::test]
async fn test_deep_link_resolves_back_to_holder_and_event() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN]);
    let ticket = seeded_ticket(&t).await?;

    let link = ticket_deep_link("test_ticket_bot", ticket.ticket_id)?;
    let payload = link
        .query_pairs()
        .find(|(k, _)| k == "start")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    let ticket_id = parse_ticket_command(&format!("/start {payload}")).unwrap();

    match t.bot.redemption().inspect(ticket_id).await? {
        Inspection::Found { holder, event, valid, .. } => {
            assert_eq!(holder.user_id, HOLDER);
            assert_eq!(event.event_id, ticket.event_id);
            assert!(valid);
        }
        Inspection::NotFound => panic!("ticket {ticket_id} should exist"),
    }
    Ok(())
}

#[tokio::test]
async fn test_admin_scan_and_redeem() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN]);
    let ticket = seeded_ticket(&t).await?;
    let command = format!("/start ticket_{}", ticket.ticket_id);

    t.say(ADMIN, &command).await;
    let card = t.transport.last_to(ADMIN).await.unwrap();
    assert!(card.text().contains("Spring Ball"));
    assert!(card.text().contains("Status: ✅ Valid"));
    assert_eq!(card.button_payloads(), vec![format!("used_ticket_{}", ticket.ticket_id)]);

    t.press(ADMIN, &format!("used_ticket_{}", ticket.ticket_id)).await;
    assert_eq!(t.last_text(ADMIN).await, "Ticket marked as used!");

    t.press(ADMIN, &format!("used_ticket_{}", ticket.ticket_id)).await;
    assert_eq!(t.last_text(ADMIN).await, "This ticket has already been used.");

    t.say(ADMIN, &command).await;
    assert!(t.last_text(ADMIN).await.contains("Already used"));
    Ok(())
}

#[tokio::test]
async fn test_mark_used_is_idempotent() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN]);
    let ticket = seeded_ticket(&t).await?;
    let redemption = t.bot.redemption();

    assert_eq!(redemption.mark_used(ticket.ticket_id).await?, Redemption::Redeemed);
    assert_eq!(redemption.mark_used(ticket.ticket_id).await?, Redemption::AlreadyUsed);
    assert!(matches!(
        redemption.inspect(ticket.ticket_id).await?,
        Inspection::Found { valid: false, .. }
    ));
    Ok(())
}

#[tokio::test]
async fn test_unknown_ticket_is_not_reported_as_used() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN]);
    seeded_ticket(&t).await?;

    assert_eq!(t.bot.redemption().inspect(999).await?, Inspection::NotFound);
    assert_eq!(t.bot.redemption().mark_used(999).await?, Redemption::NotFound);

    t.say(ADMIN, "/start ticket_999").await;
    assert_eq!(t.last_text(ADMIN).await, "❌ Ticket not found or invalid.");
    Ok(())
}

#[tokio::test]
async fn test_holder_sees_card_without_redeem_button() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let t = TestBot::new(dir.path(), &[ADMIN]);
    let ticket = seeded_ticket(&t).await?;

    t.say(HOLDER, &format!("/start ticket_{}", ticket.ticket_id)).await;
    let card = t.transport.last_to(HOLDER).await.unwrap();
    assert!(card.text().contains("Spring Ball"));
    assert!(!card.text().contains("Status"));
    assert!(card.button_payloads().is_empty());

    t.press(HOLDER, &format!("used_ticket_{}", ticket.ticket_id)).await;
    assert_eq!(t.last_text(HOLDER).await, "This action is available to administrators only.");
    assert!(matches!(
        t.bot.redemption().inspect(ticket.ticket_id).await?,
        Inspection::Found { valid: true, .. }
    ));
    Ok(())
}
