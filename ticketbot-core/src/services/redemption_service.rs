// File: ticketbot-core/src/services/redemption_service.rs

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};
use ticketbot_common::models::{Event, Ticket, User};
use crate::repositories::Repositories;
use crate::Error;

static TICKET_DEEP_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/start ticket_(\d+)$").unwrap());

/// Extracts the ticket id from a `/start ticket_<id>` command.
pub fn parse_ticket_command(text: &str) -> Option<i64> {
    TICKET_DEEP_LINK
        .captures(text.trim())
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inspection {
    /// No such ticket. Never conflated with a used one.
    NotFound,
    Found {
        ticket: Ticket,
        holder: User,
        event: Event,
        /// `true` until the ticket has been marked used.
        valid: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redemption {
    Redeemed,
    /// Already marked before; marking again changed nothing.
    AlreadyUsed,
    NotFound,
}

/// Door-side checks: look a ticket up, and mark it consumed.
pub struct RedemptionService {
    repos: Repositories,
}

impl RedemptionService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Validity is read from the used-set on every call.
    pub async fn inspect(&self, ticket_id: i64) -> Result<Inspection, Error> {
        let Some(ticket) = self.repos.tickets.get_ticket(ticket_id).await? else {
            debug!("Inspected unknown ticket {}", ticket_id);
            return Ok(Inspection::NotFound);
        };
        let holder = self.repos.users.get_user(ticket.user_id).await?;
        let event = self.repos.events.get_event(ticket.event_id).await?;
        let (Some(holder), Some(event)) = (holder, event) else {
            debug!("Ticket {} refers to a missing user or event", ticket_id);
            return Ok(Inspection::NotFound);
        };
        let valid = !self.repos.used_tickets.is_used(ticket_id).await?;
        Ok(Inspection::Found {
            ticket,
            holder,
            event,
            valid,
        })
    }

    pub async fn mark_used(&self, ticket_id: i64) -> Result<Redemption, Error> {
        if self.repos.tickets.get_ticket(ticket_id).await?.is_none() {
            return Ok(Redemption::NotFound);
        }
        if self.repos.used_tickets.is_used(ticket_id).await? {
            return Ok(Redemption::AlreadyUsed);
        }
        self.repos.used_tickets.mark_used(ticket_id).await?;
        info!("Ticket {} redeemed", ticket_id);
        Ok(Redemption::Redeemed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ticket_command() {
        assert_eq!(parse_ticket_command("/start ticket_42"), Some(42));
        assert_eq!(parse_ticket_command(" /start ticket_7 "), Some(7));
    }

    #[test]
    fn test_parse_ticket_command_rejects_other_starts() {
        assert_eq!(parse_ticket_command("/start"), None);
        assert_eq!(parse_ticket_command("/start ticket_"), None);
        assert_eq!(parse_ticket_command("/start ticket_12abc"), None);
        assert_eq!(parse_ticket_command("/start promo_12"), None);
        assert_eq!(parse_ticket_command("/start ticket_99999999999999999999999"), None);
    }
}
