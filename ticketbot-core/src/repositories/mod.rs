// src/repositories/mod.rs

pub mod postgres;

use std::sync::Arc;
use sqlx::{Pool, Postgres};
use ticketbot_common::traits::repository_traits::{
    AdminNotificationRepository, EventRepository, FeedbackRepository, PaymentLinkRepository,
    TicketRepository, UsedTicketRepository, UserEventRepository, UserRepository,
};
use self::postgres::{
    PostgresAdminNotificationRepository, PostgresEventRepository, PostgresFeedbackRepository,
    PostgresPaymentLinkRepository, PostgresTicketRepository, PostgresUsedTicketRepository,
    PostgresUserEventRepository, PostgresUserRepository,
};

/// Every store the services talk to, shared behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub events: Arc<dyn EventRepository>,
    pub tickets: Arc<dyn TicketRepository>,
    pub used_tickets: Arc<dyn UsedTicketRepository>,
    pub user_events: Arc<dyn UserEventRepository>,
    pub feedback: Arc<dyn FeedbackRepository>,
    pub notifications: Arc<dyn AdminNotificationRepository>,
    pub payment_link: Arc<dyn PaymentLinkRepository>,
}

impl Repositories {
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            events: Arc::new(PostgresEventRepository::new(pool.clone())),
            tickets: Arc::new(PostgresTicketRepository::new(pool.clone())),
            used_tickets: Arc::new(PostgresUsedTicketRepository::new(pool.clone())),
            user_events: Arc::new(PostgresUserEventRepository::new(pool.clone())),
            feedback: Arc::new(PostgresFeedbackRepository::new(pool.clone())),
            notifications: Arc::new(PostgresAdminNotificationRepository::new(pool.clone())),
            payment_link: Arc::new(PostgresPaymentLinkRepository::new(pool)),
        }
    }
}
