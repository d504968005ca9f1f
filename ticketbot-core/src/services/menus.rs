// File: ticketbot-core/src/services/menus.rs
//
// Keyboards and the labels the router matches on.

use ticketbot_common::models::{Event, EventField, InlineButton, KeyboardButton, ReplyMarkup};
use crate::services::callbacks::CallbackAction;

pub const BUY_TICKET: &str = "Buy ticket";
pub const MY_ACCOUNT: &str = "My account";
pub const FEEDBACK: &str = "Feedback";
pub const MANAGE_EVENTS: &str = "⚙️ Manage events";
pub const UPDATE_PAYMENT_LINK: &str = "💰 Update payment link";
pub const GUEST_LIST: &str = "📄 Guest list";
pub const CANCEL: &str = "Cancel";
pub const SHARE_CONTACT: &str = "Share contact";

/// The entry points a menu button text maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    BuyTicket,
    MyAccount,
    Feedback,
    ManageEvents,
    UpdatePaymentLink,
    GuestList,
}

impl MenuCommand {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            BUY_TICKET => Some(MenuCommand::BuyTicket),
            MY_ACCOUNT => Some(MenuCommand::MyAccount),
            FEEDBACK => Some(MenuCommand::Feedback),
            MANAGE_EVENTS => Some(MenuCommand::ManageEvents),
            UPDATE_PAYMENT_LINK => Some(MenuCommand::UpdatePaymentLink),
            GUEST_LIST => Some(MenuCommand::GuestList),
            _ => None,
        }
    }

    pub fn admin_only(&self) -> bool {
        matches!(
            self,
            MenuCommand::ManageEvents | MenuCommand::UpdatePaymentLink | MenuCommand::GuestList
        )
    }
}

pub fn main_menu(is_admin: bool) -> ReplyMarkup {
    let mut rows = vec![
        vec![KeyboardButton::text(BUY_TICKET)],
        vec![KeyboardButton::text(MY_ACCOUNT)],
        vec![KeyboardButton::text(FEEDBACK)],
    ];
    if is_admin {
        rows.push(vec![KeyboardButton::text(MANAGE_EVENTS)]);
        rows.push(vec![KeyboardButton::text(UPDATE_PAYMENT_LINK)]);
        rows.push(vec![KeyboardButton::text(GUEST_LIST)]);
    }
    ReplyMarkup::Keyboard { rows, one_time: false }
}

pub fn cancel_keyboard() -> ReplyMarkup {
    ReplyMarkup::Keyboard {
        rows: vec![vec![KeyboardButton::text(CANCEL)]],
        one_time: true,
    }
}

pub fn contact_keyboard() -> ReplyMarkup {
    ReplyMarkup::Keyboard {
        rows: vec![
            vec![KeyboardButton::contact(SHARE_CONTACT)],
            vec![KeyboardButton::text(CANCEL)],
        ],
        one_time: true,
    }
}

pub fn back_to_menu() -> ReplyMarkup {
    ReplyMarkup::inline_column(vec![InlineButton::new(
        "🔙 Back to main menu",
        CallbackAction::MainMenu.encode(),
    )])
}

pub fn account_actions() -> ReplyMarkup {
    ReplyMarkup::inline_column(vec![
        InlineButton::new("My events", CallbackAction::MyEvents.encode()),
        InlineButton::new("My tickets", CallbackAction::MyTickets.encode()),
        InlineButton::new("Edit data", CallbackAction::EditProfile.encode()),
    ])
}

pub fn feedback_actions() -> ReplyMarkup {
    ReplyMarkup::inline_column(vec![
        InlineButton::new("Contact manager", CallbackAction::ContactManager.encode()),
        InlineButton::new("Leave feedback", CallbackAction::LeaveFeedback.encode()),
    ])
}

pub fn manage_events_actions() -> ReplyMarkup {
    ReplyMarkup::inline_column(vec![
        InlineButton::new("Add event", CallbackAction::AddEvent.encode()),
        InlineButton::new("Edit event", CallbackAction::EditEventMenu.encode()),
        InlineButton::new("Delete event", CallbackAction::DeleteEventMenu.encode()),
    ])
}

/// One button per event, each carrying `action(event_id)`.
pub fn event_picker(events: &[Event], action: impl Fn(i64) -> CallbackAction) -> ReplyMarkup {
    ReplyMarkup::inline_column(
        events
            .iter()
            .map(|e| InlineButton::new(e.name.clone(), action(e.event_id).encode()))
            .collect(),
    )
}

pub fn field_picker() -> ReplyMarkup {
    ReplyMarkup::inline_grid(
        EventField::ALL
            .iter()
            .map(|f| InlineButton::new(f.label(), CallbackAction::EditField { field: *f }.encode()))
            .collect(),
        2,
    )
}

pub fn rules_actions(event_id: i64) -> ReplyMarkup {
    ReplyMarkup::Inline(vec![vec![
        InlineButton::new("I have read it", CallbackAction::AcceptRules { event_id }.encode()),
        InlineButton::new(CANCEL, CallbackAction::CancelPurchase.encode()),
    ]])
}

pub fn payment_actions() -> ReplyMarkup {
    ReplyMarkup::Inline(vec![vec![
        InlineButton::new("I have paid", CallbackAction::PaymentSent.encode()),
        InlineButton::new(CANCEL, CallbackAction::CancelPurchase.encode()),
    ]])
}

pub fn catalogue_entry(event: &Event) -> (String, ReplyMarkup) {
    let text = format!(
        "{}\n\n{}\n\nDate: {}\nPrice: {}",
        event.name,
        event.description,
        event.starts_at_display(),
        event.price
    );
    let markup = ReplyMarkup::inline_column(vec![InlineButton::new(
        "Buy",
        CallbackAction::Order { event_id: event.event_id }.encode(),
    )]);
    (text, markup)
}
