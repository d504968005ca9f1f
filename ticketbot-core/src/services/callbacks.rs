// File: ticketbot-core/src/services/callbacks.rs
//
// Button payloads. Every inline button carries one of these, encoded as a
// short string (the platform caps payloads at 64 bytes).

use ticketbot_common::models::EventField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    MainMenu,
    /// "Buy" under a catalogue entry: show the rules.
    Order { event_id: i64 },
    /// Rules acknowledged: show payment instructions.
    AcceptRules { event_id: i64 },
    PaymentSent,
    CancelPurchase,
    Approve { buyer_id: i64, event_id: i64 },
    Reject { buyer_id: i64, event_id: i64 },
    Redeem { ticket_id: i64 },
    MyEvents,
    MyTickets,
    EditProfile,
    ContactManager,
    LeaveFeedback,
    FeedbackEvent { event_id: i64 },
    AddEvent,
    EditEventMenu,
    DeleteEventMenu,
    EditEvent { event_id: i64 },
    EditField { field: EventField },
    DeleteEvent { event_id: i64 },
    GuestList { event_id: i64 },
}

impl CallbackAction {
    pub fn encode(&self) -> String {
        match self {
            CallbackAction::MainMenu => "back_to_main_menu".to_string(),
            CallbackAction::Order { event_id } => format!("order_{}", event_id),
            CallbackAction::AcceptRules { event_id } => format!("buy_{}", event_id),
            CallbackAction::PaymentSent => "payment_confirmed".to_string(),
            CallbackAction::CancelPurchase => "payment_cancelled".to_string(),
            CallbackAction::Approve { buyer_id, event_id } => {
                format!("confirm_payment_{}_{}", buyer_id, event_id)
            }
            CallbackAction::Reject { buyer_id, event_id } => {
                format!("disable_payment_{}_{}", buyer_id, event_id)
            }
            CallbackAction::Redeem { ticket_id } => format!("used_ticket_{}", ticket_id),
            CallbackAction::MyEvents => "my_events".to_string(),
            CallbackAction::MyTickets => "my_tickets".to_string(),
            CallbackAction::EditProfile => "edit_data".to_string(),
            CallbackAction::ContactManager => "contact_manager".to_string(),
            CallbackAction::LeaveFeedback => "leave_feedback".to_string(),
            CallbackAction::FeedbackEvent { event_id } => format!("feedback_event_{}", event_id),
            CallbackAction::AddEvent => "add_event".to_string(),
            CallbackAction::EditEventMenu => "edit_event".to_string(),
            CallbackAction::DeleteEventMenu => "delete_event".to_string(),
            CallbackAction::EditEvent { event_id } => format!("edit_event_{}", event_id),
            CallbackAction::EditField { field } => format!("edit_field_{}", field.as_str()),
            CallbackAction::DeleteEvent { event_id } => format!("delete_event_{}", event_id),
            CallbackAction::GuestList { event_id } => format!("guests_event_{}", event_id),
        }
    }

    pub fn parse(payload: &str) -> Option<Self> {
        let exact = match payload {
            "back_to_main_menu" => Some(CallbackAction::MainMenu),
            "payment_confirmed" => Some(CallbackAction::PaymentSent),
            "payment_cancelled" => Some(CallbackAction::CancelPurchase),
            "my_events" => Some(CallbackAction::MyEvents),
            "my_tickets" => Some(CallbackAction::MyTickets),
            "edit_data" => Some(CallbackAction::EditProfile),
            "contact_manager" => Some(CallbackAction::ContactManager),
            "leave_feedback" => Some(CallbackAction::LeaveFeedback),
            "add_event" => Some(CallbackAction::AddEvent),
            "edit_event" => Some(CallbackAction::EditEventMenu),
            "delete_event" => Some(CallbackAction::DeleteEventMenu),
            _ => None,
        };
        if exact.is_some() {
            return exact;
        }

        if let Some(rest) = payload.strip_prefix("confirm_payment_") {
            let (buyer_id, event_id) = two_ids(rest)?;
            return Some(CallbackAction::Approve { buyer_id, event_id });
        }
        if let Some(rest) = payload.strip_prefix("disable_payment_") {
            let (buyer_id, event_id) = two_ids(rest)?;
            return Some(CallbackAction::Reject { buyer_id, event_id });
        }
        if let Some(rest) = payload.strip_prefix("edit_field_") {
            return EventField::parse(rest).map(|field| CallbackAction::EditField { field });
        }

        let with_id: [(&str, fn(i64) -> CallbackAction); 7] = [
            ("order_", |event_id| CallbackAction::Order { event_id }),
            ("buy_", |event_id| CallbackAction::AcceptRules { event_id }),
            ("used_ticket_", |ticket_id| CallbackAction::Redeem { ticket_id }),
            ("feedback_event_", |event_id| CallbackAction::FeedbackEvent { event_id }),
            ("edit_event_", |event_id| CallbackAction::EditEvent { event_id }),
            ("delete_event_", |event_id| CallbackAction::DeleteEvent { event_id }),
            ("guests_event_", |event_id| CallbackAction::GuestList { event_id }),
        ];
        with_id.iter().find_map(|(prefix, build)| {
            payload
                .strip_prefix(prefix)
                .and_then(|rest| rest.parse::<i64>().ok())
                .map(build)
        })
    }
}

fn two_ids(rest: &str) -> Option<(i64, i64)> {
    let (a, b) = rest.split_once('_')?;
    Some((a.parse().ok()?, b.parse().ok()?))
}
