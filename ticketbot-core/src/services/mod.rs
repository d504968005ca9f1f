pub mod approval_service;
pub mod bot_service;
pub mod callbacks;
pub mod dialogue;
pub mod event_admin_service;
pub mod menus;
pub mod redemption_service;
pub mod ticket_issuer;
pub mod ticket_render;

pub use approval_service::{ApprovalService, Decision, Receipt, Resolution};
pub use bot_service::BotService;
pub use callbacks::CallbackAction;
pub use dialogue::{Dialogue, DialogueRepository, InMemoryDialogueRepository};
pub use event_admin_service::EventAdminService;
pub use redemption_service::{Inspection, Redemption, RedemptionService};
pub use ticket_issuer::TicketIssuer;
