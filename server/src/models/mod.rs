pub mod event;
pub mod ticket;
pub mod transaction;

pub use event::EventCatalog;
pub use ticket::{Ticket, TicketStatus};
pub use transaction::Transaction;
