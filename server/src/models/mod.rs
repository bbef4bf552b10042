pub mod category;
pub mod event;
pub mod participant;

pub use category::Category;
pub use event::{Event, EventListing};
pub use participant::Participant;
