//! Domain models for mailbox entities

mod label;
mod message;

pub use label::{
    LabelColor, LabelDelta, LabelId, LabelListVisibility, LabelType, MessageListVisibility,
    UserLabel,
};
pub use message::{Fidelity, Header, Message, MessageId, MimePart, PartBody};
