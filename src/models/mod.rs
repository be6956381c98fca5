pub mod cfdi;

pub use cfdi::{CfdiRequest, GlobalInformation, Item, Receiver, Tax};
