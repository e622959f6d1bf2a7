pub mod alert;
pub mod changes;
pub mod dedup;
pub mod price;
pub mod snapshot;
