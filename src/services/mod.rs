pub mod accounts;
pub mod availability;
pub mod conflict;
pub mod dates;
pub mod events;
pub mod lifecycle;
pub mod notify;
pub mod pricing;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
