//! Groups a transaction export by vendor and totals credit, debit and net
//! over a date window.

pub mod data;
pub mod presenter;
pub mod session;
pub mod summary;
