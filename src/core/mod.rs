pub mod choice;
pub mod data;
pub mod ledger;
pub mod oracle;
pub mod session;
pub mod visual;
