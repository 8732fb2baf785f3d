pub mod accounts;
pub mod comments;
pub mod events;
pub mod guests;
pub mod inventory;
pub mod invitations;
pub mod orders;
pub mod pricing;
