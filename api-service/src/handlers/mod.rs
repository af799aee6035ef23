pub mod confirmation_handlers;
pub mod login_handlers;
pub mod present_handlers;
