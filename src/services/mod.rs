pub mod alarm_store;
pub mod expander;
pub mod notification;
pub mod validator;
