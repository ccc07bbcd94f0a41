pub mod alarm;
pub mod tone;
