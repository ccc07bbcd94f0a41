pub mod alarm_repository;
pub mod storage_repository;
