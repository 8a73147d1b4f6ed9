pub mod marketplace_repository;
