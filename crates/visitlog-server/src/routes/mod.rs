pub mod client;
pub mod health;
pub mod logs;
pub mod pages;
pub mod track;
