pub mod db;
pub mod wow;
