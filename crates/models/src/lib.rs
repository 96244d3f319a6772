pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod tag;
pub mod birthday;
pub mod birthday_tag;
pub mod congratulation;

#[cfg(test)]
mod tests;
