pub mod analytics;
pub mod dashboard;
pub mod home;
pub mod loading;
pub mod login;
pub mod question;
pub mod submitted;
pub mod survey;
