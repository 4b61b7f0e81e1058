pub mod admin;
pub mod hadith;
pub mod leaderboard;
pub mod location;
pub mod masjids;
pub mod requests;
