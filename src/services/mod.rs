pub mod geocode_service;
pub mod hadith_service;
pub mod leaderboard_service;
pub mod masjid_service;
pub mod update_request_service;
