pub mod admin_repo;
pub mod masjid_repo;
pub mod notification_repo;
pub mod phone_request_repo;
pub mod schema;
pub mod update_request_repo;
