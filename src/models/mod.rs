pub mod prayer_times;

pub use prayer_times::PrayerTimes;
