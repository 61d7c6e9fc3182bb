use torrust_relay::{Config, DispatchPolicy};

/// A payload with more than one value, sent as a tuple.
pub type Announcement = (u16, String);

#[must_use]
pub fn sample_announcement() -> Announcement {
    (6969, "started".to_owned())
}

#[must_use]
pub fn live_dispatch() -> Config {
    Config {
        dispatch: DispatchPolicy::Live,
        ..Config::default()
    }
}
