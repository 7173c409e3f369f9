//! Sources of nondeterminism used when encoding: the current time and
//! fresh unique identifiers. Both are traits so callers can pin them.

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

/// Supplies "now".
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Supplies fresh globally unique identifiers.
pub trait UidSource {
    fn generate(&self) -> String;
}

/// The system clock, truncated to whole seconds (the wire precision).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(0)
    }
}

/// Random (v4) UUIDs in hyphenated form, e.g. `67e55044-10b1-426f-9247-bb680e5fe0c8`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUid;

impl UidSource for RandomUid {
    fn generate(&self) -> String {
        Uuid::new_v4().hyphenated().to_string()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Always hands out the same identifier.
#[derive(Debug, Clone)]
pub struct FixedUid(pub String);

impl UidSource for FixedUid {
    fn generate(&self) -> String {
        self.0.clone()
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<T: UidSource + ?Sized> UidSource for &T {
    fn generate(&self) -> String {
        (**self).generate()
    }
}
