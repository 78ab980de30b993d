use std::time::SystemTime;

pub trait SystemTimeExt {
    /// Milliseconds since the Unix epoch, negative for earlier instants.
    fn unix_millis(&self) -> i128;
}

impl SystemTimeExt for SystemTime {
    fn unix_millis(&self) -> i128 {
        match self.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(after) => after.as_millis() as i128,
            Err(before) => -(before.duration().as_millis() as i128),
        }
    }
}
