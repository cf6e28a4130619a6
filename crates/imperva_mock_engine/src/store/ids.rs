/// First account ID handed out by a fresh or reset registry.
pub const ACCOUNT_ID_START: i64 = 1000;
/// First site ID handed out by a fresh or reset registry.
pub const SITE_ID_START: i64 = 10000;

/// Monotonic ID counters, one per entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    next_account_id: i64,
    next_site_id: i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            next_account_id: ACCOUNT_ID_START,
            next_site_id: SITE_ID_START,
        }
    }

    pub fn next_account_id(&mut self) -> i64 {
        let id = self.next_account_id;
        self.next_account_id += 1;
        id
    }

    pub fn next_site_id(&mut self) -> i64 {
        let id = self.next_site_id;
        self.next_site_id += 1;
        id
    }

    /// Restart both counters at their seeds.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
