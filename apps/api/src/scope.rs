use uuid::Uuid;

/// Owner scope carried by every core operation. Wrapping the user id in a
/// dedicated type means an unscoped query is a compile error, not a data
/// leak. The HTTP layer constructs it from the pre-authenticated caller id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerScope {
    user_id: Uuid,
}

impl OwnerScope {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
}
