use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

/// Identifier the registry assigns to a habit. Ids grow with insertion order
/// and are never reused or reassigned.
pub type HabitId = i64;

/// A habit as the registry stores it, one json line in the habits file.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct Habit {
    pub id: HabitId,
    pub name: Arc<str>,
}

/// One completion mark inside a day file. The day itself is encoded in the
/// file name, so a line only carries the habit and the flag.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct CompletionEntity {
    pub habit_id: HabitId,
    pub value: bool,
}
