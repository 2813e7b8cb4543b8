use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Portal roles. Only `Admin`, `Teacher` and `Student` ever act on the leave
/// workflow; `DataEntry` sessions exist elsewhere in the system and are
/// refused by every workflow operation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActorRole {
    Admin,
    Teacher,
    Student,
    DataEntry,
}
