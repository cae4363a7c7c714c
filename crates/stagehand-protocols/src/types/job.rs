//! Open requisitions a candidate can be associated with.

use serde::{Deserialize, Serialize};

use super::configuration::DropdownOption;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
}

impl Job {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

impl From<&DropdownOption> for Job {
    fn from(option: &DropdownOption) -> Self {
        Self::new(option.value.clone(), option.text.clone())
    }
}
