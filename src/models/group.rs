//! Round-robin groups and the placement of registrations into them.

use crate::models::registration::RegistrationId;
use crate::models::tournament::ModalityId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a group.
pub type GroupId = Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub modality_id: ModalityId,
    /// Display name, also used as the round name of its matches.
    pub name: String,
    /// 1-based display / seeding order.
    pub order: u32,
    pub group_size: u32,
}

impl Group {
    pub fn new(modality_id: ModalityId, order: u32, group_size: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            modality_id,
            name: group_name(order),
            order,
            group_size,
        }
    }
}

/// A registration's seat in a group.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupPlacement {
    pub group_id: GroupId,
    pub registration_id: RegistrationId,
    /// 1-based position inside the group (1 = strongest).
    pub seed: u32,
}

/// "Group A" .. "Group Z", then numeric names.
fn group_name(order: u32) -> String {
    match order {
        1..=26 => {
            let letter = (b'A' + (order - 1) as u8) as char;
            format!("Group {letter}")
        }
        n => format!("Group {n}"),
    }
}
