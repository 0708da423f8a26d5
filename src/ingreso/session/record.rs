//! The session record threaded between workflow steps. Every step reads the
//! whole record, mutates it and writes it back; there is no partial update.
//! All nested structs default their fields so older or partial records still
//! decode.

use super::id::SessionId;
use crate::ingreso::{
    api::types::Persona,
    calendar::{AcademicPeriod, TimeWindow},
    capture::Photo,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub identity: Identity,
    #[serde(default)]
    pub roles: Vec<RoleData>,
    /// Photo already on file with the backend.
    #[serde(default)]
    pub photo: Option<Photo>,
    #[serde(default)]
    pub workflow: WorkflowData,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub dni: String,
    pub name: Option<String>,
    pub persona_id: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Employee,
    Visitor,
    Security,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Student => "Student",
            Self::Employee => "Employee",
            Self::Visitor => "Visitor",
            Self::Security => "Security",
            Self::Admin => "Administrator",
        };
        f.write_str(label)
    }
}

/// Role-specific data; each variant carries only the fields of its role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleData {
    Student {
        #[serde(default)]
        account_number: Option<String>,
        #[serde(default = "active_by_default")]
        is_active: bool,
        #[serde(default)]
        campus: Option<String>,
    },
    Employee {
        #[serde(default)]
        employee_number: Option<String>,
        #[serde(default = "active_by_default")]
        is_active: bool,
        #[serde(default)]
        campus: Option<String>,
    },
    Visitor {
        #[serde(default)]
        visit_id: Option<i64>,
        #[serde(default)]
        visit_type: Option<String>,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        email: Option<String>,
        #[serde(default)]
        phone: Option<String>,
    },
    Security {
        account_number: String,
    },
    Admin {
        account_number: String,
    },
}

fn active_by_default() -> bool {
    true
}

impl RoleData {
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::Student { .. } => Role::Student,
            Self::Employee { .. } => Role::Employee,
            Self::Visitor { .. } => Role::Visitor,
            Self::Security { .. } => Role::Security,
            Self::Admin { .. } => Role::Admin,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        match self {
            Self::Student { is_active, .. } | Self::Employee { is_active, .. } => *is_active,
            _ => true,
        }
    }

    /// Account or employee number shown on the dashboard, if any.
    #[must_use]
    pub fn number(&self) -> Option<&str> {
        match self {
            Self::Student { account_number, .. } => account_number.as_deref(),
            Self::Employee {
                employee_number, ..
            } => employee_number.as_deref(),
            Self::Security { account_number } | Self::Admin { account_number } => {
                Some(account_number)
            }
            Self::Visitor { .. } => None,
        }
    }

    #[must_use]
    pub fn campus(&self) -> Option<&str> {
        match self {
            Self::Student { campus, .. } | Self::Employee { campus, .. } => campus.as_deref(),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMethod {
    Pedestrian,
    Vehicular,
}

impl EntryMethod {
    /// Value the backend expects in the entry `Tipo` field.
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Pedestrian => "Peatonal",
            Self::Vehicular => "Vehicular",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDescriptor {
    pub plate: String,
    pub make: String,
    pub model: String,
    pub color: String,
    /// Server-side id; `None` when kept locally in demo mode.
    #[serde(default)]
    pub vehicle_id: Option<i64>,
}

/// Step outputs accumulated before the final submission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowData {
    pub entry_method: Option<EntryMethod>,
    pub account_number: Option<String>,
    pub vehicle: Option<VehicleDescriptor>,
    pub photo: Option<Photo>,
    pub period: Option<AcademicPeriod>,
    pub planned: Option<TimeWindow>,
    /// Person found by the security panel lookup.
    pub lookup: Option<Persona>,
}

impl SessionRecord {
    #[must_use]
    pub fn new(session_id: SessionId, dni: impl Into<String>) -> Self {
        Self {
            session_id,
            identity: Identity {
                dni: dni.into(),
                ..Identity::default()
            },
            roles: Vec::new(),
            photo: None,
            workflow: WorkflowData::default(),
        }
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|data| data.role() == role)
    }

    #[must_use]
    pub fn is_visitor(&self) -> bool {
        self.has_role(Role::Visitor)
    }

    /// Student or employee of the university.
    #[must_use]
    pub fn is_member(&self) -> bool {
        self.has_role(Role::Student) || self.has_role(Role::Employee)
    }

    /// A record is active only when every role it holds is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.roles.iter().all(RoleData::is_active)
    }

    /// Message shown on the dashboard when the forward transition is blocked.
    #[must_use]
    pub fn inactive_message(&self) -> &'static str {
        let student_inactive = self
            .roles
            .iter()
            .any(|data| data.role() == Role::Student && !data.is_active());
        if student_inactive {
            "Your student account is not active. Check your enrollment with VOAE."
        } else {
            "Your employee account is not active. Contact Human Resources."
        }
    }

    /// Photo captured in this workflow, falling back to the one on file.
    #[must_use]
    pub fn effective_photo(&self) -> Option<&Photo> {
        self.workflow.photo.as_ref().or(self.photo.as_ref())
    }

    #[must_use]
    pub fn roles_display(&self) -> String {
        self.roles
            .iter()
            .map(|data| data.role().to_string())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> SessionRecord {
        SessionRecord::new(SessionId::parse("sid1").unwrap(), "0209200500236")
    }

    #[test]
    fn roles_are_tagged_by_name() {
        let data = RoleData::Student {
            account_number: Some("20201000123".to_string()),
            is_active: true,
            campus: Some("CU".to_string()),
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["role"], "student");
        assert_eq!(value["account_number"], "20201000123");
    }

    #[test]
    fn partial_records_decode_with_defaults() {
        let value = json!({
            "session_id": "sid1",
            "identity": { "dni": "0209200500236" },
            "roles": [{ "role": "employee" }]
        });
        let decoded: SessionRecord = serde_json::from_value(value).unwrap();
        assert!(decoded.identity.name.is_none());
        assert!(decoded.is_active());
        assert_eq!(decoded.workflow, WorkflowData::default());
    }

    #[test]
    fn inactive_student_blocks_and_names_student_desk() {
        let mut record = record();
        record.roles = vec![
            RoleData::Student {
                account_number: None,
                is_active: false,
                campus: None,
            },
            RoleData::Employee {
                employee_number: None,
                is_active: true,
                campus: None,
            },
        ];
        assert!(!record.is_active());
        assert!(record.inactive_message().contains("student"));
        assert_eq!(record.roles_display(), "Student / Employee");
    }

    #[test]
    fn visitors_and_staff_are_always_active() {
        let mut record = record();
        record.roles = vec![
            RoleData::Visitor {
                visit_id: Some(4),
                visit_type: None,
                reason: None,
                email: None,
                phone: None,
            },
            RoleData::Security {
                account_number: "SEG-1".to_string(),
            },
        ];
        assert!(record.is_active());
        assert!(record.is_visitor());
        assert!(!record.is_member());
    }

    #[test]
    fn workflow_photo_wins_over_photo_on_file() {
        let mut record = record();
        record.photo = Some(Photo::from_data_url("data:image/jpeg;base64,T0xE"));
        assert_eq!(
            record.effective_photo().map(Photo::as_str),
            Some("data:image/jpeg;base64,T0xE")
        );
        record.workflow.photo = Some(Photo::from_data_url("data:image/jpeg;base64,TkVX"));
        assert_eq!(
            record.effective_photo().map(Photo::as_str),
            Some("data:image/jpeg;base64,TkVX")
        );
    }

    #[test]
    fn entry_method_wire_names() {
        assert_eq!(EntryMethod::Pedestrian.wire_name(), "Peatonal");
        assert_eq!(EntryMethod::Vehicular.wire_name(), "Vehicular");
    }
}
