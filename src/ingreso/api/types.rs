//! Request and response types for the access-control backend. Field names
//! follow the backend's JSON (`Id_persona`, `Nombre`, ...). Response types
//! default every optional field because the backend omits them freely.
//! Photo payloads and credentials travel through here, so none of these are
//! logged whole.

use crate::ingreso::capture::Photo;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    #[serde(rename = "Id_persona")]
    pub id: i64,
    #[serde(rename = "DNI", default)]
    pub dni: String,
    #[serde(rename = "Nombre", default)]
    pub first_name: String,
    #[serde(rename = "Apellido", default)]
    pub last_name: String,
    #[serde(rename = "Email", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "Telefono", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "FotoBase64", default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Photo>,
}

impl Persona {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewPersona {
    #[serde(rename = "Nombre")]
    pub first_name: String,
    #[serde(rename = "Apellido")]
    pub last_name: String,
    #[serde(rename = "DNI")]
    pub dni: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Telefono")]
    pub phone: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Student {
    #[serde(rename = "NumeroCuenta", default)]
    pub account_number: Option<String>,
    #[serde(rename = "Activo", default)]
    pub active: Option<bool>,
    #[serde(rename = "CentroUniversitario", default)]
    pub campus: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Employee {
    #[serde(rename = "NumeroEmpleado", default)]
    pub employee_number: Option<String>,
    #[serde(rename = "Activo", default)]
    pub active: Option<bool>,
    #[serde(rename = "CentroUniversitario", default)]
    pub campus: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Visit {
    #[serde(rename = "Id_visita", alias = "id", default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub persona: Option<Persona>,
    #[serde(rename = "TipoVisita", default)]
    pub visit_type: Option<String>,
    #[serde(rename = "Motivo", default)]
    pub reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewVisit {
    #[serde(rename = "Id_persona")]
    pub persona_id: i64,
    #[serde(rename = "TipoVisita")]
    pub visit_type: String,
    #[serde(rename = "Motivo")]
    pub reason: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Telefono")]
    pub phone: String,
    /// Empty when the visitor registered without a photo.
    #[serde(rename = "FotoBase64")]
    pub photo: Photo,
}

/// Identity-number login for internal people and returning visitors.
#[derive(Debug)]
pub struct Credentials {
    pub dni: String,
    pub password: SecretString,
}

/// Account-number login for the staff entry point.
#[derive(Debug)]
pub struct AccountLogin {
    pub account_number: String,
    pub password: SecretString,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct LoginProfile {
    #[serde(rename = "Nombre", default)]
    pub first_name: Option<String>,
    #[serde(rename = "Apellido", default)]
    pub last_name: Option<String>,
    #[serde(rename = "Rol", default)]
    pub role: Option<String>,
    #[serde(rename = "DNI", default)]
    pub dni: Option<String>,
    #[serde(rename = "Id_persona", default)]
    pub persona_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Make {
    #[serde(rename = "Id_marca")]
    pub id: i64,
    #[serde(rename = "Marca", default)]
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Model {
    #[serde(rename = "Id_modelo")]
    pub id: i64,
    #[serde(rename = "Modelo", default)]
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewVehicle {
    #[serde(rename = "Id_modelo")]
    pub model_id: i64,
    #[serde(rename = "Color")]
    pub color: String,
    #[serde(rename = "Ano")]
    pub year: i32,
    #[serde(rename = "Matricula")]
    pub plate: String,
    #[serde(rename = "Id_persona")]
    pub persona_id: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Vehicle {
    #[serde(rename = "Id_vehiculo", alias = "id", default)]
    pub id: Option<i64>,
}

/// Entry record. Date and time of the entry are stamped by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewEntry {
    #[serde(rename = "Motivo")]
    pub reason: Option<String>,
    #[serde(rename = "Tipo")]
    pub kind: String,
    #[serde(rename = "Id_persona")]
    pub persona_id: i64,
    #[serde(rename = "Matricula", skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    #[serde(rename = "Periodo", skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(rename = "HoraEntrada", skip_serializing_if = "Option::is_none")]
    pub planned_entry: Option<String>,
    #[serde(rename = "HoraSalida", skip_serializing_if = "Option::is_none")]
    pub planned_exit: Option<String>,
    #[serde(rename = "FotoBase64", skip_serializing_if = "Option::is_none")]
    pub photo: Option<Photo>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewExit {
    #[serde(rename = "Id_persona")]
    pub persona_id: i64,
}

/// Administrative report tabs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    Entries,
    People,
    Vehicles,
}

impl ReportKind {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Entries => "/ingresos",
            Self::People => "/personas",
            Self::Vehicles => "/vehiculos",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Entries => "entries",
            Self::People => "people",
            Self::Vehicles => "vehicles",
        };
        f.write_str(label)
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "entries" | "ingresos" => Ok(Self::Entries),
            "people" | "personas" => Ok(Self::People),
            "vehicles" | "vehiculos" => Ok(Self::Vehicles),
            other => Err(format!("unknown report: {other}")),
        }
    }
}
