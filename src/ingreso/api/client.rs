//! Backend operations used by the workflow steps. `Backend` is the seam steps
//! depend on; `HttpBackend` is the REST implementation.

use super::{
    errors::ApiError,
    http::HttpClient,
    types::{
        AccountLogin, Credentials, Employee, LoginProfile, Make, Model, NewEntry, NewExit,
        NewPersona, NewVehicle, NewVisit, Persona, ReportKind, Student, Vehicle, Visit,
    },
};
use crate::ingreso::config::AppConfig;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use tracing::{debug, instrument};

#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /personas/{dni}`; `None` when the person is unknown.
    async fn person_by_dni(&self, dni: &str) -> Result<Option<Persona>, ApiError>;

    /// `POST /personas`
    async fn create_person(&self, person: &NewPersona) -> Result<Persona, ApiError>;

    /// `POST /personas/login`
    async fn person_login(&self, credentials: &Credentials) -> Result<(), ApiError>;

    /// `GET /estudiantes/por-persona/{id}`
    async fn student_by_person(&self, persona_id: i64) -> Result<Option<Student>, ApiError>;

    /// `GET /empleados/por-persona/{id}`
    async fn employee_by_person(&self, persona_id: i64) -> Result<Option<Employee>, ApiError>;

    /// `GET /visitas/persona/{dni}`; empty when there is no prior visit.
    async fn visits_by_dni(&self, dni: &str) -> Result<Vec<Visit>, ApiError>;

    /// `POST /visitas`
    async fn create_visit(&self, visit: &NewVisit) -> Result<Visit, ApiError>;

    /// `POST /visitas/login`
    async fn visitor_login(&self, credentials: &Credentials) -> Result<(), ApiError>;

    /// `GET /referencias/marcas`
    async fn makes(&self) -> Result<Vec<Make>, ApiError>;

    /// `GET /referencias/modelos/{make_id}`
    async fn models(&self, make_id: i64) -> Result<Vec<Model>, ApiError>;

    /// `POST /vehiculos`
    async fn register_vehicle(&self, vehicle: &NewVehicle) -> Result<Vehicle, ApiError>;

    /// `POST /ingresos`
    async fn submit_entry(&self, entry: &NewEntry) -> Result<(), ApiError>;

    /// `POST /salidas`
    async fn submit_exit(&self, exit: &NewExit) -> Result<(), ApiError>;

    /// `POST /auth/login`
    async fn login(&self, login: &AccountLogin) -> Result<LoginProfile, ApiError>;

    /// `GET /ingresos`, `/personas` or `/vehiculos`.
    async fn report(&self, kind: ReportKind) -> Result<Vec<Value>, ApiError>;
}

#[derive(Clone, Debug)]
pub struct HttpBackend {
    http: HttpClient,
}

impl HttpBackend {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        Ok(Self {
            http: HttpClient::new(config)?,
        })
    }
}

/// Wraps a non-array JSON document as a single row.
fn into_rows(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self))]
    async fn person_by_dni(&self, dni: &str) -> Result<Option<Persona>, ApiError> {
        self.http.get_optional_json(&format!("/personas/{dni}")).await
    }

    #[instrument(skip_all)]
    async fn create_person(&self, person: &NewPersona) -> Result<Persona, ApiError> {
        self.http.post_json("/personas", person).await
    }

    #[instrument(skip_all, fields(dni = %credentials.dni))]
    async fn person_login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let body = json!({
            "dni": credentials.dni,
            "password": credentials.password.expose_secret(),
        });
        self.http.post_json_empty("/personas/login", &body).await
    }

    #[instrument(skip(self))]
    async fn student_by_person(&self, persona_id: i64) -> Result<Option<Student>, ApiError> {
        let found: Option<Value> = self
            .http
            .get_optional_json(&format!("/estudiantes/por-persona/{persona_id}"))
            .await?;
        // Only the status matters for the role; details are best effort.
        Ok(found.map(|value| serde_json::from_value(value).unwrap_or_default()))
    }

    #[instrument(skip(self))]
    async fn employee_by_person(&self, persona_id: i64) -> Result<Option<Employee>, ApiError> {
        let found: Option<Value> = self
            .http
            .get_optional_json(&format!("/empleados/por-persona/{persona_id}"))
            .await?;
        Ok(found.map(|value| serde_json::from_value(value).unwrap_or_default()))
    }

    #[instrument(skip(self))]
    async fn visits_by_dni(&self, dni: &str) -> Result<Vec<Visit>, ApiError> {
        let found: Option<Value> = self
            .http
            .get_optional_json(&format!("/visitas/persona/{dni}"))
            .await?;

        let visits = match found {
            Some(Value::Array(rows)) => rows
                .into_iter()
                .filter_map(|row| serde_json::from_value(row).ok())
                .collect(),
            _ => Vec::new(),
        };
        debug!("found {} prior visits", visits.len());

        Ok(visits)
    }

    #[instrument(skip_all, fields(persona_id = visit.persona_id))]
    async fn create_visit(&self, visit: &NewVisit) -> Result<Visit, ApiError> {
        self.http.post_json("/visitas", visit).await
    }

    #[instrument(skip_all, fields(dni = %credentials.dni))]
    async fn visitor_login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let body = json!({
            "dni": credentials.dni,
            "password": credentials.password.expose_secret(),
        });
        self.http.post_json_empty("/visitas/login", &body).await
    }

    #[instrument(skip(self))]
    async fn makes(&self) -> Result<Vec<Make>, ApiError> {
        self.http.get_json("/referencias/marcas").await
    }

    #[instrument(skip(self))]
    async fn models(&self, make_id: i64) -> Result<Vec<Model>, ApiError> {
        self.http
            .get_json(&format!("/referencias/modelos/{make_id}"))
            .await
    }

    #[instrument(skip_all, fields(plate = %vehicle.plate))]
    async fn register_vehicle(&self, vehicle: &NewVehicle) -> Result<Vehicle, ApiError> {
        let created: Value = self.http.post_json("/vehiculos", vehicle).await?;
        Ok(serde_json::from_value(created).unwrap_or_default())
    }

    #[instrument(skip_all, fields(kind = %entry.kind, persona_id = entry.persona_id))]
    async fn submit_entry(&self, entry: &NewEntry) -> Result<(), ApiError> {
        self.http.post_json_empty("/ingresos", entry).await
    }

    #[instrument(skip_all, fields(persona_id = exit.persona_id))]
    async fn submit_exit(&self, exit: &NewExit) -> Result<(), ApiError> {
        self.http.post_json_empty("/salidas", exit).await
    }

    #[instrument(skip_all, fields(account = %login.account_number))]
    async fn login(&self, login: &AccountLogin) -> Result<LoginProfile, ApiError> {
        let body = json!({
            "NumeroCuenta": login.account_number,
            "Contrasena": login.password.expose_secret(),
        });
        self.http.post_json("/auth/login", &body).await
    }

    #[instrument(skip(self))]
    async fn report(&self, kind: ReportKind) -> Result<Vec<Value>, ApiError> {
        let value: Value = self.http.get_json(kind.path()).await?;
        Ok(into_rows(value))
    }
}
