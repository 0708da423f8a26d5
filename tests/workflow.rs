#![allow(clippy::unwrap_used)]

use chrono::{NaiveDate, NaiveDateTime};
use ingreso::ingreso::{
    api::{types::ReportKind, HttpBackend},
    capture::Photo,
    config::AppConfig,
    session::{DirStorage, EntryMethod, MemoryStorage, Role, RoleData, SessionRecord, SessionStore},
    validate::Choice,
    workflow::{
        AdminAction, EntryForm, Notice, SecurityAction, Step, StepError, StepInput, VehicleForm,
        VisitorForm, WorkflowRouter,
    },
};
use secrecy::SecretString;
use serde_json::json;
use std::net::TcpListener;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DNI: &str = "0209200500236";

type Router = WorkflowRouter<MemoryStorage, HttpBackend>;

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn morning() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 10)
        .and_then(|date| date.and_hms_opt(9, 30, 0))
        .unwrap_or_default()
}

fn router_for(uri: &str, entry: Step, demo: bool) -> Router {
    let mut config = AppConfig::default().with_base_url(uri);
    config.demo_mode = demo;
    let backend = HttpBackend::new(&config).unwrap();
    let mut router =
        WorkflowRouter::new(SessionStore::new(MemoryStorage::new()), backend, config, entry);
    router.set_clock(morning);
    router
}

fn password(value: &str) -> SecretString {
    SecretString::from(value)
}

async fn mount_student(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/personas/{DNI}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Id_persona": 42,
            "DNI": DNI,
            "Nombre": "Ana",
            "Apellido": "López"
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/estudiantes/por-persona/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "NumeroCuenta": "20201000123",
            "Activo": true,
            "CentroUniversitario": "CU"
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/empleados/por-persona/42"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/referencias/marcas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Id_marca": 1, "Marca": "TOYOTA" },
            { "Id_marca": 2, "Marca": "Honda" }
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/referencias/modelos/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Id_modelo": 10, "Modelo": "Corolla" },
            { "Id_modelo": 11, "Modelo": "Hilux" }
        ])))
        .mount(server)
        .await;
}

fn vehicle_form(make: &str) -> VehicleForm {
    VehicleForm {
        plate: "hab1234".to_string(),
        make: Choice::parse(make),
        model: Choice::parse("Corolla"),
        color: Choice::parse("Gris"),
        year: Some(2019),
    }
}

#[tokio::test]
async fn student_vehicular_entry_end_to_end() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    mount_student(&server).await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/personas/login"))
        .and(body_partial_json(json!({ "dni": DNI, "password": "s3cret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/vehiculos"))
        .and(body_partial_json(json!({
            "Id_modelo": 10, "Matricula": "HAB1234", "Id_persona": 42, "Ano": 2019
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "Id_vehiculo": 7 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ingresos"))
        .and(body_partial_json(json!({
            "Tipo": "Vehicular",
            "Id_persona": 42,
            "Matricula": "HAB1234",
            "Periodo": "Period 1"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut router = router_for(&server.uri(), Step::Identify, false);
    let sid = router.location().sid.clone();

    router
        .dispatch(StepInput::Identify {
            dni: DNI.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(router.step(), Step::Authenticate);
    let record = router.record().unwrap();
    assert!(record.has_role(Role::Student));
    assert_eq!(record.identity.name.as_deref(), Some("Ana López"));

    router
        .dispatch(StepInput::Authenticate {
            password: password("s3cret"),
        })
        .await
        .unwrap();
    assert_eq!(router.step(), Step::RoleDashboard);

    router.dispatch(StepInput::Continue).await.unwrap();
    assert_eq!(router.step(), Step::ChooseEntryMethod);

    router
        .dispatch(StepInput::ChooseEntryMethod {
            method: EntryMethod::Vehicular,
            account_number: Some("20201000123".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(router.step(), Step::RegisterVehicle);

    // Submission is unreachable until the vehicle is registered.
    let err = router
        .dispatch(StepInput::SubmitEntry(EntryForm::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, StepError::UnexpectedInput(Step::RegisterVehicle)));

    router
        .dispatch(StepInput::RegisterVehicle(vehicle_form("toyota")))
        .await
        .unwrap();
    assert_eq!(router.step(), Step::CapturePhoto);
    let vehicle = router.record().unwrap().workflow.vehicle.unwrap();
    assert_eq!(vehicle.vehicle_id, Some(7));

    router
        .dispatch(StepInput::CapturePhoto {
            photo: Some(Photo::encode("image/jpeg", b"face")),
        })
        .await
        .unwrap();
    assert_eq!(router.step(), Step::SubmitEntry);

    // The same session id is carried through every step.
    assert_eq!(router.location().sid, sid);

    let notice = router
        .dispatch(StepInput::SubmitEntry(EntryForm::default()))
        .await
        .unwrap();
    assert_eq!(
        notice,
        Some(Notice::Message(
            "Entry registered. Welcome, Ana López!".to_string()
        ))
    );
    assert_eq!(router.step(), Step::Terminal);
    assert!(router.store().storage().is_empty());
}

#[tokio::test]
async fn unknown_person_registers_as_visitor() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/personas/{DNI}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/visitas/persona/{DNI}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/personas"))
        .and(body_partial_json(json!({ "DNI": DNI, "Nombre": "Luis" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "Id_persona": 77 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/visitas"))
        .and(body_partial_json(json!({ "Id_persona": 77, "Motivo": "Library" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "Id_visita": 5 })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ingresos"))
        .and(body_partial_json(json!({
            "Tipo": "Peatonal", "Id_persona": 77, "Motivo": "Library"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut router = router_for(&server.uri(), Step::Identify, false);
    router
        .dispatch(StepInput::Identify {
            dni: DNI.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(router.step(), Step::RegisterVisitor);
    let record = router.record().unwrap();
    assert_eq!(record.identity.dni, DNI);
    assert!(record.roles.is_empty());
    assert!(record.identity.persona_id.is_none());

    router
        .dispatch(StepInput::RegisterVisitor(VisitorForm {
            first_name: "Luis".to_string(),
            last_name: "Mejía".to_string(),
            email: "luis@example.com".to_string(),
            phone: "99887766".to_string(),
            visit_type: "Academic".to_string(),
            reason: "Library".to_string(),
            photo: Some(Photo::encode("image/png", b"face")),
        }))
        .await
        .unwrap();
    assert_eq!(router.step(), Step::ChooseEntryMethod);

    // Visitors need no account number, and the registration photo skips capture.
    router
        .dispatch(StepInput::ChooseEntryMethod {
            method: EntryMethod::Pedestrian,
            account_number: None,
        })
        .await
        .unwrap();
    assert_eq!(router.step(), Step::SubmitEntry);

    router
        .dispatch(StepInput::SubmitEntry(EntryForm::default()))
        .await
        .unwrap();
    assert_eq!(router.step(), Step::Terminal);
}

#[tokio::test]
async fn wrong_password_stays_on_authentication() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    mount_student(&server).await;
    Mock::given(method("POST"))
        .and(path("/personas/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut router = router_for(&server.uri(), Step::Identify, false);
    router
        .dispatch(StepInput::Identify {
            dni: DNI.to_string(),
        })
        .await
        .unwrap();
    let before = router.record().unwrap();

    let err = router
        .dispatch(StepInput::Authenticate {
            password: password("nope"),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Incorrect password");
    assert_eq!(router.step(), Step::Authenticate);
    assert_eq!(router.record(), Some(before));

    let err = router
        .dispatch(StepInput::Authenticate {
            password: password("   "),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Please enter your password");
}

#[tokio::test]
async fn unknown_make_is_reported_not_defaulted() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/referencias/marcas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Id_marca": 2, "Marca": "Honda" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/vehiculos"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut router = router_for(&server.uri(), Step::Identify, false);
    let sid = router.location().sid.clone().unwrap();
    let mut record = SessionRecord::new(sid.clone(), DNI);
    record.identity.persona_id = Some(42);
    record.workflow.entry_method = Some(EntryMethod::Vehicular);
    router.store().put(&sid, &record).unwrap();
    router
        .open(&format!("/registro-vehiculo?sid={sid}"))
        .unwrap();

    let err = router
        .dispatch(StepInput::RegisterVehicle(vehicle_form("Toyota")))
        .await
        .unwrap_err();
    assert!(matches!(err, StepError::ReferenceNotFound(_)));
    assert_eq!(router.step(), Step::RegisterVehicle);
    assert!(router.record().unwrap().workflow.vehicle.is_none());
}

#[tokio::test]
async fn failed_submission_keeps_the_record_for_retry() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ingresos"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ingresos"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let mut router = router_for(&server.uri(), Step::Identify, false);
    let sid = router.location().sid.clone().unwrap();
    let mut record = SessionRecord::new(sid.clone(), DNI);
    record.identity.persona_id = Some(42);
    record.workflow.entry_method = Some(EntryMethod::Pedestrian);
    record.photo = Some(Photo::encode("image/jpeg", b"on file"));
    router.store().put(&sid, &record).unwrap();
    router.open(&format!("/confirmar?sid={sid}")).unwrap();

    let err = router
        .dispatch(StepInput::SubmitEntry(EntryForm::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, StepError::Backend(_)));
    assert!(err.to_string().contains("database down"));
    assert_eq!(router.step(), Step::SubmitEntry);
    assert!(router.record().is_some());

    router
        .dispatch(StepInput::SubmitEntry(EntryForm::default()))
        .await
        .unwrap();
    assert_eq!(router.step(), Step::Terminal);
}

#[tokio::test]
async fn planned_window_outside_hours_is_rejected_locally() {
    let mut router = router_for("http://127.0.0.1:9", Step::Identify, false);
    let sid = router.location().sid.clone().unwrap();
    let mut record = SessionRecord::new(sid.clone(), DNI);
    record.identity.persona_id = Some(42);
    record.workflow.entry_method = Some(EntryMethod::Pedestrian);
    record.workflow.photo = Some(Photo::encode("image/jpeg", b"face"));
    router.store().put(&sid, &record).unwrap();
    router.open(&format!("/confirmar?sid={sid}")).unwrap();

    let err = router
        .dispatch(StepInput::SubmitEntry(EntryForm {
            planned: Some("05:00-08:00".parse().unwrap()),
            ..EntryForm::default()
        }))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Entry and exit must be between 06:00 and 22:00"
    );
}

#[tokio::test]
async fn submission_without_identity_is_rejected_before_the_backend() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    // A login profile without DNI or person id leaves both blank.
    let mut router = router_for(&server.uri(), Step::Login, false);
    let sid = router.location().sid.clone().unwrap();
    let mut record = SessionRecord::new(sid.clone(), "");
    record.workflow.entry_method = Some(EntryMethod::Pedestrian);
    record.workflow.photo = Some(Photo::encode("image/jpeg", b"face"));
    router.store().put(&sid, &record).unwrap();
    router.open(&format!("/confirmar?sid={sid}")).unwrap();

    let err = router
        .dispatch(StepInput::SubmitEntry(EntryForm::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, StepError::Validation(_)));
    assert_eq!(router.step(), Step::SubmitEntry);
}

#[tokio::test]
async fn security_lookup_only_sends_well_formed_dnis() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Rol": "seguridad" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/personas/{DNI}")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut router = router_for(&server.uri(), Step::Login, false);
    router
        .dispatch(StepInput::Login {
            account_number: "SEG-02".to_string(),
            password: password("guard"),
        })
        .await
        .unwrap();

    let lookup = |dni: &str| {
        StepInput::Security(SecurityAction::Lookup {
            dni: dni.to_string(),
        })
    };

    let err = router.dispatch(lookup("a/../vehiculos")).await.unwrap_err();
    assert_eq!(err.to_string(), "Please enter a DNI to look up");

    let err = router.dispatch(lookup("12/345")).await.unwrap_err();
    assert_eq!(err.to_string(), "DNI must have exactly 13 digits");

    // Separators typed by the guard are dropped before the request.
    let notice = router.dispatch(lookup("0209-2005-00236")).await.unwrap();
    assert_eq!(
        notice,
        Some(Notice::Message(format!("No person found with DNI {DNI}")))
    );
}

#[tokio::test]
async fn security_desk_registers_entry_and_exit() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_partial_json(json!({ "NumeroCuenta": "SEG-01", "Contrasena": "guard" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Nombre": "Carlos", "Apellido": "Reyes", "Rol": "Seguridad"
        })))
        .mount(&server)
        .await;
    mount_student(&server).await;
    Mock::given(method("POST"))
        .and(path("/ingresos"))
        .and(body_partial_json(json!({
            "Tipo": "Peatonal", "Id_persona": 42, "Motivo": "Entry registered by security"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/salidas"))
        .and(body_partial_json(json!({ "Id_persona": 42 })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut router = router_for(&server.uri(), Step::Login, false);
    router
        .dispatch(StepInput::Login {
            account_number: "SEG-01".to_string(),
            password: password("guard"),
        })
        .await
        .unwrap();
    assert_eq!(router.step(), Step::SecurityPanel);

    let err = router
        .dispatch(StepInput::Security(SecurityAction::RegisterExit))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Look up a person first");

    let notice = router
        .dispatch(StepInput::Security(SecurityAction::Lookup {
            dni: DNI.to_string(),
        }))
        .await
        .unwrap();
    assert_eq!(
        notice,
        Some(Notice::Message(format!("Found: Ana López ({DNI})")))
    );

    router
        .dispatch(StepInput::Security(SecurityAction::RegisterEntry))
        .await
        .unwrap();
    router
        .dispatch(StepInput::Security(SecurityAction::RegisterExit))
        .await
        .unwrap();

    router
        .dispatch(StepInput::Security(SecurityAction::Logout))
        .await
        .unwrap();
    assert_eq!(router.step(), Step::Login);
    assert!(router.store().storage().is_empty());
}

#[tokio::test]
async fn admin_reports_and_rejected_login() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_partial_json(json!({ "Contrasena": "bad" })))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Rol": "administrador" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ingresos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Id_ingreso": 1 }, { "Id_ingreso": 2 }
        ])))
        .mount(&server)
        .await;

    let mut router = router_for(&server.uri(), Step::Login, false);
    let err = router
        .dispatch(StepInput::Login {
            account_number: "ADM-1".to_string(),
            password: password("bad"),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(router.step(), Step::Login);

    router
        .dispatch(StepInput::Login {
            account_number: "ADM-1".to_string(),
            password: password("good"),
        })
        .await
        .unwrap();
    assert_eq!(router.step(), Step::AdminPanel);

    let notice = router
        .dispatch(StepInput::Admin(AdminAction::Report(ReportKind::Entries)))
        .await
        .unwrap();
    match notice {
        Some(Notice::Report { kind, rows }) => {
            assert_eq!(kind, ReportKind::Entries);
            assert_eq!(rows.len(), 2);
        }
        other => panic!("unexpected notice: {other:?}"),
    }
}

#[tokio::test]
async fn demo_mode_only_covers_unreachable_backend() {
    // Port 9 (discard) is closed on test hosts: every request fails to connect.
    let mut router = router_for("http://127.0.0.1:9", Step::Login, false);
    let err = router
        .dispatch(StepInput::Login {
            account_number: "20201000123".to_string(),
            password: password("pw"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StepError::Connectivity(_)));
    assert_eq!(router.step(), Step::Login);

    let mut router = router_for("http://127.0.0.1:9", Step::Login, true);
    router
        .dispatch(StepInput::Login {
            account_number: "20201000123".to_string(),
            password: password("pw"),
        })
        .await
        .unwrap();
    assert_eq!(router.step(), Step::ChooseEntryMethod);
    assert!(router.record().unwrap().has_role(Role::Student));

    router
        .dispatch(StepInput::ChooseEntryMethod {
            method: EntryMethod::Vehicular,
            account_number: None,
        })
        .await
        .unwrap();
    router
        .dispatch(StepInput::RegisterVehicle(vehicle_form("Toyota")))
        .await
        .unwrap();
    let vehicle = router.record().unwrap().workflow.vehicle.unwrap();
    assert_eq!(vehicle.plate, "HAB1234");
    assert_eq!(vehicle.vehicle_id, None);
}

#[tokio::test]
async fn persisted_session_resumes_in_a_new_process() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::default().with_base_url("http://127.0.0.1:9");

    let location = {
        let store = SessionStore::new(DirStorage::new(dir.path()).unwrap());
        let router = WorkflowRouter::new(
            store,
            HttpBackend::new(&config).unwrap(),
            config.clone(),
            Step::Identify,
        );
        let sid = router.location().sid.clone().unwrap();
        let mut record = SessionRecord::new(sid.clone(), DNI);
        record.roles.push(RoleData::Student {
            account_number: Some("20201000123".to_string()),
            is_active: false,
            campus: None,
        });
        router.store().put(&sid, &record).unwrap();
        format!("/dashboard?sid={sid}")
    };

    let store = SessionStore::new(DirStorage::new(dir.path()).unwrap());
    let mut router = WorkflowRouter::new(
        store,
        HttpBackend::new(&config).unwrap(),
        config,
        Step::Identify,
    );
    router.open(&location).unwrap();
    assert_eq!(router.step(), Step::RoleDashboard);

    let err = router.dispatch(StepInput::Continue).await.unwrap_err();
    assert!(matches!(err, StepError::Inactive(_)));
    assert_eq!(router.step(), Step::RoleDashboard);
}
