//! Plan store behavior tests.

use std::sync::Arc;

use chrono::NaiveDate;
use planpago_shared::types::PlanId;
use rstest::rstest;
use rust_decimal_macros::dec;

use super::*;
use crate::schedule::{ScheduleEngine, TermField};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn service() -> (PlanService, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    (PlanService::new(storage.clone()), storage)
}

fn juan() -> NewPlan {
    NewPlan {
        nombre: Some("Juan Pérez".to_string()),
        dni: Some("30111222".to_string()),
        fecha_desembolso: Some("2024-01-10".to_string()),
        primera_cuota_fecha: Some("2024-02-10".to_string()),
        monto: Some(NumberInput::from(1_000_000)),
        ..NewPlan::default()
    }
}

/// A plan stored before first installment dates were recorded.
fn legacy_plan() -> Plan {
    let schedule = ScheduleEngine::generate(&crate::schedule::ScheduleTerms {
        principal: dec!(120000),
        installment_count: 12,
        monthly_rate: dec!(0.08),
        first_installment_date: date(2023, 6, 1),
    })
    .unwrap();

    Plan {
        id: PlanId::new(),
        plan_numero: Some("7".to_string()),
        gestion: None,
        nombre: "Ana".to_string(),
        dni: "999".to_string(),
        fecha_desembolso: date(2023, 5, 1),
        monto: 120_000,
        tasa_mensual: dec!(0.08),
        gasto_admin: dec!(0.005),
        cuotas: 12,
        forma_pago: "Efectivo".to_string(),
        primera_cuota_fecha: None,
        schedule,
    }
}

#[tokio::test]
async fn test_create_applies_defaults() {
    let (service, storage) = service();

    let plan = service.create_plan(juan()).await.unwrap();

    assert_eq!(plan.tasa_mensual, dec!(0.08));
    assert_eq!(plan.gasto_admin, dec!(0.005));
    assert_eq!(plan.cuotas, 24);
    assert_eq!(plan.forma_pago, "Efectivo");
    assert_eq!(plan.monto, 1_000_000);
    assert_eq!(plan.schedule.len(), 24);
    assert_eq!(plan.schedule.sum_capital, 1_000_000);
    assert_eq!(plan.schedule.rows[0].fecha_iso, date(2024, 2, 10));
    assert_eq!(storage.writes(), 1);
}

#[tokio::test]
async fn test_create_uses_configured_defaults() {
    let storage = Arc::new(MemoryStorage::new());
    let defaults = PlanDefaults {
        tasa_mensual: dec!(0.05),
        gasto_admin: dec!(0),
        cuotas: 6,
        forma_pago: "Transferencia".to_string(),
    };
    let service = PlanService::with_defaults(storage, defaults);

    let plan = service.create_plan(juan()).await.unwrap();

    assert_eq!(plan.cuotas, 6);
    assert_eq!(plan.forma_pago, "Transferencia");
    assert_eq!(plan.schedule.rows[0].interes, 50_000);
}

#[tokio::test]
async fn test_create_accepts_numeric_strings() {
    let (service, _) = service();
    let input = NewPlan {
        monto: Some(NumberInput::from(" 1500.5 ")),
        cuotas: Some(NumberInput::from("3")),
        tasa_mensual: Some(NumberInput::from("0.1")),
        ..juan()
    };

    let plan = service.create_plan(input).await.unwrap();

    assert_eq!(plan.monto, 1501);
    assert_eq!(plan.cuotas, 3);
    assert_eq!(plan.tasa_mensual, dec!(0.1));
}

#[rstest]
#[case::nombre(NewPlan { nombre: None, ..juan() }, PlanField::Nombre)]
#[case::blank_dni(NewPlan { dni: Some("  ".to_string()), ..juan() }, PlanField::Dni)]
#[case::fecha_desembolso(NewPlan { fecha_desembolso: None, ..juan() }, PlanField::FechaDesembolso)]
#[case::primera_cuota_fecha(NewPlan { primera_cuota_fecha: Some(String::new()), ..juan() }, PlanField::PrimeraCuotaFecha)]
#[tokio::test]
async fn test_create_missing_required_field(#[case] input: NewPlan, #[case] expected: PlanField) {
    let (service, storage) = service();

    let err = service.create_plan(input).await.unwrap_err();

    assert!(matches!(err, PlanError::MissingRequiredField(field) if field == expected));
    assert_eq!(storage.writes(), 0);
}

#[tokio::test]
async fn test_required_fields_checked_before_amount() {
    let (service, _) = service();
    let input = NewPlan {
        nombre: None,
        monto: Some(NumberInput::from("abc")),
        ..juan()
    };

    let err = service.create_plan(input).await.unwrap_err();
    assert!(matches!(err, PlanError::MissingRequiredField(PlanField::Nombre)));
}

#[rstest]
#[case::missing(None)]
#[case::text(Some(NumberInput::from("abc")))]
#[case::boolean(Some(NumberInput::Other(serde_json::Value::Bool(true))))]
#[tokio::test]
async fn test_create_invalid_amount(#[case] monto: Option<NumberInput>) {
    let (service, storage) = service();

    let err = service
        .create_plan(NewPlan { monto, ..juan() })
        .await
        .unwrap_err();

    assert!(matches!(err, PlanError::InvalidAmount(_)));
    assert_eq!(storage.writes(), 0);
}

#[rstest]
#[case::zero_cuotas(NewPlan { cuotas: Some(NumberInput::from(0)), ..juan() }, TermField::InstallmentCount)]
#[case::fractional_cuotas(NewPlan { cuotas: Some(NumberInput::from(dec!(2.5))), ..juan() }, TermField::InstallmentCount)]
#[case::negative_rate(NewPlan { tasa_mensual: Some(NumberInput::from(dec!(-0.1))), ..juan() }, TermField::MonthlyRate)]
#[case::bad_fee(NewPlan { gasto_admin: Some(NumberInput::from("x")), ..juan() }, TermField::AdminFee)]
#[case::bad_first_date(NewPlan { primera_cuota_fecha: Some("2024-02-30".to_string()), ..juan() }, TermField::FirstInstallmentDate)]
#[case::bad_disbursement(NewPlan { fecha_desembolso: Some("10/01/2024".to_string()), ..juan() }, TermField::DisbursementDate)]
#[tokio::test]
async fn test_create_invalid_terms(#[case] input: NewPlan, #[case] expected: TermField) {
    let (service, storage) = service();

    let err = service.create_plan(input).await.unwrap_err();

    match err {
        PlanError::InvalidTerms(e) => assert_eq!(e.field(), expected),
        other => panic!("expected InvalidTerms, got {other:?}"),
    }
    assert_eq!(storage.writes(), 0);
}

#[tokio::test]
async fn test_get_returns_stored_plan() {
    let (service, _) = service();
    let created = service.create_plan(juan()).await.unwrap();

    let fetched = service.get_plan(created.id).await.unwrap();
    assert_eq!(fetched, created);

    let err = service.get_plan(PlanId::new()).await.unwrap_err();
    assert!(matches!(err, PlanError::NotFound(_)));
}

#[tokio::test]
async fn test_update_label_keeps_schedule() {
    let (service, _) = service();
    let created = service.create_plan(juan()).await.unwrap();

    let patch = PlanPatch {
        forma_pago: Some(Some("Transferencia".to_string())),
        gestion: Some(Some("2024".to_string())),
        ..PlanPatch::default()
    };
    let updated = service.update_plan(created.id, patch).await.unwrap();

    assert_eq!(updated.forma_pago, "Transferencia");
    assert_eq!(updated.gestion.as_deref(), Some("2024"));
    assert_eq!(updated.schedule, created.schedule);
}

#[tokio::test]
async fn test_update_label_keeps_stale_schedule_of_legacy_plan() {
    let legacy = legacy_plan();
    let storage = Arc::new(MemoryStorage::with_plans([legacy.clone()]));
    let service = PlanService::new(storage);

    let patch = PlanPatch {
        nombre: Some(Some("Ana María".to_string())),
        ..PlanPatch::default()
    };
    let updated = service.update_plan(legacy.id, patch).await.unwrap();

    assert_eq!(updated.nombre, "Ana María");
    assert_eq!(updated.schedule, legacy.schedule);
}

#[tokio::test]
async fn test_update_financial_term_recomputes() {
    let (service, _) = service();
    let created = service
        .create_plan(NewPlan {
            cuotas: Some(NumberInput::from(3)),
            ..juan()
        })
        .await
        .unwrap();

    let patch = PlanPatch {
        monto: Some(Some(NumberInput::from(600_000))),
        cuotas: Some(Some(NumberInput::from(6))),
        ..PlanPatch::default()
    };
    let updated = service.update_plan(created.id, patch).await.unwrap();

    assert_eq!(updated.monto, 600_000);
    assert_eq!(updated.schedule.len(), 6);
    assert_eq!(updated.schedule.sum_capital, 600_000);
    assert_eq!(updated.schedule.rows[0].capital, 100_000);
}

#[tokio::test]
async fn test_update_first_date_shifts_schedule() {
    let (service, _) = service();
    let created = service.create_plan(juan()).await.unwrap();

    let patch = PlanPatch {
        primera_cuota_fecha: Some(Some("2024-01-31".to_string())),
        ..PlanPatch::default()
    };
    let updated = service.update_plan(created.id, patch).await.unwrap();

    assert_eq!(updated.primera_cuota_fecha, Some(date(2024, 1, 31)));
    assert_eq!(updated.schedule.rows[1].fecha_iso, date(2024, 2, 29));
    assert_eq!(updated.schedule.rows[1].fecha, "29-02-24");
}

#[tokio::test]
async fn test_recompute_without_first_date_fails_and_keeps_store() {
    let legacy = legacy_plan();
    let storage = Arc::new(MemoryStorage::with_plans([legacy.clone()]));
    let service = PlanService::new(storage.clone());

    let patch = PlanPatch {
        tasa_mensual: Some(Some(NumberInput::from(dec!(0.1)))),
        ..PlanPatch::default()
    };
    let err = service.update_plan(legacy.id, patch).await.unwrap_err();

    assert!(matches!(
        err,
        PlanError::MissingRequiredField(PlanField::PrimeraCuotaFecha)
    ));
    assert_eq!(storage.writes(), 0);
    assert_eq!(service.get_plan(legacy.id).await.unwrap(), legacy);
}

#[tokio::test]
async fn test_clearing_first_date_is_rejected() {
    let (service, storage) = service();
    let created = service.create_plan(juan()).await.unwrap();

    let patch = PlanPatch {
        primera_cuota_fecha: Some(None),
        ..PlanPatch::default()
    };
    let err = service.update_plan(created.id, patch).await.unwrap_err();

    assert!(matches!(
        err,
        PlanError::MissingRequiredField(PlanField::PrimeraCuotaFecha)
    ));
    assert_eq!(storage.writes(), 1);
}

#[rstest]
#[case::blank_nombre(PlanPatch { nombre: Some(Some(String::new())), ..PlanPatch::default() })]
#[case::bad_amount(PlanPatch { monto: Some(Some(NumberInput::from("mil"))), ..PlanPatch::default() })]
#[case::bad_count(PlanPatch { cuotas: Some(Some(NumberInput::from(-1))), ..PlanPatch::default() })]
#[tokio::test]
async fn test_invalid_update_is_not_persisted(#[case] patch: PlanPatch) {
    let (service, storage) = service();
    let created = service.create_plan(juan()).await.unwrap();

    assert!(service.update_plan(created.id, patch).await.is_err());
    assert_eq!(storage.writes(), 1);
    assert_eq!(service.get_plan(created.id).await.unwrap(), created);
}

#[rstest]
#[case::nombre("nombre", PlanField::Nombre)]
#[case::dni("dni", PlanField::Dni)]
#[case::fecha_desembolso("fechaDesembolso", PlanField::FechaDesembolso)]
#[case::forma_pago("formaPago", PlanField::FormaPago)]
#[tokio::test]
async fn test_null_required_field_is_rejected(#[case] key: &str, #[case] expected: PlanField) {
    let (service, storage) = service();
    let created = service.create_plan(juan()).await.unwrap();

    let patch: PlanPatch =
        serde_json::from_value(serde_json::json!({ key: serde_json::Value::Null })).unwrap();
    let err = service.update_plan(created.id, patch).await.unwrap_err();

    assert!(matches!(err, PlanError::MissingRequiredField(field) if field == expected));
    assert_eq!(storage.writes(), 1);
    assert_eq!(service.get_plan(created.id).await.unwrap(), created);
}

#[tokio::test]
async fn test_null_amount_is_rejected() {
    let (service, storage) = service();
    let created = service.create_plan(juan()).await.unwrap();

    let patch: PlanPatch = serde_json::from_value(serde_json::json!({ "monto": null })).unwrap();
    assert_eq!(patch.monto, Some(None));

    let err = service.update_plan(created.id, patch).await.unwrap_err();

    assert!(matches!(err, PlanError::InvalidAmount(_)));
    assert_eq!(storage.writes(), 1);
    assert_eq!(service.get_plan(created.id).await.unwrap(), created);
}

#[rstest]
#[case::cuotas("cuotas", TermField::InstallmentCount)]
#[case::tasa_mensual("tasaMensual", TermField::MonthlyRate)]
#[case::gasto_admin("gastoAdmin", TermField::AdminFee)]
#[tokio::test]
async fn test_null_term_is_rejected(#[case] key: &str, #[case] expected: TermField) {
    let (service, storage) = service();
    let created = service.create_plan(juan()).await.unwrap();

    let patch: PlanPatch =
        serde_json::from_value(serde_json::json!({ key: serde_json::Value::Null })).unwrap();
    let err = service.update_plan(created.id, patch).await.unwrap_err();

    assert!(matches!(err, PlanError::InvalidTerms(ref inner) if inner.field() == expected));
    assert_eq!(storage.writes(), 1);
    assert_eq!(service.get_plan(created.id).await.unwrap(), created);
}

#[tokio::test]
async fn test_update_unknown_plan() {
    let (service, _) = service();
    let err = service
        .update_plan(PlanId::new(), PlanPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (service, storage) = service();
    let created = service.create_plan(juan()).await.unwrap();

    service.delete_plan(created.id).await.unwrap();
    service.delete_plan(created.id).await.unwrap();

    assert!(matches!(
        service.get_plan(created.id).await,
        Err(PlanError::NotFound(_))
    ));
    assert_eq!(storage.writes(), 2);
}

#[tokio::test]
async fn test_list_in_creation_order_with_search() {
    let (service, storage) = service();
    let first = service.create_plan(juan()).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let second = service
        .create_plan(NewPlan {
            nombre: Some("María Gómez".to_string()),
            dni: Some("27555666".to_string()),
            plan_numero: Some("42".to_string()),
            ..juan()
        })
        .await
        .unwrap();

    let all = service.list_plans(None).await.unwrap();
    let ids: Vec<PlanId> = all.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);

    let by_name = service.list_plans(Some("MARÍA")).await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].id, second.id);

    let by_number = service.list_plans(Some("42")).await.unwrap();
    assert_eq!(by_number.len(), 1);

    let blank = service.list_plans(Some("   ")).await.unwrap();
    assert_eq!(blank.len(), 2);

    assert!(service.list_plans(Some("nobody")).await.unwrap().is_empty());
    assert_eq!(storage.writes(), 2);
}

#[test]
fn test_patch_touched_fields() {
    let patch: PlanPatch = serde_json::from_value(serde_json::json!({
        "formaPago": "Transferencia",
        "planNumero": null,
        "cuotas": 12
    }))
    .unwrap();

    assert_eq!(
        patch.touched_fields(),
        vec![PlanField::PlanNumero, PlanField::Cuotas, PlanField::FormaPago]
    );
    assert!(patch.requires_recompute());
    assert_eq!(patch.plan_numero, Some(None));
}

#[test]
fn test_patch_without_terms_does_not_recompute() {
    let patch: PlanPatch =
        serde_json::from_value(serde_json::json!({ "nombre": "Ana", "gastoAdmin": 0.01 }))
            .unwrap();
    assert!(!patch.requires_recompute());
}

#[test]
fn test_number_input_from_json() {
    let input: NewPlan = serde_json::from_value(serde_json::json!({
        "monto": 1000000,
        "tasaMensual": 0.08,
        "cuotas": "12",
        "gastoAdmin": "abc"
    }))
    .unwrap();

    assert_eq!(input.monto.unwrap().as_decimal(), Some(dec!(1000000)));
    assert_eq!(input.tasa_mensual.unwrap().as_decimal(), Some(dec!(0.08)));
    assert_eq!(input.cuotas.unwrap().as_decimal(), Some(dec!(12)));
    assert_eq!(input.gasto_admin.unwrap().as_decimal(), None);
}

#[test]
fn test_plan_serializes_with_wire_names() {
    let plan = legacy_plan();
    let value = serde_json::to_value(&plan).unwrap();

    assert_eq!(value["tasaMensual"], serde_json::json!(0.08));
    assert_eq!(value["fechaDesembolso"], "2023-05-01");
    assert_eq!(value["schedule"]["sumCapital"], 120_000);
    assert_eq!(value["schedule"]["rows"][0]["fechaISO"], "2023-06-01");

    let back: Plan = serde_json::from_value(value).unwrap();
    assert_eq!(back, plan);
}

#[test]
fn test_plan_error_maps_to_app_error() {
    use planpago_shared::AppError;

    let validation: AppError = PlanError::MissingRequiredField(PlanField::Dni).into();
    assert_eq!(validation.status_code(), 400);

    let missing: AppError = PlanError::NotFound(PlanId::new()).into();
    assert_eq!(missing.status_code(), 404);

    let storage: AppError = PlanError::Storage(StorageError::Corrupt("eof".to_string())).into();
    assert_eq!(storage.status_code(), 500);
}
