//! Ledger record schema tests: construction, serialization, relationships.

use bitacora::ledger::{
    AssetCategory, AuditOperation, AuditRecord, FeatureRecord, FeatureStatus, FeatureType,
    InventoryRecord, ModelRecord, TrainingMetrics, TrainingResultRecord, TrainingStatus,
};

// =============================================================================
// FeatureRecord Tests
// =============================================================================

#[test]
fn test_feature_record_creation() {
    let record = FeatureRecord::new(1, "url_length", FeatureType::Numerical, FeatureStatus::Active);

    assert_eq!(record.feature_id(), 1);
    assert_eq!(record.feature_name(), "url_length");
    assert_eq!(record.feature_type(), FeatureType::Numerical);
    assert_eq!(record.status(), FeatureStatus::Active);
    assert!(record.last_updated().timestamp() > 0);
}

#[test]
fn test_feature_record_serialization() {
    let record = FeatureRecord::new(7, "sender_domain", FeatureType::Categorical, FeatureStatus::Active);

    let json = serde_json::to_string(&record).expect("serialization failed");
    let deserialized: FeatureRecord = serde_json::from_str(&json).expect("deserialization failed");

    assert_eq!(record, deserialized);
}

#[test]
fn test_feature_record_equality() {
    let record1 = FeatureRecord::new(1, "f", FeatureType::Boolean, FeatureStatus::Active);
    let record2 = FeatureRecord::new(1, "f", FeatureType::Boolean, FeatureStatus::Active);

    // Different timestamps mean different records
    assert_ne!(record1, record2);
    assert_eq!(record1.feature_name(), record2.feature_name());
}

#[test]
fn test_feature_status_variants() {
    assert_eq!(format!("{:?}", FeatureStatus::Active), "Active");
    assert_eq!(format!("{:?}", FeatureStatus::Deprecated), "Deprecated");
}

// =============================================================================
// ModelRecord Tests
// =============================================================================

#[test]
fn test_model_record_creation() {
    let record = ModelRecord::new(1, "PhishModelV1", "RandomForest", "v1.0");

    assert_eq!(record.model_id(), 1);
    assert_eq!(record.model_name(), "PhishModelV1");
    assert_eq!(record.algorithm(), "RandomForest");
    assert_eq!(record.version(), "v1.0");
}

#[test]
fn test_model_versions_are_distinct_records() {
    let v1 = ModelRecord::new(1, "PhishModelV1", "RandomForest", "v1.0");
    let v2 = ModelRecord::new(2, "PhishModelV1", "RandomForest", "v1.1");

    assert_ne!(v1.model_id(), v2.model_id());
    assert_eq!(v1.model_name(), v2.model_name());
}

// =============================================================================
// TrainingResultRecord Tests
// =============================================================================

#[test]
fn test_training_result_creation() {
    let metrics = TrainingMetrics::new(0.91, 0.89, 0.92, 0.88);
    let record = TrainingResultRecord::new(1, 1, metrics, TrainingStatus::Completed);

    assert_eq!(record.result_id(), 1);
    assert_eq!(record.model_id(), 1);
    assert_eq!(record.status(), TrainingStatus::Completed);
    assert!((record.metrics().accuracy - 0.91).abs() < f64::EPSILON);
    assert!((record.metrics().recall - 0.88).abs() < f64::EPSILON);
}

#[test]
fn test_training_result_serialization() {
    let metrics = TrainingMetrics::new(0.94, 0.90, 0.93, 0.90);
    let record = TrainingResultRecord::new(2, 1, metrics, TrainingStatus::Failed);

    let json = serde_json::to_string(&record).expect("serialization failed");
    let deserialized: TrainingResultRecord =
        serde_json::from_str(&json).expect("deserialization failed");

    assert_eq!(record, deserialized);
}

#[test]
fn test_metrics_are_fractions() {
    assert!(TrainingMetrics::new(0.5, 0.5, 0.5, 0.5).validate().is_ok());
    assert!(TrainingMetrics::new(91.0, 0.89, 0.92, 0.88).validate().is_err());
    assert!(TrainingMetrics::new(0.91, -0.1, 0.92, 0.88).validate().is_err());
}

// =============================================================================
// InventoryRecord Tests
// =============================================================================

#[test]
fn test_inventory_record_creation() {
    let record = InventoryRecord::new(
        "mail_gateway_capture",
        AssetCategory::Raw,
        vec!["analyst".to_string()],
        "Hourly email capture batches",
    );

    assert_eq!(record.data_name(), "mail_gateway_capture");
    assert_eq!(record.category(), AssetCategory::Raw);
    assert_eq!(record.access_roles(), ["analyst".to_string()]);
    assert_eq!(record.description(), "Hourly email capture batches");
}

#[test]
fn test_inventory_roles_delimited_form() {
    let record = InventoryRecord::new(
        "features_v3",
        AssetCategory::Features,
        vec!["pipeline".to_string(), "analyst".to_string()],
        "",
    );
    assert_eq!(record.roles_delimited(), "pipeline,analyst");
}

// =============================================================================
// AuditRecord Tests
// =============================================================================

#[test]
fn test_audit_record_update_snapshots() {
    let old_data = serde_json::json!({"status": "active"});
    let new_data = serde_json::json!({"status": "deprecated"});
    let record = AuditRecord::new(
        1,
        "features_master",
        AuditOperation::Update,
        Some(old_data.clone()),
        Some(new_data.clone()),
    );

    assert_eq!(record.old_data(), Some(&old_data));
    assert_eq!(record.new_data(), Some(&new_data));
    assert!(record.logged_at().timestamp() > 0);
}

#[test]
fn test_audit_operation_variants() {
    assert_eq!(format!("{:?}", AuditOperation::Insert), "Insert");
    assert_eq!(format!("{:?}", AuditOperation::Update), "Update");
    assert_eq!(format!("{:?}", AuditOperation::Delete), "Delete");
}

#[test]
fn test_audit_record_serialization() {
    let record = AuditRecord::new(
        3,
        "models",
        AuditOperation::Insert,
        None,
        Some(serde_json::json!({"model_name": "PhishModelV1"})),
    );

    let json = serde_json::to_string(&record).expect("serialization failed");
    assert!(json.contains("\"INSERT\""));
    let deserialized: AuditRecord = serde_json::from_str(&json).expect("deserialization failed");
    assert_eq!(record, deserialized);
}

// =============================================================================
// Cross-Record Relationship Tests
// =============================================================================

#[test]
fn test_model_result_relationship() {
    let model = ModelRecord::new(5, "PhishModelV2", "GradientBoosting", "v2.0");
    let result = TrainingResultRecord::new(
        1,
        model.model_id(),
        TrainingMetrics::new(0.9, 0.9, 0.9, 0.9),
        TrainingStatus::Completed,
    );

    assert_eq!(result.model_id(), model.model_id());
}
